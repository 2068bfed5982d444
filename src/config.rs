use secrecy::{ExposeSecret, SecretString};
use std::env;

use crate::errors::{AppError, AppResult};

#[derive(Clone, Debug)]
pub struct Config {
    pub mongo_conn_string: SecretString,
    pub mongo_db_name: String,
    pub mongo_max_pool_size: u32,
    pub exam_results_collection: String,
    pub web_server_host: String,
    pub web_server_port: u16,
    pub cors_allowed_origin: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            mongo_conn_string: SecretString::from(
                env::var("MONGO_CONN_STRING")
                    .unwrap_or_else(|_| "mongodb://localhost:27017".to_string()),
            ),
            mongo_db_name: env::var("MONGO_DB_NAME")
                .unwrap_or_else(|_| "school-results-local".to_string()),
            mongo_max_pool_size: env::var("MONGO_MAX_POOL_SIZE")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(10),
            exam_results_collection: env::var("EXAM_RESULTS_COLLECTION")
                .unwrap_or_else(|_| "exam_results".to_string()),
            web_server_host: env::var("WEB_SERVER_HOST")
                .unwrap_or_else(|_| "localhost".to_string()),
            web_server_port: env::var("WEB_SERVER_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            cors_allowed_origin: env::var("CORS_ALLOWED_ORIGIN")
                .ok()
                .filter(|origin| !origin.trim().is_empty()),
        }
    }

    /// Rejects settings the server cannot start with.
    pub fn validate(&self) -> AppResult<()> {
        let conn = self.mongo_conn_string.expose_secret();
        if !conn.starts_with("mongodb://") && !conn.starts_with("mongodb+srv://") {
            return Err(AppError::ValidationError(
                "MONGO_CONN_STRING must start with mongodb:// or mongodb+srv://".to_string(),
            ));
        }

        if self.mongo_db_name.trim().is_empty() {
            return Err(AppError::ValidationError(
                "MONGO_DB_NAME cannot be empty".to_string(),
            ));
        }

        if self.exam_results_collection.trim().is_empty() {
            return Err(AppError::ValidationError(
                "EXAM_RESULTS_COLLECTION cannot be empty".to_string(),
            ));
        }

        if self.mongo_max_pool_size < 2 {
            return Err(AppError::ValidationError(format!(
                "MONGO_MAX_POOL_SIZE must be at least 2, got {}",
                self.mongo_max_pool_size
            )));
        }

        Ok(())
    }

    #[cfg(test)]
    pub fn test_config() -> Self {
        Self {
            mongo_conn_string: SecretString::from("mongodb://localhost:27017".to_string()),
            mongo_db_name: "school-results-test".to_string(),
            mongo_max_pool_size: 4,
            exam_results_collection: "exam_results".to_string(),
            web_server_host: "127.0.0.1".to_string(),
            web_server_port: 8080,
            cors_allowed_origin: None,
        }
    }
}
