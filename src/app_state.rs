use std::sync::Arc;

use crate::{
    config::Config,
    db::Database,
    errors::AppResult,
    repositories::{ExamResultRepository, MongoExamResultRepository},
    services::exam_result_service::ExamResultService,
};

#[derive(Clone)]
pub struct AppState {
    pub exam_result_service: Arc<ExamResultService>,
    pub config: Arc<Config>,
}

impl AppState {
    pub async fn new(config: Config) -> AppResult<Self> {
        let db = Database::connect(&config).await?;

        let exam_result_repository =
            MongoExamResultRepository::new(&db, &config.exam_results_collection);
        exam_result_repository.ensure_indexes().await?;

        Ok(Self::with_repository(config, Arc::new(exam_result_repository)))
    }

    /// Builds the state around any repository backend.
    pub fn with_repository(config: Config, repository: Arc<dyn ExamResultRepository>) -> Self {
        Self {
            exam_result_service: Arc::new(ExamResultService::new(repository)),
            config: Arc::new(config),
        }
    }
}
