use actix_web::{get, web, HttpRequest, HttpResponse};

use crate::{app_state::AppState, middleware::get_request_id};

#[get("/health")]
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

#[get("/health/ready")]
pub async fn health_check_ready(req: HttpRequest, state: web::Data<AppState>) -> HttpResponse {
    let db_health = state.exam_result_service.ping().await;

    if let Err(err) = &db_health {
        log::warn!(
            "Readiness check failed [{}]: {}",
            get_request_id(&req).unwrap_or_default(),
            err
        );
    }

    let status = if db_health.is_ok() {
        "ready"
    } else {
        "not_ready"
    };

    let response = serde_json::json!({
        "status": status,
        "version": env!("CARGO_PKG_VERSION"),
        "dependencies": {
            "mongodb": if db_health.is_ok() { "ok" } else { "error" }
        }
    });

    if db_health.is_ok() {
        HttpResponse::Ok().json(response)
    } else {
        HttpResponse::ServiceUnavailable().json(response)
    }
}

#[get("/health/live")]
pub async fn health_check_live() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "alive",
        "version": env!("CARGO_PKG_VERSION")
    }))
}
