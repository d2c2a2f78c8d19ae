use crate::model::HealthResponse;
use axum::http::StatusCode;
use axum::Json;

pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

pub async fn favicon_handler() -> StatusCode {
    StatusCode::NO_CONTENT
}
