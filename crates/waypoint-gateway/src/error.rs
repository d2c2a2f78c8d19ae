use crate::model::ErrorResponse;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tracing::error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("ATPROTO_DID is not configured")]
    NotConfigured,
    #[error("failed to fetch links")]
    LinksUnavailable(#[source] waypoint_links::LinkError),
    #[error("short link /{0} does not exist")]
    NotFound(String),
    #[error("redirect target is not a valid header value")]
    InvalidTarget(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::NotConfigured
            | AppError::LinksUnavailable(_)
            | AppError::InvalidTarget(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = ?self, "request failed");
        }

        let shortcode = match &self {
            AppError::NotFound(code) => Some(code.clone()),
            _ => None,
        };
        let body = ErrorResponse {
            success: false,
            error: self.to_string(),
            shortcode,
        };

        (status, Json(body)).into_response()
    }
}
