use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use nl2sql::GenerationError;
use serde_json::json;
use tracing::{error, warn};

/// A custom error type for the server application.
///
/// This enum encapsulates different kinds of errors that can occur within the server,
/// allowing them to be converted into appropriate HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// The request was malformed or failed validation.
    BadRequest(String),
    /// The SQL generation pipeline failed.
    Generation(GenerationError),
}

impl From<GenerationError> for AppError {
    fn from(err: GenerationError) -> Self {
        AppError::Generation(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status_code, error_message) = match self {
            AppError::BadRequest(msg) => {
                warn!("Rejected request: {msg}");
                (StatusCode::BAD_REQUEST, msg)
            }
            AppError::Generation(err) => {
                error!("GenerationError: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Failed to generate SQL: {err}"),
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status_code, body).into_response()
    }
}
