use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tokio::task::JoinError;
use utoipa::ToSchema;

pub enum ApiError {
    Validation(String),
    /// The blocking prediction task panicked or was cancelled.
    Worker(JoinError),
}

impl From<JoinError> for ApiError {
    fn from(e: JoinError) -> Self {
        ApiError::Worker(e)
    }
}

impl ApiError {
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, "validation_failed", msg.clone()),
            ApiError::Worker(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "prediction_failed",
                e.to_string(),
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();
        if status.is_server_error() {
            log::error!("{}: {}", code, message);
        }
        (status, Json(ErrorResponse::with_message(code, &message))).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// JSON body of every non-2xx response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ErrorResponse {
    pub fn with_message(error: &str, message: &str) -> Self {
        ErrorResponse {
            error: error.to_string(),
            message: Some(message.to_string()),
        }
    }
}
