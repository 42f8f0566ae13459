use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use pagelens_core::error::{AppError, ValidationError};

use crate::dto::ErrorResponse;

/// Wrapper so we can implement `IntoResponse` for `AppError`.
pub enum ApiError {
    App(AppError),
    /// The request body was not the JSON we expect.
    Body(JsonRejection),
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self::App(err)
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self::App(AppError::ValidationError(err))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Body(rejection)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::Body(rejection) => {
                let status = if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
                    StatusCode::PAYLOAD_TOO_LARGE
                } else {
                    StatusCode::BAD_REQUEST
                };
                (
                    status,
                    format!("Invalid request body: {}", rejection.body_text()),
                )
            }
            ApiError::App(AppError::ValidationError(ValidationError::MissingApiKey)) => {
                (StatusCode::UNAUTHORIZED, ValidationError::MissingApiKey.to_string())
            }
            ApiError::App(err @ AppError::ValidationError(_)) => {
                (StatusCode::BAD_REQUEST, err.to_string())
            }
            ApiError::App(err) => {
                tracing::error!(
                    stage = err.stage().map(|s| s.as_str()).unwrap_or("none"),
                    error = %err,
                    "Analysis request failed"
                );
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            }
        };

        (status, axum::Json(ErrorResponse { error: message })).into_response()
    }
}
