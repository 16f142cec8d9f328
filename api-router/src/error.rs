use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use common::error::AppError;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, Serialize, Clone)]
pub enum ApiError {
    #[error("Internal server error")]
    InternalError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Search service is temporarily unavailable")]
    ServiceUnavailable(String),
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::Connectivity(msg) => {
                tracing::error!("Search service unavailable: {msg}");
                Self::ServiceUnavailable(msg)
            }
            // Credentials never reach the caller; surface a generic
            // configuration problem instead.
            AppError::Auth(msg) => {
                tracing::error!("Authentication failure: {msg}");
                Self::InternalError("Search service configuration error".to_string())
            }
            AppError::Validation(msg) => Self::ValidationError(msg),
            _ => {
                tracing::error!("Internal error: {err:?}");
                Self::InternalError("Internal server error".to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_response) = match self {
            Self::InternalError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse {
                    error: "internal_error".to_string(),
                    message: "Internal server error".to_string(),
                },
            ),
            Self::ValidationError(message) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse {
                    error: "validation_error".to_string(),
                    message,
                },
            ),
            Self::ServiceUnavailable(_) => (
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorResponse {
                    error: "service_unavailable".to_string(),
                    message: "Search service is temporarily unavailable".to_string(),
                },
            ),
        };

        (status, Json(error_response)).into_response()
    }
}

/// Machine-readable `error` kind plus a human-readable `message`; every
/// error path answers with this envelope.
#[derive(Serialize, Debug)]
struct ErrorResponse {
    error: String,
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::error::AppError;
    use std::fmt::Debug;

    fn assert_status_code<T: IntoResponse + Debug>(response: T, expected_status: StatusCode) {
        let response = response.into_response();
        assert_eq!(response.status(), expected_status);
    }

    #[test]
    fn test_app_error_to_api_error_conversion() {
        let connectivity = AppError::Connectivity("index down".to_string());
        let api_error = ApiError::from(connectivity);
        assert!(matches!(api_error, ApiError::ServiceUnavailable(msg) if msg == "index down"));

        let validation = AppError::Validation("query is required".to_string());
        let api_error = ApiError::from(validation);
        assert!(matches!(api_error, ApiError::ValidationError(msg) if msg == "query is required"));

        // Auth problems surface as a generic configuration error.
        let auth = AppError::Auth("bad api key".to_string());
        let api_error = ApiError::from(auth);
        assert!(
            matches!(api_error, ApiError::InternalError(msg) if msg == "Search service configuration error")
        );

        let internal = AppError::InternalError("boom".to_string());
        let api_error = ApiError::from(internal);
        assert!(matches!(api_error, ApiError::InternalError(_)));

        let parsing = AppError::LLMParsing("bad json".to_string());
        let api_error = ApiError::from(parsing);
        assert!(matches!(api_error, ApiError::InternalError(_)));
    }

    #[test]
    fn test_api_error_response_status_codes() {
        let error = ApiError::InternalError("server error".to_string());
        assert_status_code(error, StatusCode::INTERNAL_SERVER_ERROR);

        let error = ApiError::ValidationError("invalid input".to_string());
        assert_status_code(error, StatusCode::BAD_REQUEST);

        let error = ApiError::ServiceUnavailable("index down".to_string());
        assert_status_code(error, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_internal_error_sanitization() {
        // The display string never leaks the wrapped detail.
        let api_error = ApiError::InternalError("db password incorrect".to_string());
        assert_eq!(api_error.to_string(), "Internal server error");
        assert_status_code(api_error, StatusCode::INTERNAL_SERVER_ERROR);

        let api_error = ApiError::ServiceUnavailable("10.0.0.3:8108 refused".to_string());
        assert_eq!(
            api_error.to_string(),
            "Search service is temporarily unavailable"
        );
    }
}
