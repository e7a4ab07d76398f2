//! Error types for the retrieval and generation pipeline

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Pipeline errors
#[derive(Debug, Error)]
pub enum Error {
    /// Bad caller input, reported with the violated constraint. Never retried.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Embedding service failure
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Vector index failure
    #[error("Retrieval error: {0}")]
    Retrieval(String),

    /// Generation service failure
    #[error("Generation error: {0}")]
    Generation(String),

    /// Generation service signalled transient overload (HTTP 503). The
    /// generator retries this variant and degrades after the retry bound;
    /// it never surfaces through a successful request.
    #[error("Model overloaded: {0}")]
    ModelOverloaded(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create an embedding error
    pub fn embedding(message: impl Into<String>) -> Self {
        Self::Embedding(message.into())
    }

    /// Create a retrieval error
    pub fn retrieval(message: impl Into<String>) -> Self {
        Self::Retrieval(message.into())
    }

    /// Create a generation error
    pub fn generation(message: impl Into<String>) -> Self {
        Self::Generation(message.into())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match &self {
            Error::Validation(msg) => (StatusCode::BAD_REQUEST, "validation_error", msg.clone()),
            Error::Embedding(msg) => (StatusCode::BAD_GATEWAY, "embedding_error", msg.clone()),
            Error::Retrieval(msg) => (StatusCode::BAD_GATEWAY, "retrieval_error", msg.clone()),
            Error::Generation(msg) => (StatusCode::BAD_GATEWAY, "generation_error", msg.clone()),
            Error::ModelOverloaded(msg) => {
                (StatusCode::SERVICE_UNAVAILABLE, "model_overloaded", msg.clone())
            }
            Error::Config(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "config_error", msg.clone())
            }
        };

        let body = Json(json!({
            "error": {
                "type": error_type,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_carry_constraint() {
        let err = Error::validation("question must not be empty");
        assert_eq!(
            err.to_string(),
            "Validation error: question must not be empty"
        );

        let err = Error::Retrieval("connection refused".to_string());
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn test_http_status_mapping() {
        let cases = [
            (Error::validation("x"), StatusCode::BAD_REQUEST),
            (Error::embedding("x"), StatusCode::BAD_GATEWAY),
            (Error::retrieval("x"), StatusCode::BAD_GATEWAY),
            (Error::generation("x"), StatusCode::BAD_GATEWAY),
            (
                Error::ModelOverloaded("x".to_string()),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                Error::Config("x".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }
}
