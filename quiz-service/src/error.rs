use crate::services::providers::ProviderError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Error parsing form data: {0}")]
    FormParse(anyhow::Error),

    #[error("Uploaded file is too large")]
    PayloadTooLarge,

    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Configuration error: {0}")]
    Config(anyhow::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(anyhow::Error::new(err))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Internal(anyhow::Error::new(err))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct ErrorResponse {
            message: String,
        }

        let (status, message) = match self {
            AppError::MethodNotAllowed => {
                (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed".to_string())
            }
            AppError::FormParse(err) => {
                tracing::error!(error = %err, "Failed to parse upload form");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Error parsing form data".to_string(),
                )
            }
            AppError::PayloadTooLarge => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "Uploaded file is too large".to_string(),
            ),
            AppError::Provider(err) => provider_response(err),
            AppError::Config(err) => {
                tracing::error!(error = %err, "Configuration error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(ErrorResponse { message })).into_response()
    }
}

/// Map a provider failure to exactly one HTTP response.
///
/// When the upstream error carried a locale-tagged detail message, relay it
/// with the upstream status code; everything else collapses into the generic
/// upload failure.
fn provider_response(err: ProviderError) -> (StatusCode, String) {
    match err {
        ProviderError::Api {
            status,
            message: Some(message),
        } => {
            tracing::error!(status = status, message = %message, "Gemini rejected the request");
            (
                StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
                message,
            )
        }
        other => {
            tracing::error!(error = %other, "Error uploading file to Gemini");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error uploading file to Gemini".to_string(),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locale_tagged_failure_relays_upstream_status_and_message() {
        let err = ProviderError::Api {
            status: 400,
            message: Some("API key not valid. Please pass a valid API key.".to_string()),
        };

        let (status, message) = provider_response(err);
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(message, "API key not valid. Please pass a valid API key.");
    }

    #[test]
    fn failure_without_detail_message_falls_back_to_generic_500() {
        let err = ProviderError::Api {
            status: 403,
            message: None,
        };

        let (status, message) = provider_response(err);
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(message, "Error uploading file to Gemini");
    }

    #[test]
    fn network_failure_falls_back_to_generic_500() {
        let err = ProviderError::Network("connection reset".to_string());

        let (status, message) = provider_response(err);
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(message, "Error uploading file to Gemini");
    }

    #[test]
    fn invalid_upstream_status_degrades_to_500() {
        let err = ProviderError::Api {
            status: 99,
            message: Some("bad".to_string()),
        };

        let (status, _) = provider_response(err);
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
