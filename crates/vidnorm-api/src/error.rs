//! HTTP error response conversion
//!
//! This module provides HTTP-specific error response conversion for AppError.
//!
//! **Preferred handler pattern:** Return `Result<impl IntoResponse, HttpAppError>`
//! and let `?` fold domain errors (`IngestError`, `ValidationError`,
//! `StorageError`, `TranscodeError`) through the `From` impls below so every
//! failure renders consistently (status, body, logging).

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use vidnorm_core::{AppError, ErrorMetadata, LogLevel};
use vidnorm_processing::{IngestError, TranscodeError, ValidationError};
use vidnorm_storage::StorageError;

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// Machine-readable error code for programmatic handling
    pub code: String,
    /// Whether this error is recoverable (can be retried)
    pub recoverable: bool,
    /// Suggested action for the client (e.g., "Upload a smaller file")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_action: Option<String>,
}

/// Wrapper type for AppError to implement IntoResponse
/// This is necessary because of Rust's orphan rules - we can't implement
/// IntoResponse (external trait) for AppError (external type from vidnorm-core)
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

impl From<anyhow::Error> for HttpAppError {
    fn from(err: anyhow::Error) -> Self {
        HttpAppError(AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        })
    }
}

impl From<ValidationError> for HttpAppError {
    fn from(err: ValidationError) -> Self {
        let app = match err {
            ValidationError::FileTooLarge { size, max } => {
                AppError::PayloadTooLarge(format!("{} bytes exceeds max {} bytes", size, max))
            }
            other => AppError::InvalidInput(other.to_string()),
        };
        HttpAppError(app)
    }
}

impl From<StorageError> for HttpAppError {
    fn from(err: StorageError) -> Self {
        HttpAppError(AppError::Storage(err.to_string()))
    }
}

impl From<TranscodeError> for HttpAppError {
    fn from(err: TranscodeError) -> Self {
        let app = match err {
            TranscodeError::ToolUnavailable { path } => AppError::TranscoderUnavailable(path),
            TranscodeError::TimedOut { limit } => AppError::TranscodeTimeout(limit.as_secs()),
            TranscodeError::Unexpected(e) => {
                AppError::Internal(format!("Transcoder spawn failure: {}", e))
            }
            other => AppError::TranscodeFailed(other.to_string()),
        };
        HttpAppError(app)
    }
}

impl From<IngestError> for HttpAppError {
    fn from(err: IngestError) -> Self {
        match err {
            IngestError::Validation(e) => e.into(),
            IngestError::Storage(e) => e.into(),
            IngestError::Transcode(e) => e.into(),
            IngestError::TaskAborted(msg) => HttpAppError(AppError::Internal(msg)),
        }
    }
}

fn log_error(error: &AppError) {
    let error_type = error.error_type();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Error => {
            tracing::error!(error = %error, error_type = error_type, "Error occurred");
        }
    }
}

fn is_production_env() -> bool {
    std::env::var("ENVIRONMENT")
        .or_else(|_| std::env::var("APP_ENV"))
        .map(|env| env.to_lowercase() == "production" || env.to_lowercase() == "prod")
        .unwrap_or(false)
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let app_error = &self.0;

        let status = StatusCode::from_u16(app_error.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        log_error(app_error);

        // Always hide details in production; otherwise only for sensitive errors.
        let details = if is_production_env() || app_error.is_sensitive() {
            None
        } else {
            Some(app_error.detailed_message())
        };

        let body = Json(ErrorResponse {
            error: app_error.client_message(),
            details,
            code: app_error.error_code().to_string(),
            recoverable: app_error.is_recoverable(),
            suggested_action: app_error.suggested_action().map(String::from),
        });

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_from_validation_error_unsupported_format() {
        let err = ValidationError::UnsupportedFormat {
            extension: "txt".to_string(),
            allowed: vidnorm_core::ContainerFormat::ALLOWED_EXTENSIONS,
        };
        let HttpAppError(app) = err.into();
        match app {
            AppError::InvalidInput(msg) => {
                assert!(msg.contains("txt"));
                assert!(msg.contains("mp4"));
            }
            other => panic!("Expected InvalidInput, got {:?}", other),
        }
    }

    #[test]
    fn test_from_validation_error_file_too_large_maps_to_413() {
        let err = ValidationError::FileTooLarge {
            size: 1000,
            max: 500,
        };
        let HttpAppError(app) = err.into();
        assert!(matches!(app, AppError::PayloadTooLarge(_)));
        assert_eq!(app.http_status_code(), 413);
    }

    #[test]
    fn test_tool_unavailable_maps_to_503() {
        let err = TranscodeError::ToolUnavailable {
            path: "/usr/bin/ffmpeg".to_string(),
        };
        let HttpAppError(app) = err.into();
        assert!(matches!(app, AppError::TranscoderUnavailable(_)));
        assert_eq!(app.http_status_code(), 503);
        assert_eq!(app.error_code(), "TRANSCODER_UNAVAILABLE");
    }

    #[test]
    fn test_tool_failure_maps_to_500() {
        let err = TranscodeError::ToolFailed {
            exit_code: Some(1),
            stderr: "bad input".to_string(),
        };
        let HttpAppError(app) = err.into();
        assert_eq!(app.http_status_code(), 500);
        assert_eq!(app.error_code(), "TRANSCODE_FAILED");
    }

    #[test]
    fn test_timeout_maps_to_its_own_code() {
        let err = TranscodeError::TimedOut {
            limit: Duration::from_secs(300),
        };
        let HttpAppError(app) = err.into();
        assert!(matches!(app, AppError::TranscodeTimeout(300)));
    }

    #[test]
    fn test_storage_error_is_environment_fault() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        let err = StorageError::IoError(io);
        let HttpAppError(app) = err.into();
        assert!(matches!(app, AppError::Storage(_)));
        assert_eq!(app.http_status_code(), 500);
    }

    /// The public error contract: serialized ErrorResponse has "error",
    /// "code", "recoverable", and optionally "details" / "suggested_action".
    #[test]
    fn test_error_response_shape() {
        let response = ErrorResponse {
            error: "Unsupported format".to_string(),
            details: None,
            code: "INVALID_INPUT".to_string(),
            recoverable: false,
            suggested_action: None,
        };
        let json = serde_json::to_value(&response).expect("serialize");
        assert_eq!(json["error"], "Unsupported format");
        assert_eq!(json["code"], "INVALID_INPUT");
        assert_eq!(json["recoverable"], false);
        assert!(json.get("details").is_none());
    }
}
