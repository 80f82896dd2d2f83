//! Error types module
//!
//! All failures cross the HTTP boundary as the unified `AppError` enum, which
//! self-describes its response characteristics through `ErrorMetadata`.
//! Domain crates keep their own richer error enums (validation, storage,
//! transcoding) and are folded into `AppError` at the API layer.

use std::io;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues like a failed transcode
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
/// This trait allows errors to self-describe their HTTP response characteristics
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "TRANSCODE_FAILED")
    fn error_code(&self) -> &'static str;

    /// Whether this error is recoverable (can be retried)
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the client
    fn suggested_action(&self) -> Option<&'static str>;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Whether details should be hidden in production
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("File too large: {0}")]
    PayloadTooLarge(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Transcoding tool unavailable: {0}")]
    TranscoderUnavailable(String),

    #[error("Transcoding failed: {0}")]
    TranscodeFailed(String),

    #[error("Transcoding timed out after {0}s")]
    TranscodeTimeout(u64),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Internal(format!("IO error: {}", err))
    }
}

/// Static metadata for each variant:
/// (http_status, error_code, recoverable, suggested_action, sensitive, log_level).
/// client_message stays per-variant for dynamic content.
fn app_error_static_metadata(
    err: &AppError,
) -> (u16, &'static str, bool, Option<&'static str>, bool, LogLevel) {
    match err {
        AppError::InvalidInput(_) => (400, "INVALID_INPUT", false, None, false, LogLevel::Debug),
        AppError::PayloadTooLarge(_) => (
            413,
            "PAYLOAD_TOO_LARGE",
            false,
            Some("Upload a smaller file"),
            false,
            LogLevel::Debug,
        ),
        AppError::Storage(_) => (500, "STORAGE_ERROR", true, None, true, LogLevel::Error),
        AppError::TranscoderUnavailable(_) => (
            503,
            "TRANSCODER_UNAVAILABLE",
            true,
            Some("Check that ffmpeg is installed and FFMPEG_PATH points at it"),
            false,
            LogLevel::Error,
        ),
        AppError::TranscodeFailed(_) => {
            (500, "TRANSCODE_FAILED", false, None, false, LogLevel::Warn)
        }
        AppError::TranscodeTimeout(_) => (
            500,
            "TRANSCODE_TIMEOUT",
            true,
            Some("Retry with a shorter video"),
            false,
            LogLevel::Warn,
        ),
        AppError::Internal(_) => (500, "INTERNAL_ERROR", false, None, true, LogLevel::Error),
        AppError::InternalWithSource { .. } => {
            (500, "INTERNAL_ERROR", false, None, true, LogLevel::Error)
        }
    }
}

impl AppError {
    /// Variant name for structured logging.
    pub fn error_type(&self) -> &'static str {
        match self {
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::PayloadTooLarge(_) => "PayloadTooLarge",
            AppError::Storage(_) => "Storage",
            AppError::TranscoderUnavailable(_) => "TranscoderUnavailable",
            AppError::TranscodeFailed(_) => "TranscodeFailed",
            AppError::TranscodeTimeout(_) => "TranscodeTimeout",
            AppError::Internal(_) => "Internal",
            AppError::InternalWithSource { .. } => "InternalWithSource",
        }
    }

    /// Full message including the source chain, for non-production detail fields.
    pub fn detailed_message(&self) -> String {
        match self {
            AppError::InternalWithSource { message, source } => {
                format!("{}: {:#}", message, source)
            }
            other => other.to_string(),
        }
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn is_recoverable(&self) -> bool {
        app_error_static_metadata(self).2
    }

    fn suggested_action(&self) -> Option<&'static str> {
        app_error_static_metadata(self).3
    }

    fn client_message(&self) -> String {
        match self {
            AppError::InvalidInput(msg) => msg.clone(),
            AppError::PayloadTooLarge(msg) => format!("File too large: {}", msg),
            AppError::Storage(_) => "Failed to store the uploaded video".to_string(),
            AppError::TranscoderUnavailable(_) => {
                "Video normalization is temporarily unavailable".to_string()
            }
            AppError::TranscodeFailed(msg) => format!("Video normalization failed: {}", msg),
            AppError::TranscodeTimeout(secs) => {
                format!("Video normalization timed out after {}s", secs)
            }
            AppError::Internal(_) | AppError::InternalWithSource { .. } => {
                "Internal server error".to_string()
            }
        }
    }

    fn is_sensitive(&self) -> bool {
        app_error_static_metadata(self).4
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).5
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_errors_are_client_faults() {
        let err = AppError::InvalidInput("Unsupported format: txt".to_string());
        assert_eq!(err.http_status_code(), 400);
        assert_eq!(err.error_code(), "INVALID_INPUT");
        assert_eq!(err.log_level(), LogLevel::Debug);
        assert!(!err.is_sensitive());
    }

    #[test]
    fn test_tool_unavailable_is_distinct_from_tool_failure() {
        let unavailable = AppError::TranscoderUnavailable("ffmpeg".to_string());
        let failed = AppError::TranscodeFailed("exit code 1".to_string());
        assert_ne!(unavailable.error_code(), failed.error_code());
        assert_eq!(unavailable.http_status_code(), 503);
        assert_eq!(failed.http_status_code(), 500);
        assert_eq!(unavailable.log_level(), LogLevel::Error);
    }

    #[test]
    fn test_sensitive_errors_hide_internals_from_clients() {
        let err = AppError::Storage("disk full at /var/lib/vidnorm".to_string());
        assert!(err.is_sensitive());
        assert!(!err.client_message().contains("/var/lib"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "denied");
        let err = AppError::from(io_err);
        assert!(matches!(err, AppError::Internal(_)));
    }
}
