//! Error types module
//!
//! All failures that can reach a client are unified under [`AppError`]. Each variant
//! self-describes its HTTP status, machine-readable code, retryability and log level
//! through [`ErrorMetadata`], so the HTTP layer and the retry loop never have to match
//! on variants themselves.

use crate::resolver::ValidationError;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues like a flaky CDN
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "RENDER_ERROR")
    fn error_code(&self) -> &'static str;

    /// Whether this error is recoverable (the render/encode/upload chain may be retried)
    fn is_recoverable(&self) -> bool;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Client-safe description of the cause, sent as `details`
    fn client_details(&self) -> Option<String>;

    /// Whether details should be hidden from clients
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Method not allowed: {0}")]
    MethodNotAllowed(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Render error: {0}")]
    Render(String),

    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("Upload error: {0}")]
    Upload(String),

    #[error("Request timed out after {0} s")]
    Timeout(u64),

    #[error("Configuration error: {0}")]
    Configuration(String),

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

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidInput(format!("JSON parsing error: {}", err))
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::InvalidInput(err.to_string())
    }
}

/// Static metadata for each variant: (http_status, error_code, recoverable, sensitive, log_level).
fn app_error_static_metadata(err: &AppError) -> (u16, &'static str, bool, bool, LogLevel) {
    match err {
        AppError::InvalidInput(_) => (400, "INVALID_INPUT", false, false, LogLevel::Debug),
        AppError::MethodNotAllowed(_) => {
            (405, "METHOD_NOT_ALLOWED", false, false, LogLevel::Debug)
        }
        AppError::PayloadTooLarge(_) => (413, "PAYLOAD_TOO_LARGE", false, false, LogLevel::Debug),
        AppError::Render(_) => (500, "RENDER_ERROR", true, false, LogLevel::Error),
        AppError::Encoding(_) => (500, "ENCODING_ERROR", true, false, LogLevel::Error),
        AppError::Upload(_) => (500, "UPLOAD_ERROR", true, false, LogLevel::Warn),
        AppError::Timeout(_) => (500, "TIMEOUT", false, false, LogLevel::Warn),
        AppError::Configuration(_) => (500, "CONFIGURATION_ERROR", false, true, LogLevel::Error),
        AppError::Internal(_) => (500, "INTERNAL_ERROR", false, true, LogLevel::Error),
        AppError::InternalWithSource { .. } => {
            (500, "INTERNAL_ERROR", false, true, LogLevel::Error)
        }
    }
}

impl AppError {
    /// Get the error type name for detailed error responses
    pub fn error_type(&self) -> &str {
        match self {
            AppError::InvalidInput(_) => "ValidationError",
            AppError::MethodNotAllowed(_) => "MethodNotAllowed",
            AppError::PayloadTooLarge(_) => "PayloadTooLarge",
            AppError::Render(_) => "RenderError",
            AppError::Encoding(_) => "EncodingError",
            AppError::Upload(_) => "UploadError",
            AppError::Timeout(_) => "Timeout",
            AppError::Configuration(_) => "ConfigurationError",
            AppError::Internal(_) => "Internal",
            AppError::InternalWithSource { .. } => "Internal",
        }
    }

    /// Get detailed error information including error chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
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

    fn is_sensitive(&self) -> bool {
        app_error_static_metadata(self).3
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).4
    }

    fn client_message(&self) -> String {
        match self {
            AppError::InvalidInput(ref msg) => msg.clone(),
            AppError::MethodNotAllowed(_) => "Method not allowed".to_string(),
            AppError::PayloadTooLarge(ref msg) => msg.clone(),
            AppError::Render(ref msg) => msg.clone(),
            AppError::Encoding(ref msg) => msg.clone(),
            AppError::Upload(_) => "Gagal upload gambar ke CDN".to_string(),
            AppError::Timeout(_) => "Request timed out".to_string(),
            AppError::Configuration(_) => "Internal server error".to_string(),
            AppError::Internal(_) => "Internal server error".to_string(),
            AppError::InternalWithSource { .. } => "Internal server error".to_string(),
        }
    }

    fn client_details(&self) -> Option<String> {
        match self {
            AppError::MethodNotAllowed(ref method) => {
                Some(format!("{} is not supported on this endpoint", method))
            }
            AppError::Upload(ref msg) => Some(msg.clone()),
            AppError::Timeout(secs) => Some(format!("No response within {} s", secs)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_metadata_invalid_input() {
        let err = AppError::InvalidInput("missing required field: sender".to_string());
        assert_eq!(err.http_status_code(), 400);
        assert_eq!(err.error_code(), "INVALID_INPUT");
        assert!(!err.is_recoverable());
        assert_eq!(err.client_message(), "missing required field: sender");
        assert!(!err.is_sensitive());
        assert_eq!(err.log_level(), LogLevel::Debug);
    }

    #[test]
    fn test_error_metadata_pipeline_errors_are_recoverable() {
        assert!(AppError::Render("font".to_string()).is_recoverable());
        assert!(AppError::Encoding("png".to_string()).is_recoverable());
        assert!(AppError::Upload("503".to_string()).is_recoverable());
        assert!(!AppError::Configuration("html".to_string()).is_recoverable());
    }

    #[test]
    fn test_error_metadata_upload() {
        let err = AppError::Upload("CDN returned 503 Service Unavailable: busy".to_string());
        assert_eq!(err.http_status_code(), 500);
        assert_eq!(err.error_code(), "UPLOAD_ERROR");
        assert_eq!(err.client_message(), "Gagal upload gambar ke CDN");
        assert_eq!(
            err.client_details().as_deref(),
            Some("CDN returned 503 Service Unavailable: busy")
        );
        assert_eq!(err.log_level(), LogLevel::Warn);
    }

    #[test]
    fn test_error_metadata_method_not_allowed() {
        let err = AppError::MethodNotAllowed("PUT".to_string());
        assert_eq!(err.http_status_code(), 405);
        assert_eq!(err.client_message(), "Method not allowed");
        assert!(err.client_details().unwrap().contains("PUT"));
    }

    #[test]
    fn test_error_metadata_timeout() {
        let err = AppError::Timeout(92);
        assert_eq!(err.http_status_code(), 500);
        assert_eq!(err.error_code(), "TIMEOUT");
        assert!(!err.is_recoverable());
        assert!(!err.is_sensitive());
        assert_eq!(err.client_details().as_deref(), Some("No response within 92 s"));
    }

    #[test]
    fn test_internal_hides_message() {
        let err = AppError::Internal("secret path /etc".to_string());
        assert_eq!(err.client_message(), "Internal server error");
        assert!(err.is_sensitive());
        assert!(err.detailed_message().contains("/etc"));
    }

    #[test]
    fn test_validation_error_conversion() {
        let err: AppError = ValidationError::MissingField("message").into();
        assert_eq!(err.http_status_code(), 400);
        assert!(err.client_message().contains("missing required field"));
    }
}
