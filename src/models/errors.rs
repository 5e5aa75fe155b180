//! Centralized Error Handling Module
//!
//! Every failure carries a stable error code so the HTTP layer can pick a
//! status and the logs stay greppable.
//!
//! Error codes follow pattern: CATEGORY_SPECIFIC_ERROR
//! - INVALID_xxx: caller sent something we refuse to process
//! - EXTERNAL_xxx: the vision model misbehaved
//! - STATE_xxx / STORAGE_xxx: reference store problems
//! - CFG_xxx: configuration errors

use std::fmt;

/// Application-wide error type
#[derive(Debug)]
pub struct AppError {
    /// Unique error code for logging/monitoring
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Optional underlying error
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new AppError
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Create AppError with source error
    pub fn with_source(
        code: ErrorCode,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Get error code as string (for logging)
    pub fn code_str(&self) -> &'static str {
        self.code.as_str()
    }

    /// Message including the underlying cause, if any
    pub fn detail(&self) -> String {
        match &self.source {
            Some(source) => format!("{}: {}", self.message, source),
            None => self.message.clone(),
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Unique error codes for monitoring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // ============================================
    // Input Errors
    // ============================================
    /// Upload is not an image (by declared content type) or is missing
    InvalidInput,
    /// Request body is over the configured upload limit
    PayloadTooLarge,

    // ============================================
    // External Model Errors
    // ============================================
    /// Model call failed or returned no usable text
    ExternalService,
    /// Model call exceeded the configured client timeout
    ExternalTimeout,

    // ============================================
    // Reference Store Errors
    // ============================================
    /// Cached layout exists but does not parse
    MalformedState,
    /// Reading or writing the reference slot failed
    StorageIo,

    // ============================================
    // Configuration Errors
    // ============================================
    /// Missing environment variable
    ConfigMissingEnv,
    /// Invalid configuration value
    ConfigInvalidValue,

    // ============================================
    // Generic Errors
    // ============================================
    /// Unknown error
    Unknown,
}

impl ErrorCode {
    /// Get string representation of error code
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidInput => "INVALID_INPUT",
            Self::PayloadTooLarge => "INVALID_PAYLOAD_TOO_LARGE",
            Self::ExternalService => "EXTERNAL_SERVICE_ERROR",
            Self::ExternalTimeout => "EXTERNAL_TIMEOUT",
            Self::MalformedState => "STATE_MALFORMED",
            Self::StorageIo => "STORAGE_IO_ERROR",
            Self::ConfigMissingEnv => "CFG_MISSING_ENV",
            Self::ConfigInvalidValue => "CFG_INVALID_VALUE",
            Self::Unknown => "UNKNOWN_ERROR",
        }
    }

    /// Get HTTP status code for API responses
    pub fn http_status(&self) -> u16 {
        match self {
            Self::InvalidInput => 400,
            Self::PayloadTooLarge => 413,
            _ => 500,
        }
    }
}

// ============================================
// Convenience constructors
// ============================================

impl AppError {
    /// Upload rejected before any model call
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, msg)
    }

    /// Upload exceeded the body limit
    pub fn payload_too_large(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::PayloadTooLarge, msg)
    }

    /// Model call failed or produced nothing usable
    pub fn external_service(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ExternalService, msg)
    }

    /// Cached layout could not be parsed
    pub fn malformed_state(msg: impl Into<String>, source: serde_json::Error) -> Self {
        Self::with_source(ErrorCode::MalformedState, msg, source)
    }

    /// Storage read/write failure with context
    pub fn storage(msg: impl Into<String>, source: std::io::Error) -> Self {
        Self::with_source(ErrorCode::StorageIo, msg, source)
    }

    /// Missing environment variable
    pub fn missing_env(name: &str) -> Self {
        Self::new(
            ErrorCode::ConfigMissingEnv,
            format!("Missing environment variable: {}", name),
        )
    }

    /// Invalid configuration value
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigInvalidValue, msg)
    }
}

// ============================================
// Result type alias
// ============================================

/// Application Result type
pub type AppResult<T> = Result<T, AppError>;

// ============================================
// Conversion from common error types
// ============================================

impl From<eyre::Report> for AppError {
    fn from(err: eyre::Report) -> Self {
        Self::new(ErrorCode::Unknown, err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::with_source(ErrorCode::StorageIo, "IO error", err)
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::new(ErrorCode::ExternalTimeout, "Model request timed out")
        } else if err.is_connect() {
            Self::new(ErrorCode::ExternalService, "Connection to model endpoint failed")
        } else {
            Self::new(ErrorCode::ExternalService, err.to_string())
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(ErrorCode::Unknown, "JSON error", err)
    }
}
