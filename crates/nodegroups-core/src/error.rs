//! Error types for nodegroups operations.
//!
//! Every failure a client can hit (transport, decoding, application status,
//! configuration) is represented by a single [`Error`] enum. Each variant
//! carries the human-readable detail that is recorded as the client's last
//! error.

use reqwest::StatusCode;
use thiserror::Error;

/// Main error type for nodegroups operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// The API endpoint could not be reached
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// The server answered with a non-2xx status line
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    /// Operation timed out
    #[error("Timeout: {0}")]
    Timeout(String),

    /// The response body was not valid JSON for the expected shape
    #[error("Failed to decode response: {0}")]
    DecodeError(String),

    /// The API reported a status other than 200
    #[error("API error {status}: {message}")]
    ApiError {
        /// Status reported in the response body
        status: String,
        /// Message reported in the response body
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Lookup of a parameter name that does not exist
    #[error("Unknown parameter: {0}")]
    UnknownParameter(String),

    /// Invalid endpoint URL or path
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// Invalid request arguments
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),
}

/// Specialized result type for nodegroups operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Returns the error code for this error type.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
            Self::HttpError(_) => "HTTP_ERROR",
            Self::Timeout(_) => "TIMEOUT",
            Self::DecodeError(_) => "DECODE_ERROR",
            Self::ApiError { .. } => "API_ERROR",
            Self::ConfigError(_) => "CONFIG_ERROR",
            Self::UnknownParameter(_) => "UNKNOWN_PARAMETER",
            Self::InvalidEndpoint(_) => "INVALID_ENDPOINT",
            Self::InvalidRequest(_) => "INVALID_REQUEST",
            Self::ValidationError(_) => "VALIDATION_ERROR",
        }
    }

    /// The bare detail string, without the variant prefix.
    ///
    /// For HTTP failures this is the status line, for API failures the
    /// `message` field of the response.
    #[must_use]
    pub fn detail(&self) -> &str {
        match self {
            Self::ApiError { message, .. } => message,
            Self::ServiceUnavailable(detail)
            | Self::HttpError(detail)
            | Self::Timeout(detail)
            | Self::DecodeError(detail)
            | Self::ConfigError(detail)
            | Self::UnknownParameter(detail)
            | Self::InvalidEndpoint(detail)
            | Self::InvalidRequest(detail)
            | Self::ValidationError(detail) => detail,
        }
    }

    /// Build an error from a non-success HTTP status.
    #[must_use]
    pub fn from_status(status: StatusCode) -> Self {
        Self::HttpError(status_line(status))
    }
}

/// Render a status as `"<code> <reason>"`, e.g. `404 Not Found`.
#[must_use]
pub fn status_line(status: StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => format!("{} {reason}", status.as_u16()),
        None => status.as_u16().to_string(),
    }
}

// Conversions from external error types
impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else if err.is_connect() {
            Self::ServiceUnavailable(err.to_string())
        } else if err.is_decode() {
            Self::DecodeError(err.to_string())
        } else if let Some(status) = err.status() {
            Self::from_status(status)
        } else {
            Self::HttpError(err.to_string())
        }
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidEndpoint(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::DecodeError(err.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::ConfigError(err.to_string())
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::ValidationError(err.to_string())
    }
}
