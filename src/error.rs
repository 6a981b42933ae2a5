//! Error types and handling for the irrigation advisor

use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

/// Main error type for the irrigation advisor
#[derive(Error, Debug)]
pub enum AdvisorError {
    /// The user refused location access; terminal for the session
    #[error("Location permission denied")]
    PermissionDenied,

    /// No coordinate could be obtained; terminal for the session
    #[error("Location unavailable: {message}")]
    LocationUnavailable { message: String },

    /// A single weather request failed
    #[error("Weather fetch failed: {source}")]
    Fetch {
        #[from]
        source: FetchError,
    },

    /// Missing or invalid settings
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Rejected user input, e.g. a coordinate out of range
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// Socket or file failure
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl AdvisorError {
    /// Create a new location-unavailable error
    pub fn location_unavailable<S: Into<String>>(message: S) -> Self {
        Self::LocationUnavailable {
            message: message.into(),
        }
    }

    /// Shorthand for [`AdvisorError::Config`]
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Shorthand for [`AdvisorError::Validation`]
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Single generic message shown on the screen for this error
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            AdvisorError::PermissionDenied => {
                "Permission to access location was denied".to_string()
            }
            AdvisorError::LocationUnavailable { .. } => "Location is unavailable".to_string(),
            AdvisorError::Fetch { .. } => "Failed to fetch weather data".to_string(),
            AdvisorError::Config { .. } => {
                "Configuration error. Please check your config file and API key.".to_string()
            }
            AdvisorError::Validation { message } => format!("Invalid input: {message}"),
            AdvisorError::Io { .. } => "Local I/O failed".to_string(),
        }
    }
}

/// Failure of one weather request
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    /// Connection, DNS or TLS failure, or retries exhausted on a transport error
    #[error("network error: {0}")]
    Network(String),

    /// Provider answered with a non-success status
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// Body could not be decoded into the expected shape
    #[error("malformed response: {0}")]
    Malformed(String),

    /// The call did not complete within its bound
    #[error("timed out after {0:?}")]
    Timeout(Duration),
}

impl FetchError {
    /// Coarse category reported to the presentation layer.
    ///
    /// Malformed payloads are reported as network failures.
    #[must_use]
    pub fn kind(&self) -> FetchErrorKind {
        match self {
            FetchError::Network(_) | FetchError::Malformed(_) => FetchErrorKind::NetworkFailure,
            FetchError::Status { status: 401, .. } => FetchErrorKind::Unauthorized,
            FetchError::Status { .. } => FetchErrorKind::NetworkFailure,
            FetchError::Timeout(_) => FetchErrorKind::Timeout,
        }
    }
}

/// Distinguishable failure kind attached to each degraded section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchErrorKind {
    NetworkFailure,
    Unauthorized,
    Timeout,
}
