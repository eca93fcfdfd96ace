//! Error types for scene-check
//!
//! The three pipeline families (not found, extraction, session) are caught at
//! the test-case boundary and recorded in the report; everything else aborts
//! the run before any device is touched.

use std::io;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for scene-check
#[derive(Error, Debug)]
pub enum Error {
    // === Element Lookup Errors ===
    #[error("Element not found: {what} (waited {waited_secs}s)")]
    NotFound { what: String, waited_secs: u64 },

    #[error("Could not find {target} after {attempts} scroll attempt(s)")]
    ScrollExhausted { target: String, attempts: usize },

    #[error("No element at index {index} of {what} ({available} available)")]
    IndexOutOfRange {
        what: String,
        index: usize,
        available: usize,
    },

    // === Extraction Errors ===
    #[error("Could not extract description text: {0}")]
    Extraction(String),

    // === Session Errors ===
    #[error("Failed to open device session: {0}")]
    SessionOpen(String),

    #[error("Device session error: {0}")]
    Session(String),

    #[error("Driver command '{command}' failed ({error}): {message}")]
    Protocol {
        command: String,
        error: String,
        message: String,
    },

    #[error("HTTP error talking to automation server: {0}")]
    Http(#[from] reqwest::Error),

    // === Configuration Errors ===
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration file: {0}")]
    ConfigParse(String),

    // === IO Errors ===
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to read file '{path}': {error}")]
    FileRead { path: String, error: String },

    // === Serialization Errors ===
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a not found error for an element description
    pub fn not_found(what: impl Into<String>, waited_secs: u64) -> Self {
        Self::NotFound {
            what: what.into(),
            waited_secs,
        }
    }

    /// Create a protocol error from a WebDriver error body
    pub fn protocol(command: &str, error: &str, message: &str) -> Self {
        Self::Protocol {
            command: command.to_string(),
            error: error.to_string(),
            message: message.to_string(),
        }
    }

    /// Whether this error means "the element never showed up"
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Error::NotFound { .. } | Error::ScrollExhausted { .. } | Error::IndexOutOfRange { .. }
        )
    }

    /// Whether this error came from the driver connection rather than the UI
    pub fn is_session(&self) -> bool {
        matches!(
            self,
            Error::SessionOpen(_) | Error::Session(_) | Error::Protocol { .. } | Error::Http(_)
        )
    }
}
