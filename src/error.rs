//! Error types for pagewalk
//!
//! This module defines the error hierarchy for the entire engine.
//! All public APIs return `Result<T, Error>` where Error is defined here.

use thiserror::Error;

/// The main error type for pagewalk
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // Detection Errors
    // ============================================================================
    #[error("Detection failed: {message}")]
    Detection { message: String },

    // ============================================================================
    // Navigation Errors
    // ============================================================================
    #[error("Navigation failed: {message}")]
    Navigation { message: String },

    #[error("Navigation retries ({max_attempts}) exhausted")]
    RetriesExhausted { max_attempts: u32 },

    // ============================================================================
    // Extraction Errors
    // ============================================================================
    #[error("Extraction failed on page {page}: {message}")]
    Extraction { page: u32, message: String },

    // ============================================================================
    // Browser Driver Errors
    // ============================================================================
    #[error("Browser driver error: {message}")]
    Browser { message: String },

    #[error("Timed out after {timeout_ms}ms waiting for '{selector}'")]
    WaitTimeout { selector: String, timeout_ms: u64 },

    // ============================================================================
    // State Errors
    // ============================================================================
    #[error("State error: {message}")]
    State { message: String },

    #[error("Page number must be >= 1, got {page}")]
    InvalidPage { page: i64 },

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a detection error
    pub fn detection(message: impl Into<String>) -> Self {
        Self::Detection {
            message: message.into(),
        }
    }

    /// Create a navigation error
    pub fn navigation(message: impl Into<String>) -> Self {
        Self::Navigation {
            message: message.into(),
        }
    }

    /// Create an extraction error
    pub fn extraction(page: u32, message: impl Into<String>) -> Self {
        Self::Extraction {
            page,
            message: message.into(),
        }
    }

    /// Create a browser driver error
    pub fn browser(message: impl Into<String>) -> Self {
        Self::Browser {
            message: message.into(),
        }
    }

    /// Create a state error
    pub fn state(message: impl Into<String>) -> Self {
        Self::State {
            message: message.into(),
        }
    }

    /// Check if this error is recoverable within a pagination run.
    ///
    /// Recoverable errors are recorded against the current page and the run
    /// continues (or retries); anything else should stop the caller.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::Navigation { .. }
                | Error::RetriesExhausted { .. }
                | Error::Extraction { .. }
                | Error::Browser { .. }
                | Error::WaitTimeout { .. }
        )
    }
}

/// Result type alias for pagewalk
pub type Result<T> = std::result::Result<T, Error>;
