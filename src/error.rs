//! Error types for the filer share exporter
//!
//! Only connection-level faults are true errors. Per-page and per-volume
//! anomalies are logged and degrade into partially-empty records instead.

use thiserror::Error;

/// Unified error type for the exporter
#[derive(Error, Debug)]
pub enum Error {
    // =========================================================================
    // Internal Errors
    // =========================================================================
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    // =========================================================================
    // Filer Connection Errors
    // =========================================================================
    #[error("Filer connection error: {filer} - {reason}")]
    Connection { filer: String, reason: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    // =========================================================================
    // Parse Errors
    // =========================================================================
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),
}

impl Error {
    /// Check if this error is transient, i.e. the next poll cycle may succeed
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::Connection { .. } | Error::Http(_))
    }
}

/// Result type alias for the exporter
pub type Result<T> = std::result::Result<T, Error>;
