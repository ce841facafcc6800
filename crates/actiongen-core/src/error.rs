//! Error handling for the actiongen code generation library.
//!
//! This module defines the main error type `Error` used throughout the library,
//! along with a convenient `Result` type alias. It uses `thiserror` for easy
//! error handling and implements conversions from common error types.
//!
//! # Examples
//!
//! ```
//! use actiongen_core::error::{Error, Result};
//!
//! fn might_fail(entries: usize) -> Result<()> {
//!     if entries == 0 {
//!         return Err(Error::schema("schema declares no actions"));
//!     }
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// Result type for actiongen operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for actiongen operations
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML manifest parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// HTTP error while fetching a remote schema
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The action schema is malformed
    #[error("Schema error: {0}")]
    Schema(String),

    /// Template error
    #[error("Template error: {0}")]
    Template(String),

    /// Template engine error
    #[error("Template engine error: {0}")]
    Tera(#[from] tera::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new schema-shape error
    pub fn schema<S: Into<String>>(msg: S) -> Self {
        Self::Schema(msg.into())
    }

    /// Create a new template error
    pub fn template<S: Into<String>>(msg: S) -> Self {
        Self::Template(msg.into())
    }

    /// Whether this error was raised by schema validation
    pub fn is_schema(&self) -> bool {
        matches!(self, Self::Schema(_) | Self::Yaml(_))
    }
}
