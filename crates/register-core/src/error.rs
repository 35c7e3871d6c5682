//! Error types for the risk register.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration file error: {0}")]
    ConfigFile(#[from] config::ConfigError),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("{source_name} lookup failed: {message}")]
    Lookup {
        source_name: &'static str,
        message: String,
    },
}

impl Error {
    /// Build a lookup error for a host-provided collaborator.
    pub fn lookup(source_name: &'static str, message: impl Into<String>) -> Self {
        Self::Lookup {
            source_name,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
