//! # Grove Core Kernel Errors
//!
//! Defines the umbrella [`Error`] for `grove-core`. Each subsystem keeps its own
//! typed error ([`AddonSystemError`], [`ConfigError`]); this enum wraps them so that
//! callers driving several subsystems at once (the CLI, [`Application`](super::Application))
//! can use a single `Result` type.
use std::path::PathBuf;
use std::result::Result as StdResult;

use thiserror::Error as ThisError;

use crate::addon_system::error::AddonSystemError;
use crate::addon_system::ordering::OrderingError;
use crate::config::error::ConfigError;

#[derive(Debug, ThisError)]
pub enum Error {
    /// Specific, typed addon system error
    #[error("Addon system error: {0}")]
    AddonSystem(#[from] AddonSystemError),

    /// Configuration loading error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("I/O error during operation '{operation}' on path '{path}': {source}")]
    Io {
        #[source]
        source: std::io::Error,
        path: PathBuf,
        operation: String,
    },

    /// Generic error with message
    #[error("Error: {0}")]
    Other(String),
}

/// Shorthand for Result with our Error type
pub type Result<T> = StdResult<T, Error>;

impl From<OrderingError> for Error {
    fn from(err: OrderingError) -> Self {
        Error::AddonSystem(AddonSystemError::Ordering(err))
    }
}

impl From<&str> for Error {
    fn from(msg: &str) -> Self {
        Error::Other(msg.to_string())
    }
}

impl From<String> for Error {
    fn from(msg: String) -> Self {
        Error::Other(msg)
    }
}

impl Error {
    pub fn io(source: std::io::Error, operation: impl Into<String>, path: PathBuf) -> Self {
        Error::Io {
            source,
            operation: operation.into(),
            path,
        }
    }
}
