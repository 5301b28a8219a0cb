//! # Grove Addon System Errors
//!
//! [`AddonSystemError`] covers every way an instantiation call can abort: an
//! unsatisfiable ordering, an entry point that does not exist, a loader that cannot
//! produce a module, a failing constructor, and a failing nested discovery.
//! None of these are retried; the first one aborts the whole call.
use std::path::PathBuf;
use std::sync::Arc;

use libloading::Library;

use crate::addon_system::module::BoxError;
use crate::addon_system::ordering::OrderingError;

#[derive(Debug, thiserror::Error)]
pub enum AddonSystemError {
    #[error("Addon ordering failed: {0}")]
    Ordering(#[from] OrderingError),

    #[error("Entry point for addon '{addon}' not found at '{}': {source}", path.display())]
    MissingEntryPoint {
        addon: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to load addon module from '{}': {source}", path.display())]
    ModuleLoad {
        path: PathBuf,
        #[source]
        source: Box<AddonSystemErrorSource>,
    },

    #[error("Addon '{addon}' (at '{}') failed to construct: {source}", location.display())]
    Construction {
        addon: String,
        location: PathBuf,
        #[source]
        source: BoxError,
        /// Library the error's code came from; dropped after `source`
        library: Option<Arc<Library>>,
    },

    #[error("Addon '{addon}' failed to initialize its nested addons: {source}")]
    NestedInitialization {
        addon: String,
        #[source]
        source: BoxError,
        /// Library the error's code came from; dropped after `source`
        library: Option<Arc<Library>>,
    },

    #[error("Addon manifest error for '{}': {message}", path.display())]
    ManifestError {
        path: PathBuf,
        message: String,
        #[source]
        source: Option<Box<AddonSystemErrorSource>>,
    },

    #[error("Internal addon system error: {0}")]
    InternalError(String),
}

#[derive(Debug, thiserror::Error)]
pub enum AddonSystemErrorSource {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Library(#[from] libloading::Error),
    #[error("Other: {0}")]
    Other(String),
}

impl From<String> for AddonSystemErrorSource {
    fn from(msg: String) -> Self {
        AddonSystemErrorSource::Other(msg)
    }
}

/// Shorthand for results produced by the addon system
pub type Result<T> = std::result::Result<T, AddonSystemError>;

impl AddonSystemError {
    pub(crate) fn module_load(path: impl Into<PathBuf>, source: impl Into<AddonSystemErrorSource>) -> Self {
        AddonSystemError::ModuleLoad {
            path: path.into(),
            source: Box::new(source.into()),
        }
    }

    /// Name of the addon the error is attributed to, when there is one.
    pub fn addon_name(&self) -> Option<&str> {
        match self {
            AddonSystemError::MissingEntryPoint { addon, .. }
            | AddonSystemError::Construction { addon, .. }
            | AddonSystemError::NestedInitialization { addon, .. } => Some(addon),
            _ => None,
        }
    }
}
