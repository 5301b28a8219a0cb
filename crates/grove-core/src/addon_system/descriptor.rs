use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::addon_system::manifest::AddonManifest;

/// A discovered addon package: its name, where it lives and its manifest.
///
/// Descriptors are produced by discovery and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddonDescriptor {
    /// Unique addon name, possibly scoped
    pub name: String,
    /// Package directory
    pub location: PathBuf,
    pub manifest: Arc<AddonManifest>,
}

impl AddonDescriptor {
    pub fn new(name: impl Into<String>, location: impl Into<PathBuf>, manifest: AddonManifest) -> Self {
        Self {
            name: name.into(),
            location: location.into(),
            manifest: Arc::new(manifest),
        }
    }

    /// Build a descriptor whose name is taken from the manifest
    pub fn from_manifest(location: impl Into<PathBuf>, manifest: AddonManifest) -> Self {
        let name = manifest.name.clone();
        Self::new(name, location, manifest)
    }

    pub fn location(&self) -> &Path {
        &self.location
    }

    pub fn before(&self) -> &[String] {
        self.manifest.before()
    }

    pub fn after(&self) -> &[String] {
        self.manifest.after()
    }
}
