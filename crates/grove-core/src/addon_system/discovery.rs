//! # Addon Discovery
//!
//! Produces [`AddonDescriptor`]s from the filesystem. The instantiation engine never
//! scans anything itself; it receives descriptors, and nested addons ask discovery
//! for theirs through [`AddonContext::discovery`](crate::addon_system::AddonContext::discovery).
//!
//! [`DirectoryDiscovery`] looks for `<location>/<nested_dir>/*/<manifest_file>` plus
//! every directory listed in the manifest's `addon.paths`.
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::addon_system::descriptor::AddonDescriptor;
use crate::addon_system::error::{AddonSystemError, AddonSystemErrorSource, Result};
use crate::addon_system::manifest::AddonManifest;
use crate::config::HostConfig;
use crate::kernel::constants;
use crate::utils::fs::list_subdirectories;

/// Finds the addons owned by a project or by another addon
pub trait AddonDiscovery: Send + Sync {
    /// Descriptors of the addons owned by the package at `location`
    fn discover(&self, location: &Path, manifest: &AddonManifest) -> Result<Vec<AddonDescriptor>>;
}

/// Discovery that never finds anything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoDiscovery;

impl AddonDiscovery for NoDiscovery {
    fn discover(&self, _location: &Path, _manifest: &AddonManifest) -> Result<Vec<AddonDescriptor>> {
        Ok(Vec::new())
    }
}

/// Manifest-file based discovery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryDiscovery {
    manifest_file: String,
    nested_dir: String,
}

impl DirectoryDiscovery {
    pub fn new(manifest_file: impl Into<String>, nested_dir: impl Into<String>) -> Self {
        Self {
            manifest_file: manifest_file.into(),
            nested_dir: nested_dir.into(),
        }
    }

    pub fn from_config(config: &HostConfig) -> Self {
        Self::new(config.manifest_file.clone(), config.nested_dir.clone())
    }

    pub fn manifest_file(&self) -> &str {
        &self.manifest_file
    }

    /// Load the descriptor of the addon living in `dir`, if it has a manifest
    pub fn load_descriptor(&self, dir: &Path) -> Result<Option<AddonDescriptor>> {
        let manifest_path = dir.join(&self.manifest_file);
        if !manifest_path.is_file() {
            return Ok(None);
        }
        let manifest = AddonManifest::load(&manifest_path)?;
        let name = if manifest.name.is_empty() {
            dir.file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .ok_or_else(|| AddonSystemError::ManifestError {
                    path: manifest_path.clone(),
                    message: "Addon has no name and its directory has none either".to_string(),
                    source: None,
                })?
        } else {
            manifest.name.clone()
        };
        Ok(Some(AddonDescriptor::new(name, dir, manifest)))
    }

    /// Descriptors of every addon directly under `dir`, sorted by directory name
    pub fn discover_in(&self, dir: &Path) -> Result<Vec<AddonDescriptor>> {
        if !dir.is_dir() {
            return Ok(Vec::new());
        }
        let subdirectories = list_subdirectories(dir).map_err(|e| AddonSystemError::ManifestError {
            path: dir.to_path_buf(),
            message: "Failed to scan addon directory".to_string(),
            source: Some(Box::new(AddonSystemErrorSource::Io(e))),
        })?;

        let mut descriptors = Vec::new();
        for subdirectory in subdirectories {
            if let Some(descriptor) = self.load_descriptor(&subdirectory)? {
                descriptors.push(descriptor);
            }
        }
        Ok(descriptors)
    }
}

impl Default for DirectoryDiscovery {
    fn default() -> Self {
        Self::new(constants::DEFAULT_MANIFEST_FILE, constants::DEFAULT_NESTED_DIR)
    }
}

impl AddonDiscovery for DirectoryDiscovery {
    fn discover(&self, location: &Path, manifest: &AddonManifest) -> Result<Vec<AddonDescriptor>> {
        let mut candidates = self.discover_in(&location.join(&self.nested_dir))?;

        for extra in manifest.paths() {
            let dir = location.join(extra);
            match self.load_descriptor(&dir)? {
                Some(descriptor) => candidates.push(descriptor),
                None => log::warn!(
                    "Addon path '{}' listed by '{}' has no {}",
                    dir.display(),
                    manifest.name,
                    self.manifest_file
                ),
            }
        }

        let descriptors = dedup_by_name(candidates)?;
        log::trace!("Discovered {} addon(s) under {}", descriptors.len(), location.display());
        Ok(descriptors)
    }
}

/// Names are unique per owner. The same package reached twice (nested directory and
/// `addon.paths`) is kept once; two packages claiming one name is an error.
fn dedup_by_name(candidates: Vec<AddonDescriptor>) -> Result<Vec<AddonDescriptor>> {
    let mut seen: HashMap<String, PathBuf> = HashMap::new();
    let mut descriptors = Vec::with_capacity(candidates.len());
    for descriptor in candidates {
        let canonical = fs::canonicalize(&descriptor.location).unwrap_or_else(|_| descriptor.location.clone());
        match seen.get(&descriptor.name) {
            Some(existing) if *existing == canonical => {
                log::trace!("Addon '{}' listed twice at {}", descriptor.name, canonical.display());
            }
            Some(existing) => {
                return Err(AddonSystemError::ManifestError {
                    path: descriptor.location.clone(),
                    message: format!(
                        "Addon name '{}' is already used by the package at '{}'",
                        descriptor.name,
                        existing.display()
                    ),
                    source: None,
                });
            }
            None => {
                seen.insert(descriptor.name.clone(), canonical);
                descriptors.push(descriptor);
            }
        }
    }
    Ok(descriptors)
}
