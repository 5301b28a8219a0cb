//! # Entry Point Resolution
//!
//! Maps an addon's manifest to the module file that implements it:
//!
//! 1. `addon.main` wins over the top-level `main`.
//! 2. No `main`, an empty one, `.` or `./` means `index.<ext>`; a `main` ending in
//!    `/` names a directory and resolves to its `index.<ext>`.
//! 3. A `main` without an extension gets `.<ext>` appended.
//! 4. The result is joined to the descriptor's location and canonicalized, following
//!    symbolic links. A path that cannot be canonicalized is a hard error.
use std::fs;
use std::path::{Path, PathBuf};

use crate::addon_system::descriptor::AddonDescriptor;
use crate::addon_system::error::{AddonSystemError, Result};
use crate::addon_system::manifest::AddonManifest;
use crate::kernel::constants;

/// Resolves addon entry points against the filesystem
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryPointResolver {
    module_extension: String,
}

impl EntryPointResolver {
    /// Create a resolver appending `module_extension` (without the dot) to bare entry points
    pub fn new(module_extension: impl Into<String>) -> Self {
        let module_extension = module_extension.into();
        Self {
            module_extension: module_extension.trim_start_matches('.').to_string(),
        }
    }

    pub fn module_extension(&self) -> &str {
        &self.module_extension
    }

    /// Entry point relative to the addon location, before touching the filesystem
    pub fn relative_entry_point(&self, manifest: &AddonManifest) -> PathBuf {
        let main = manifest
            .entry_main()
            .map(str::trim)
            .filter(|main| !main.is_empty() && *main != "." && *main != "./");

        match main {
            None => PathBuf::from(self.index_file()),
            Some(dir) if dir.ends_with('/') => Path::new(dir).join(self.index_file()),
            Some(main) if Path::new(main).extension().is_none() => {
                PathBuf::from(format!("{}.{}", main, self.module_extension))
            }
            Some(main) => PathBuf::from(main),
        }
    }

    /// Resolve the canonical, absolute entry point of `descriptor`
    pub fn resolve(&self, descriptor: &AddonDescriptor) -> Result<PathBuf> {
        let candidate = descriptor.location.join(self.relative_entry_point(&descriptor.manifest));
        let resolved = fs::canonicalize(&candidate).map_err(|source| AddonSystemError::MissingEntryPoint {
            addon: descriptor.name.clone(),
            path: candidate.clone(),
            source,
        })?;
        log::trace!("Entry point for '{}': {}", descriptor.name, resolved.display());
        Ok(resolved)
    }

    fn index_file(&self) -> String {
        format!("{}.{}", constants::INDEX_STEM, self.module_extension)
    }
}

impl Default for EntryPointResolver {
    fn default() -> Self {
        Self::new(constants::MODULE_EXTENSION)
    }
}
