//! # Module Loaders
//!
//! A [`ModuleLoader`] turns a resolved entry point into an [`AddonModule`]. The
//! instantiation engine only knows the trait, so tests and hosts can plug in whatever
//! source of modules they have:
//!
//! - [`StaticModuleLoader`]: a table of modules registered at startup.
//! - [`JsonModuleLoader`]: a `.json` entry point is read as a declarative record.
//! - [`DylibModuleLoader`]: a dynamic library exporting `grove_addon_module`.
//! - [`DefaultModuleLoader`]: the three above, tried in that order.
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use libloading::{Library, Symbol};

use crate::addon_system::error::{AddonSystemError, Result};
use crate::addon_system::module::{AddonDefinition, AddonModule, ModuleEntryFn};
use crate::kernel::constants;
use crate::utils::fs::has_extension;

/// Loads the module implementing an addon from its canonical entry point
pub trait ModuleLoader: Send + Sync {
    fn load(&self, path: &Path) -> Result<AddonModule>;
}

/// Modules registered ahead of time, keyed by entry point path
#[derive(Debug, Default, Clone)]
pub struct StaticModuleLoader {
    modules: HashMap<PathBuf, AddonModule>,
}

impl StaticModuleLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `module` for `path`. The path is canonicalized when it exists, so it
    /// matches what the entry point resolver produces.
    pub fn register(&mut self, path: impl AsRef<Path>, module: AddonModule) -> &mut Self {
        let path = path.as_ref();
        let key = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        if self.modules.insert(key, module).is_some() {
            log::warn!("Replacing static addon module registered for {}", path.display());
        }
        self
    }

    pub fn with_module(mut self, path: impl AsRef<Path>, module: AddonModule) -> Self {
        self.register(path, module);
        self
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.modules.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

impl ModuleLoader for StaticModuleLoader {
    fn load(&self, path: &Path) -> Result<AddonModule> {
        self.modules
            .get(path)
            .cloned()
            .ok_or_else(|| AddonSystemError::module_load(path, "No static module registered for this path".to_string()))
    }
}

/// Reads `.json` entry points as declarative addon records
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonModuleLoader;

impl ModuleLoader for JsonModuleLoader {
    fn load(&self, path: &Path) -> Result<AddonModule> {
        let content = fs::read_to_string(path).map_err(|e| AddonSystemError::module_load(path, e))?;
        let definition: AddonDefinition =
            serde_json::from_str(&content).map_err(|e| AddonSystemError::module_load(path, e))?;
        Ok(AddonModule::Declarative(definition))
    }
}

/// Loads addon modules from dynamic libraries.
///
/// Every module returned carries an `Arc` of its library, and so does every
/// [`AddonType`](crate::addon_system::AddonType) and instance built from it. A
/// library therefore stays loaded until the last addon using its code is dropped,
/// whatever happens to the loader. The loader keeps its own handle so repeated loads
/// of the same path share one library.
///
/// Modules cross the library boundary as Rust values: addon libraries must be built
/// with the same toolchain and `grove-core` version as the host.
#[derive(Debug, Default)]
pub struct DylibModuleLoader {
    libraries: Mutex<HashMap<PathBuf, Arc<Library>>>,
}

impl DylibModuleLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of libraries currently held open by the loader itself
    pub fn loaded_count(&self) -> usize {
        self.libraries.lock().map(|libraries| libraries.len()).unwrap_or(0)
    }

    fn library(&self, path: &Path) -> Result<Arc<Library>> {
        let mut libraries = self
            .libraries
            .lock()
            .map_err(|_| AddonSystemError::InternalError("Dynamic library table lock poisoned".to_string()))?;

        match libraries.entry(path.to_path_buf()) {
            Entry::Occupied(entry) => Ok(Arc::clone(entry.get())),
            Entry::Vacant(entry) => {
                // Loading runs the library's initializers; only trusted addons are loaded.
                let library = unsafe { Library::new(path) }.map_err(|e| AddonSystemError::module_load(path, e))?;
                log::debug!("Loaded addon library {}", path.display());
                Ok(Arc::clone(entry.insert(Arc::new(library))))
            }
        }
    }
}

impl ModuleLoader for DylibModuleLoader {
    fn load(&self, path: &Path) -> Result<AddonModule> {
        let library = self.library(path)?;

        let entry: Symbol<ModuleEntryFn> =
            unsafe { library.get(constants::ENTRY_SYMBOL) }.map_err(|e| AddonSystemError::module_load(path, e))?;
        let raw = panic::catch_unwind(AssertUnwindSafe(|| unsafe { entry() })).map_err(|_| {
            AddonSystemError::module_load(path, "Addon entry symbol panicked".to_string())
        })?;
        if raw.is_null() {
            return Err(AddonSystemError::module_load(
                path,
                "Addon entry symbol returned a null module".to_string(),
            ));
        }
        // The pointer comes from `Box::into_raw` in `declare_addon_module!`.
        let mut module = *unsafe { Box::from_raw(raw) };
        module.attach_library(Arc::clone(&library));
        Ok(module)
    }
}

/// Static table first, then JSON records, then dynamic libraries
#[derive(Debug, Default)]
pub struct DefaultModuleLoader {
    static_modules: StaticModuleLoader,
    json: JsonModuleLoader,
    dylib: DylibModuleLoader,
}

impl DefaultModuleLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_static_modules(static_modules: StaticModuleLoader) -> Self {
        Self {
            static_modules,
            ..Self::default()
        }
    }

    pub fn static_modules_mut(&mut self) -> &mut StaticModuleLoader {
        &mut self.static_modules
    }
}

impl ModuleLoader for DefaultModuleLoader {
    fn load(&self, path: &Path) -> Result<AddonModule> {
        if self.static_modules.contains(path) {
            self.static_modules.load(path)
        } else if has_extension(path, "json") {
            self.json.load(path)
        } else {
            self.dylib.load(path)
        }
    }
}
