//! # Addon Factory
//!
//! Turns a loaded [`AddonModule`] into an [`AddonType`]: the constructible type bound
//! to the addon's root and manifest, plus the metadata block recorded for diagnostics.
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use libloading::Library;

use crate::addon_system::base::DeclarativeAddon;
use crate::addon_system::descriptor::AddonDescriptor;
use crate::addon_system::discovery::AddonDiscovery;
use crate::addon_system::manifest::AddonManifest;
use crate::addon_system::module::{AddonConstructor, AddonDefinition, AddonModule, BoxError};
use crate::addon_system::traits::{Addon, AddonContext, AddonHost, ProjectHandle};

/// Raised in place of a constructor that panicked
#[derive(Debug, thiserror::Error)]
#[error("addon constructor panicked: {message}")]
pub struct ConstructorPanic {
    pub message: String,
}

/// Diagnostics attached to every constructible addon type
#[derive(Debug)]
pub struct AddonTypeMeta {
    module_path: PathBuf,
    lookup_duration: Duration,
    initialize_in: OnceLock<Duration>,
}

impl AddonTypeMeta {
    fn new(module_path: PathBuf) -> Self {
        Self {
            module_path,
            // TODO: measure entry point resolution once discovery reports it
            lookup_duration: Duration::ZERO,
            initialize_in: OnceLock::new(),
        }
    }

    /// Canonical path the module was loaded from
    pub fn module_path(&self) -> &Path {
        &self.module_path
    }

    pub fn lookup_duration(&self) -> Duration {
        self.lookup_duration
    }

    /// Time spent constructing the addon and its nested addons, once known
    pub fn initialize_in(&self) -> Option<Duration> {
        self.initialize_in.get().copied()
    }

    pub(crate) fn record_initialize_in(&self, elapsed: Duration) {
        if self.initialize_in.set(elapsed).is_err() {
            log::warn!(
                "Initialization time for {} recorded twice, keeping the first",
                self.module_path.display()
            );
        }
    }
}

enum Constructor {
    Callable(AddonConstructor),
    Declarative(AddonDefinition),
}

/// A constructible addon type
pub struct AddonType {
    descriptor: AddonDescriptor,
    root: PathBuf,
    manifest: Arc<AddonManifest>,
    constructor: Constructor,
    meta: AddonTypeMeta,
    // Declared last: dropped after the constructor whose code it holds.
    library: Option<Arc<Library>>,
}

/// Build the constructible type for `module`, loaded from `module_path` inside `main_dir`.
///
/// Root and manifest resolve once, here: whatever the module pinned wins, otherwise
/// `main_dir` and the descriptor manifest apply.
pub fn build(module: AddonModule, module_path: &Path, main_dir: &Path, descriptor: &AddonDescriptor) -> AddonType {
    let library = module.library().cloned();
    let (root, pkg, constructor) = match module {
        AddonModule::Callable(callable) => (callable.root, callable.pkg, Constructor::Callable(callable.constructor)),
        AddonModule::Declarative(mut definition) => {
            let root = definition.root.take();
            let pkg = definition.pkg.take();
            (root, pkg, Constructor::Declarative(definition))
        }
    };

    AddonType {
        descriptor: descriptor.clone(),
        root: root.unwrap_or_else(|| main_dir.to_path_buf()),
        manifest: pkg.map(Arc::new).unwrap_or_else(|| Arc::clone(&descriptor.manifest)),
        constructor,
        meta: AddonTypeMeta::new(module_path.to_path_buf()),
        library,
    }
}

impl AddonType {
    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    pub fn descriptor(&self) -> &AddonDescriptor {
        &self.descriptor
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn manifest(&self) -> &Arc<AddonManifest> {
        &self.manifest
    }

    pub fn meta(&self) -> &AddonTypeMeta {
        &self.meta
    }

    /// Whether the type's code lives in a dynamic library
    pub fn is_dynamic(&self) -> bool {
        self.library.is_some()
    }

    pub(crate) fn library(&self) -> Option<&Arc<Library>> {
        self.library.as_ref()
    }

    pub fn is_declarative(&self) -> bool {
        matches!(self.constructor, Constructor::Declarative(_))
    }

    /// The context handed to the constructor for the given parent and project
    pub fn context(
        &self,
        parent: Arc<dyn AddonHost>,
        project: Option<ProjectHandle>,
        discovery: Arc<dyn AddonDiscovery>,
    ) -> AddonContext {
        AddonContext::new(
            &self.descriptor,
            self.root.clone(),
            Arc::clone(&self.manifest),
            parent,
            project,
            discovery,
        )
    }

    /// Construct an instance. A panicking constructor is reported as an error.
    pub fn construct(&self, context: &AddonContext) -> Result<Box<dyn Addon>, BoxError> {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| match &self.constructor {
            Constructor::Callable(constructor) => constructor(context),
            Constructor::Declarative(definition) => {
                DeclarativeAddon::construct(definition, context).map(|addon| Box::new(addon) as Box<dyn Addon>)
            }
        }));
        outcome.unwrap_or_else(|payload| {
            let panic = ConstructorPanic {
                message: panic_message(payload.as_ref()),
            };
            Err(Box::new(panic) as BoxError)
        })
    }
}

impl std::fmt::Debug for AddonType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AddonType")
            .field("name", &self.descriptor.name)
            .field("root", &self.root)
            .field("declarative", &self.is_declarative())
            .field("dynamic", &self.is_dynamic())
            .field("meta", &self.meta)
            .finish()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "<non-string panic payload>".to_string()
    }
}
