//! # Addon Modules
//!
//! What a [`ModuleLoader`](crate::addon_system::loader::ModuleLoader) hands back for an
//! entry point. The shape is decided once, at load time:
//!
//! - [`AddonModule::Callable`]: a constructor function producing the addon object.
//! - [`AddonModule::Declarative`]: a plain record of declared fields that extends the
//!   [`DeclarativeAddon`](crate::addon_system::base::DeclarativeAddon) base type.
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use libloading::Library;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::addon_system::manifest::AddonManifest;
use crate::addon_system::traits::{Addon, AddonContext};

/// Error type returned by user-supplied addon code
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Constructor of a callable addon module
pub type AddonConstructor = Arc<dyn Fn(&AddonContext) -> Result<Box<dyn Addon>, BoxError> + Send + Sync>;

/// Hook run when a declarative addon is constructed
pub type InitHook = Arc<dyn Fn(&AddonContext) -> Result<(), BoxError> + Send + Sync>;

/// Signature of the symbol exported by dynamic addon libraries
pub type ModuleEntryFn = unsafe extern "C-unwind" fn() -> *mut AddonModule;

/// A loaded addon module
#[derive(Clone)]
pub enum AddonModule {
    Callable(CallableAddon),
    Declarative(AddonDefinition),
}

impl AddonModule {
    /// Shorthand for a callable module without declared defaults
    pub fn callable<F>(constructor: F) -> Self
    where
        F: Fn(&AddonContext) -> Result<Box<dyn Addon>, BoxError> + Send + Sync + 'static,
    {
        AddonModule::Callable(CallableAddon::new(constructor))
    }

    pub fn declarative(definition: AddonDefinition) -> Self {
        AddonModule::Declarative(definition)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            AddonModule::Callable(_) => "callable",
            AddonModule::Declarative(_) => "declarative",
        }
    }

    /// The dynamic library the module's code lives in, if any
    pub fn library(&self) -> Option<&Arc<Library>> {
        match self {
            AddonModule::Callable(callable) => callable.library.as_ref(),
            AddonModule::Declarative(definition) => definition.library.as_ref(),
        }
    }

    /// Keep `library` loaded for as long as the module and anything built from it
    pub(crate) fn attach_library(&mut self, library: Arc<Library>) {
        match self {
            AddonModule::Callable(callable) => callable.library = Some(library),
            AddonModule::Declarative(definition) => definition.library = Some(library),
        }
    }
}

impl fmt::Debug for AddonModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddonModule::Callable(callable) => f.debug_tuple("Callable").field(callable).finish(),
            AddonModule::Declarative(definition) => f.debug_tuple("Declarative").field(definition).finish(),
        }
    }
}

impl From<CallableAddon> for AddonModule {
    fn from(callable: CallableAddon) -> Self {
        AddonModule::Callable(callable)
    }
}

impl From<AddonDefinition> for AddonModule {
    fn from(definition: AddonDefinition) -> Self {
        AddonModule::Declarative(definition)
    }
}

/// A constructor plus the `root`/`pkg` values its author pinned, if any.
///
/// Pinned values always win over the defaults the factory derives from the entry
/// point and the descriptor.
#[derive(Clone)]
pub struct CallableAddon {
    pub(crate) constructor: AddonConstructor,
    pub(crate) root: Option<PathBuf>,
    pub(crate) pkg: Option<AddonManifest>,
    pub(crate) library: Option<Arc<Library>>,
}

impl CallableAddon {
    pub fn new<F>(constructor: F) -> Self
    where
        F: Fn(&AddonContext) -> Result<Box<dyn Addon>, BoxError> + Send + Sync + 'static,
    {
        Self {
            constructor: Arc::new(constructor),
            root: None,
            pkg: None,
            library: None,
        }
    }

    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    pub fn with_pkg(mut self, pkg: AddonManifest) -> Self {
        self.pkg = Some(pkg);
        self
    }
}

impl fmt::Debug for CallableAddon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallableAddon")
            .field("root", &self.root)
            .field("pkg", &self.pkg.as_ref().map(|pkg| &pkg.name))
            .field("library", &self.library.is_some())
            .finish_non_exhaustive()
    }
}

/// A declarative addon record.
///
/// `root` and `pkg` act as overrides; when absent the factory fills them from the
/// entry point directory and the descriptor manifest. Any other key lands in `fields`.
#[derive(Clone, Default, Deserialize)]
pub struct AddonDefinition {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub root: Option<PathBuf>,
    #[serde(default)]
    pub pkg: Option<AddonManifest>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
    #[serde(skip)]
    pub init: Option<InitHook>,
    #[serde(skip)]
    pub(crate) library: Option<Arc<Library>>,
}

impl AddonDefinition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn named(name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            ..Self::default()
        }
    }

    pub fn with_field(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(key.to_string(), value.into());
        self
    }

    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    pub fn with_pkg(mut self, pkg: AddonManifest) -> Self {
        self.pkg = Some(pkg);
        self
    }

    /// Run `hook` when an instance is constructed; an error aborts construction
    pub fn with_init<F>(mut self, hook: F) -> Self
    where
        F: Fn(&AddonContext) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.init = Some(Arc::new(hook));
        self
    }
}

impl fmt::Debug for AddonDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AddonDefinition")
            .field("name", &self.name)
            .field("root", &self.root)
            .field("pkg", &self.pkg.as_ref().map(|pkg| &pkg.name))
            .field("fields", &self.fields)
            .field("init", &self.init.is_some())
            .field("library", &self.library.is_some())
            .finish()
    }
}

/// Export an [`AddonModule`] from a dynamic library.
///
/// The library must be built with the same toolchain and `grove-core` version as the
/// host, since the module crosses the boundary as a Rust value. The symbol uses the
/// `C-unwind` ABI, so a panic while building the module unwinds into the loader
/// instead of aborting the host.
///
/// ```ignore
/// grove_core::declare_addon_module!(AddonModule::callable(|ctx| {
///     Ok(Box::new(MyAddon::new(ctx)))
/// }));
/// ```
#[macro_export]
macro_rules! declare_addon_module {
    ($module:expr) => {
        #[unsafe(no_mangle)]
        #[allow(improper_ctypes_definitions)]
        pub extern "C-unwind" fn grove_addon_module() -> *mut $crate::addon_system::module::AddonModule {
            let module: $crate::addon_system::module::AddonModule = $module;
            ::std::boxed::Box::into_raw(::std::boxed::Box::new(module))
        }
    };
}
