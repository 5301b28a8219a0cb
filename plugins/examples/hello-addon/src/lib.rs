//! Example addon shipped as a dynamic library.
//!
//! Build it with `cargo build -p hello-addon`, then point an addon manifest's `main`
//! at the produced library (or name it `index.<ext>` inside the package directory).
//!
//! A dynamically loaded library carries its own copy of the `log` facade with no
//! logger installed, so this addon reports through its state rather than logging.
use std::any::Any;
use std::path::PathBuf;

use grove_core::addon_system::{AddonDescriptor, BoxError};
use grove_core::{Addon, AddonContext, AddonModule};

/// Greets with the name of the package it was loaded from
#[derive(Debug)]
pub struct HelloAddon {
    greeting: String,
    root: PathBuf,
}

impl HelloAddon {
    pub fn new(context: &AddonContext) -> Self {
        Self {
            greeting: format!("Hello from {}", context.manifest().name),
            root: context.root().to_path_buf(),
        }
    }

    pub fn greeting(&self) -> &str {
        &self.greeting
    }

    pub fn root(&self) -> &std::path::Path {
        &self.root
    }
}

impl Addon for HelloAddon {
    fn name(&self) -> Option<&str> {
        Some("hello-addon")
    }

    fn initialize_addons(&self, context: &AddonContext) -> Option<Result<Vec<AddonDescriptor>, BoxError>> {
        Some(
            context
                .discovery()
                .discover(context.location(), context.manifest())
                .map_err(BoxError::from),
        )
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// The module this library exports
pub fn hello_module() -> AddonModule {
    AddonModule::callable(|context| Ok(Box::new(HelloAddon::new(context))))
}

grove_core::declare_addon_module!(hello_module());
