pub mod addon_system;
pub mod config;
pub mod kernel;
pub mod utils;

// Re-export key public types/traits for easier use by the binary and addon crates
pub use kernel::Application;
pub use kernel::error::{Error as KernelError, Result as KernelResult};
pub use addon_system::{
    Addon, AddonContext, AddonDescriptor, AddonHost, AddonInstance, AddonManifest, AddonModule,
    Instantiator, ModuleLoader,
};
pub use config::HostConfig;
