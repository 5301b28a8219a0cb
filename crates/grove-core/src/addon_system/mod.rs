//! # Grove Core Addon System
//!
//! Orders and instantiates the addons attached to a parent component (the
//! application or another addon), recursing into each addon's own nested addons.
//!
//! ## Key Submodules and Responsibilities:
//!
//! - **[`ordering`]**: [`OrderingGraph`], the deterministic linearization of
//!   `before`/`after` constraints.
//! - **[`entry_point`]**: [`EntryPointResolver`], from manifest to canonical module path.
//! - **[`loader`]**: the [`ModuleLoader`] seam and its static, JSON and dynamic
//!   library implementations.
//! - **[`module`]**: [`AddonModule`], the callable/declarative split decided at load time.
//! - **[`factory`]**: builds the constructible [`AddonType`] and its diagnostics metadata.
//! - **[`base`]**: [`DeclarativeAddon`], the base type declarative records extend.
//! - **[`instantiator`]**: [`Instantiator`], the pipeline itself.
//! - **[`instance`]**: [`AddonInstance`], a live addon and its nested addons.
//! - **[`discovery`]**: finds addon packages on disk.
//! - **[`manifest`]** / **[`descriptor`]**: the package metadata the pipeline consumes.
//! - **[`traits`]**: [`Addon`], [`AddonHost`], [`ErrorSink`] and [`AddonContext`].
//! - **[`error`]**: [`AddonSystemError`].
pub mod base;
pub mod descriptor;
pub mod discovery;
pub mod entry_point;
pub mod error;
pub mod factory;
pub mod instance;
pub mod instantiator;
pub mod loader;
pub mod manifest;
pub mod module;
pub mod ordering;
pub mod traits;

pub use base::DeclarativeAddon;
pub use descriptor::AddonDescriptor;
pub use discovery::{AddonDiscovery, DirectoryDiscovery, NoDiscovery};
pub use entry_point::EntryPointResolver;
pub use error::AddonSystemError;
pub use factory::{AddonType, AddonTypeMeta};
pub use instance::AddonInstance;
pub use instantiator::{Instantiator, order_descriptors};
pub use loader::{DefaultModuleLoader, DylibModuleLoader, JsonModuleLoader, ModuleLoader, StaticModuleLoader};
pub use manifest::{AddonManifest, AddonSection, ManifestBuilder};
pub use module::{AddonDefinition, AddonModule, BoxError, CallableAddon};
pub use ordering::{OrderingError, OrderingGraph};
pub use traits::{Addon, AddonContext, AddonHost, ErrorSink, LogErrorSink, ProjectHandle};

// Test module declaration
#[cfg(test)]
mod tests;
