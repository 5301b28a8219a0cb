//! # Grove Core Kernel
//!
//! The `kernel` module holds what the rest of `grove-core` hangs off:
//!
//! - **Application Bootstrapping**: [`Application`](bootstrap::Application) owns the
//!   configuration and the [`Instantiator`](crate::addon_system::Instantiator), and acts
//!   as the top-level parent of a project's addons.
//! - **Core Constants**: defaults shared by the resolver, discovery and loaders live in
//!   the `constants` submodule.
//! - **Error Handling**: the umbrella [`Error`](error::Error) wrapping every subsystem
//!   error, plus the `Result` alias.
pub mod bootstrap;
pub mod constants;
pub mod error;

pub use bootstrap::{AppHost, Application, ProjectInfo};
pub use error::{Error, Result};

#[cfg(test)]
mod tests;
