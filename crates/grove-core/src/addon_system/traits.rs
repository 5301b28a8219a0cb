use std::any::Any;
use std::error::Error as StdError;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::addon_system::descriptor::AddonDescriptor;
use crate::addon_system::discovery::AddonDiscovery;
use crate::addon_system::manifest::AddonManifest;
use crate::addon_system::module::BoxError;

/// Opaque project handle, passed through to addons unexamined
pub type ProjectHandle = Arc<dyn Any + Send + Sync>;

/// Receives errors raised by addon constructors before they are wrapped
pub trait ErrorSink: Send + Sync {
    fn write_error(&self, error: &(dyn StdError + 'static));
}

/// Error sink forwarding to the `log` facade
#[derive(Debug, Default, Clone, Copy)]
pub struct LogErrorSink;

impl ErrorSink for LogErrorSink {
    fn write_error(&self, error: &(dyn StdError + 'static)) {
        log::error!("{}", error);
        let mut source = error.source();
        while let Some(cause) = source {
            log::error!("  caused by: {}", cause);
            source = cause.source();
        }
    }
}

/// Anything addons can be attached to: the application or another addon
pub trait AddonHost: Send + Sync {
    /// Display name used in diagnostics
    fn name(&self) -> String;

    /// Where constructor errors are reported, if anywhere
    fn error_sink(&self) -> Option<Arc<dyn ErrorSink>> {
        None
    }
}

/// Core trait implemented by every addon object
pub trait Addon: Send + Sync + 'static {
    /// Name the addon declares for itself. The descriptor name is used when `None`.
    fn name(&self) -> Option<&str> {
        None
    }

    /// Nested-initialization hook.
    ///
    /// `None` means the addon owns no nested addons. `Some` carries the descriptors of
    /// the addons to instantiate with this addon as their parent.
    fn initialize_addons(&self, _context: &AddonContext) -> Option<Result<Vec<AddonDescriptor>, BoxError>> {
        None
    }

    fn as_any(&self) -> &dyn Any;
}

/// Everything an addon constructor gets to see, computed once before construction
#[derive(Clone)]
pub struct AddonContext {
    name: String,
    location: PathBuf,
    root: PathBuf,
    manifest: Arc<AddonManifest>,
    parent: Arc<dyn AddonHost>,
    project: Option<ProjectHandle>,
    discovery: Arc<dyn AddonDiscovery>,
}

impl AddonContext {
    pub fn new(
        descriptor: &AddonDescriptor,
        root: PathBuf,
        manifest: Arc<AddonManifest>,
        parent: Arc<dyn AddonHost>,
        project: Option<ProjectHandle>,
        discovery: Arc<dyn AddonDiscovery>,
    ) -> Self {
        Self {
            name: descriptor.name.clone(),
            location: descriptor.location.clone(),
            root,
            manifest,
            parent,
            project,
            discovery,
        }
    }

    /// Descriptor name of the addon being built
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Package directory of the addon
    pub fn location(&self) -> &Path {
        &self.location
    }

    /// Effective root: pinned by the module, or the entry point's directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Effective manifest: pinned by the module, or the descriptor's
    pub fn manifest(&self) -> &Arc<AddonManifest> {
        &self.manifest
    }

    pub fn parent(&self) -> &Arc<dyn AddonHost> {
        &self.parent
    }

    pub fn project(&self) -> Option<&ProjectHandle> {
        self.project.as_ref()
    }

    pub fn discovery(&self) -> &Arc<dyn AddonDiscovery> {
        &self.discovery
    }
}
