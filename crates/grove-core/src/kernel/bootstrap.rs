use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::addon_system::{
    AddonDescriptor, AddonDiscovery, AddonHost, AddonInstance, AddonManifest, DefaultModuleLoader,
    DirectoryDiscovery, ErrorSink, Instantiator, LogErrorSink, ModuleLoader, ProjectHandle, order_descriptors,
};
use crate::config::HostConfig;
use crate::kernel::constants;
use crate::kernel::error::{Error, Result};

/// Project handle handed to every addon loaded by [`Application::load_addons`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectInfo {
    pub name: String,
    pub root: PathBuf,
}

/// Top-level parent of a project's addons
pub struct AppHost {
    name: String,
    error_sink: Arc<dyn ErrorSink>,
}

impl AppHost {
    pub fn new(name: impl Into<String>, error_sink: Arc<dyn ErrorSink>) -> Self {
        Self {
            name: name.into(),
            error_sink,
        }
    }
}

impl AddonHost for AppHost {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn error_sink(&self) -> Option<Arc<dyn ErrorSink>> {
        Some(Arc::clone(&self.error_sink))
    }
}

/// Main application struct: configuration, the instantiation pipeline and the
/// host every top-level addon hangs off.
pub struct Application {
    config: HostConfig,
    discovery: DirectoryDiscovery,
    instantiator: Instantiator,
    host: Arc<dyn AddonHost>,
}

impl Application {
    /// Creates an application loading modules through `loader`
    pub fn new(config: HostConfig, loader: Arc<dyn ModuleLoader>) -> Self {
        log::info!("Initializing {} v{}", constants::APP_NAME, constants::APP_VERSION);
        let host: Arc<dyn AddonHost> = Arc::new(AppHost::new(constants::APP_NAME, Arc::new(LogErrorSink)));
        Self {
            discovery: DirectoryDiscovery::from_config(&config),
            instantiator: Instantiator::from_config(&config, loader),
            host,
            config,
        }
    }

    /// Application using the [`DefaultModuleLoader`]
    pub fn with_default_loader(config: HostConfig) -> Self {
        Self::new(config, Arc::new(DefaultModuleLoader::new()))
    }

    /// Replace the top-level host, e.g. to route constructor errors elsewhere
    pub fn with_host(mut self, host: Arc<dyn AddonHost>) -> Self {
        self.host = host;
        self
    }

    pub fn config(&self) -> &HostConfig {
        &self.config
    }

    pub fn instantiator(&self) -> &Instantiator {
        &self.instantiator
    }

    pub fn host(&self) -> &Arc<dyn AddonHost> {
        &self.host
    }

    /// The project's own manifest, or a bare one named after the directory
    pub fn project_manifest(&self, root: &Path) -> Result<AddonManifest> {
        let path = root.join(self.discovery.manifest_file());
        if path.is_file() {
            return Ok(AddonManifest::load(&path)?);
        }
        let name = root
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| constants::APP_NAME.to_string());
        Ok(AddonManifest::new(&name))
    }

    /// Descriptors of the top-level addons of the project at `root`
    pub fn discover(&self, root: &Path) -> Result<Vec<AddonDescriptor>> {
        if !root.is_dir() {
            return Err(Error::io(
                std::io::Error::new(std::io::ErrorKind::NotFound, "not a directory"),
                "discover addons",
                root.to_path_buf(),
            ));
        }
        let manifest = self.project_manifest(root)?;
        let descriptors = self.discovery.discover(root, &manifest)?;
        log::info!("Discovered {} top-level addon(s) in {}", descriptors.len(), root.display());
        Ok(descriptors)
    }

    /// Names of the top-level addons in the order they would be instantiated
    pub fn resolve_order(&self, root: &Path) -> Result<Vec<String>> {
        let descriptors = self.discover(root)?;
        let ordered = order_descriptors(&descriptors)?;
        Ok(ordered.into_iter().map(|descriptor| descriptor.name.clone()).collect())
    }

    /// Discover and instantiate the addons of the project at `root`
    pub fn load_addons(&self, root: &Path) -> Result<Vec<Arc<AddonInstance>>> {
        let descriptors = self.discover(root)?;
        let manifest = self.project_manifest(root)?;
        let project: ProjectHandle = Arc::new(ProjectInfo {
            name: manifest.name,
            root: root.to_path_buf(),
        });
        let instances = self.instantiator.instantiate(&self.host, Some(&project), &descriptors)?;
        log::info!("Loaded {} top-level addon(s)", instances.len());
        Ok(instances)
    }
}

impl std::fmt::Debug for Application {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Application")
            .field("config", &self.config)
            .field("host", &self.host.name())
            .field("instantiator", &self.instantiator)
            .finish()
    }
}
