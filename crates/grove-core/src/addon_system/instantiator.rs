//! # Addon Instantiation
//!
//! [`Instantiator`] drives the pipeline for one parent:
//!
//! 1. Order the descriptors with an [`OrderingGraph`].
//! 2. For each addon, in order: resolve its entry point, load the module, build the
//!    [`AddonType`](crate::addon_system::factory::AddonType), construct the addon and
//!    recurse into its nested addons.
//! 3. Record how long each addon took, nested addons included.
//!
//! The call is all-or-nothing. A cycle, a missing entry point, a loader failure or a
//! failing constructor aborts it and no instance is returned.
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use crate::addon_system::descriptor::AddonDescriptor;
use crate::addon_system::discovery::{AddonDiscovery, DirectoryDiscovery, NoDiscovery};
use crate::addon_system::entry_point::EntryPointResolver;
use crate::addon_system::error::{AddonSystemError, Result};
use crate::addon_system::factory;
use crate::addon_system::instance::AddonInstance;
use crate::addon_system::loader::ModuleLoader;
use crate::addon_system::ordering::OrderingGraph;
use crate::addon_system::traits::{AddonHost, ProjectHandle};
use crate::config::HostConfig;

/// Order `descriptors` by their `before`/`after` constraints.
///
/// Names only referenced by constraints are dropped from the result.
pub fn order_descriptors(descriptors: &[AddonDescriptor]) -> Result<Vec<&AddonDescriptor>> {
    let mut graph = OrderingGraph::new();
    for descriptor in descriptors {
        graph.add(&descriptor.name, descriptor, descriptor.before(), descriptor.after())?;
    }
    Ok(graph
        .resolve()?
        .into_iter()
        .filter_map(|(_, descriptor)| descriptor)
        .collect())
}

/// Orders, loads and constructs addons
pub struct Instantiator {
    loader: Arc<dyn ModuleLoader>,
    discovery: Arc<dyn AddonDiscovery>,
    resolver: EntryPointResolver,
}

impl Instantiator {
    /// Instantiator with the platform module extension and no nested discovery
    pub fn new(loader: Arc<dyn ModuleLoader>) -> Self {
        Self {
            loader,
            discovery: Arc::new(NoDiscovery),
            resolver: EntryPointResolver::default(),
        }
    }

    /// Instantiator set up from host configuration, discovering nested addons on disk
    pub fn from_config(config: &HostConfig, loader: Arc<dyn ModuleLoader>) -> Self {
        Self {
            loader,
            discovery: Arc::new(DirectoryDiscovery::from_config(config)),
            resolver: EntryPointResolver::new(config.module_extension.clone()),
        }
    }

    pub fn with_discovery(mut self, discovery: Arc<dyn AddonDiscovery>) -> Self {
        self.discovery = discovery;
        self
    }

    pub fn with_resolver(mut self, resolver: EntryPointResolver) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn resolver(&self) -> &EntryPointResolver {
        &self.resolver
    }

    pub fn discovery(&self) -> &Arc<dyn AddonDiscovery> {
        &self.discovery
    }

    /// Instantiate `descriptors` as the addons of `parent`, in constraint order
    pub fn instantiate(
        &self,
        parent: &Arc<dyn AddonHost>,
        project: Option<&ProjectHandle>,
        descriptors: &[AddonDescriptor],
    ) -> Result<Vec<Arc<AddonInstance>>> {
        let parent_name = parent.name();
        if descriptors.is_empty() {
            log::trace!("{}: no addons to instantiate", parent_name);
            return Ok(Vec::new());
        }

        let ordered = order_descriptors(descriptors)?;
        log::debug!(
            "{}: addon order [{}]",
            parent_name,
            ordered.iter().map(|d| d.name.as_str()).collect::<Vec<_>>().join(", ")
        );

        let mut instances = Vec::with_capacity(ordered.len());
        for descriptor in ordered {
            instances.push(self.instantiate_one(parent, &parent_name, project, descriptor)?);
        }
        Ok(instances)
    }

    fn instantiate_one(
        &self,
        parent: &Arc<dyn AddonHost>,
        parent_name: &str,
        project: Option<&ProjectHandle>,
        descriptor: &AddonDescriptor,
    ) -> Result<Arc<AddonInstance>> {
        let start = Instant::now();

        let module_path = self.resolver.resolve(descriptor)?;
        let module = self.loader.load(&module_path)?;
        let main_dir = module_path.parent().unwrap_or_else(|| Path::new("/")).to_path_buf();
        log::trace!("{}: loaded {} module for '{}'", parent_name, module.kind(), descriptor.name);

        let addon_type = Arc::new(factory::build(module, &module_path, &main_dir, descriptor));
        let context = addon_type.context(Arc::clone(parent), project.cloned(), Arc::clone(&self.discovery));

        let addon = match addon_type.construct(&context) {
            Ok(addon) => addon,
            Err(source) => {
                if let Some(sink) = parent.error_sink() {
                    sink.write_error(&*source);
                }
                return Err(AddonSystemError::Construction {
                    addon: descriptor.name.clone(),
                    location: descriptor.location.clone(),
                    source,
                    library: addon_type.library().cloned(),
                });
            }
        };

        let instance = Arc::new(AddonInstance::new(addon, &context, Arc::clone(&addon_type)));
        let nested = match instance.addon().initialize_addons(&context) {
            None => Vec::new(),
            Some(Ok(nested_descriptors)) => {
                let host: Arc<dyn AddonHost> = instance.clone();
                self.instantiate(&host, project, &nested_descriptors)?
            }
            Some(Err(source)) => {
                return Err(AddonSystemError::NestedInitialization {
                    addon: descriptor.name.clone(),
                    source,
                    library: addon_type.library().cloned(),
                });
            }
        };
        instance.set_addons(nested);

        let elapsed = start.elapsed();
        addon_type.meta().record_initialize_in(elapsed);
        log::debug!("{}: addon '{}' initialized in {:?}", parent_name, instance.name(), elapsed);

        Ok(instance)
    }
}

impl std::fmt::Debug for Instantiator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Instantiator")
            .field("resolver", &self.resolver)
            .finish_non_exhaustive()
    }
}
