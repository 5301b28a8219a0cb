use std::fmt;
use std::sync::{Arc, OnceLock, Weak};

use crate::addon_system::factory::{AddonType, AddonTypeMeta};
use crate::addon_system::traits::{Addon, AddonContext, AddonHost, ErrorSink, ProjectHandle};

/// A live addon together with its place in the addon tree.
///
/// The parent link is weak: parents own their children, never the other way round.
pub struct AddonInstance {
    name: String,
    parent: Weak<dyn AddonHost>,
    parent_name: String,
    project: Option<ProjectHandle>,
    addons: OnceLock<Vec<Arc<AddonInstance>>>,
    error_sink: Option<Arc<dyn ErrorSink>>,
    // Fields drop in declaration order: the addon goes before the type that may
    // hold the library its code lives in.
    addon: Box<dyn Addon>,
    addon_type: Arc<AddonType>,
}

impl AddonInstance {
    pub(crate) fn new(addon: Box<dyn Addon>, context: &AddonContext, addon_type: Arc<AddonType>) -> Self {
        let parent = context.parent();
        let name = match addon.name() {
            Some(declared) if declared != context.name() => {
                log::warn!(
                    "Addon '{}' declares the name '{}'; using the declared name",
                    context.name(),
                    declared
                );
                declared.to_string()
            }
            Some(declared) => declared.to_string(),
            None => context.name().to_string(),
        };

        Self {
            name,
            parent: Arc::downgrade(parent),
            parent_name: parent.name(),
            project: context.project().cloned(),
            addons: OnceLock::new(),
            error_sink: parent.error_sink(),
            addon,
            addon_type,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The owning component, while it is still alive
    pub fn parent(&self) -> Option<Arc<dyn AddonHost>> {
        self.parent.upgrade()
    }

    pub fn parent_name(&self) -> &str {
        &self.parent_name
    }

    pub fn project(&self) -> Option<&ProjectHandle> {
        self.project.as_ref()
    }

    /// Nested addons, in resolved order
    pub fn addons(&self) -> &[Arc<AddonInstance>] {
        self.addons.get().map(Vec::as_slice).unwrap_or_default()
    }

    pub fn addon_type(&self) -> &Arc<AddonType> {
        &self.addon_type
    }

    pub fn meta(&self) -> &AddonTypeMeta {
        self.addon_type.meta()
    }

    pub fn addon(&self) -> &dyn Addon {
        self.addon.as_ref()
    }

    pub fn downcast_ref<T: Addon>(&self) -> Option<&T> {
        self.addon.as_any().downcast_ref::<T>()
    }

    /// Depth-first search for a nested addon by name
    pub fn find_addon(&self, name: &str) -> Option<&Arc<AddonInstance>> {
        self.addons().iter().find_map(|child| {
            if child.name == name {
                Some(child)
            } else {
                child.find_addon(name)
            }
        })
    }

    pub(crate) fn set_addons(&self, addons: Vec<Arc<AddonInstance>>) {
        if self.addons.set(addons).is_err() {
            log::warn!("Nested addons of '{}' were already initialized", self.name);
        }
    }
}

impl AddonHost for AddonInstance {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn error_sink(&self) -> Option<Arc<dyn ErrorSink>> {
        self.error_sink.clone()
    }
}

impl fmt::Debug for AddonInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AddonInstance")
            .field("name", &self.name)
            .field("parent", &self.parent_name)
            .field("has_project", &self.project.is_some())
            .field("addons", &self.addons())
            .field("meta", self.meta())
            .finish()
    }
}
