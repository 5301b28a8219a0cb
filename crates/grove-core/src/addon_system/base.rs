use std::any::Any;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::addon_system::descriptor::AddonDescriptor;
use crate::addon_system::manifest::AddonManifest;
use crate::addon_system::module::{AddonDefinition, BoxError};
use crate::addon_system::traits::{Addon, AddonContext};

/// Base type extended by declarative addon records.
///
/// An instance carries the record's declared fields next to the effective root and
/// manifest. Its nested initialization asks discovery for the addons under its
/// package location.
#[derive(Debug, Clone)]
pub struct DeclarativeAddon {
    name: String,
    location: PathBuf,
    root: PathBuf,
    manifest: Arc<AddonManifest>,
    fields: Map<String, Value>,
}

impl DeclarativeAddon {
    pub(crate) fn construct(definition: &AddonDefinition, context: &AddonContext) -> Result<Self, BoxError> {
        if let Some(init) = &definition.init {
            init(context)?;
        }
        Ok(Self {
            name: definition.name.clone().unwrap_or_else(|| context.name().to_string()),
            location: context.location().to_path_buf(),
            root: context.root().to_path_buf(),
            manifest: Arc::clone(context.manifest()),
            fields: definition.fields.clone(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn manifest(&self) -> &AddonManifest {
        &self.manifest
    }

    /// A field declared by the record
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }
}

impl Addon for DeclarativeAddon {
    fn name(&self) -> Option<&str> {
        Some(&self.name)
    }

    fn initialize_addons(&self, context: &AddonContext) -> Option<Result<Vec<AddonDescriptor>, BoxError>> {
        Some(
            context
                .discovery()
                .discover(&self.location, &self.manifest)
                .map_err(BoxError::from),
        )
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
