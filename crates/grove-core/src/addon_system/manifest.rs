use std::fs;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};

use crate::addon_system::error::{AddonSystemError, AddonSystemErrorSource, Result};

/// Package metadata describing an addon
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddonManifest {
    /// Package name, possibly scoped (`@scope/name`)
    #[serde(default)]
    pub name: String,

    /// Package version (informational only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Top-level entry point
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main: Option<String>,

    /// Tags for categorization
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,

    /// Addon-specific section
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub addon: Option<AddonSection>,
}

/// The `addon` section of a manifest: entry point override, ordering and extra paths
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddonSection {
    /// Entry point, takes precedence over the manifest's top-level `main`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main: Option<String>,

    /// Addons this one must be instantiated before
    #[serde(default, deserialize_with = "one_or_many", skip_serializing_if = "Vec::is_empty")]
    pub before: Vec<String>,

    /// Addons this one must be instantiated after
    #[serde(default, deserialize_with = "one_or_many", skip_serializing_if = "Vec::is_empty")]
    pub after: Vec<String>,

    /// Extra addon directories, relative to the addon's location
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub paths: Vec<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

/// Accept `"name"` as well as `["a", "b"]`
fn one_or_many<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(OneOrMany::One(name)) => vec![name],
        Some(OneOrMany::Many(names)) => names,
    })
}

impl AddonManifest {
    /// Create a manifest with only a name
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    /// Read a JSON manifest from disk
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| AddonSystemError::ManifestError {
            path: path.to_path_buf(),
            message: "Failed to read manifest".to_string(),
            source: Some(Box::new(AddonSystemErrorSource::Io(e))),
        })?;
        Self::from_json(&content).map_err(|e| AddonSystemError::ManifestError {
            path: path.to_path_buf(),
            message: format!("Failed to parse manifest JSON: {}", e),
            source: Some(Box::new(AddonSystemErrorSource::Json(e))),
        })
    }

    pub fn from_json(content: &str) -> serde_json::Result<Self> {
        serde_json::from_str(content)
    }

    /// The entry point declared by the manifest; the addon section wins over `main`
    pub fn entry_main(&self) -> Option<&str> {
        self.addon
            .as_ref()
            .and_then(|section| section.main.as_deref())
            .or(self.main.as_deref())
    }

    pub fn before(&self) -> &[String] {
        self.addon.as_ref().map(|section| section.before.as_slice()).unwrap_or_default()
    }

    pub fn after(&self) -> &[String] {
        self.addon.as_ref().map(|section| section.after.as_slice()).unwrap_or_default()
    }

    pub fn paths(&self) -> &[String] {
        self.addon.as_ref().map(|section| section.paths.as_slice()).unwrap_or_default()
    }

    fn section_mut(&mut self) -> &mut AddonSection {
        self.addon.get_or_insert_with(AddonSection::default)
    }
}

/// Builder for creating an addon manifest
pub struct ManifestBuilder {
    manifest: AddonManifest,
}

impl ManifestBuilder {
    /// Create a new manifest builder
    pub fn new(name: &str) -> Self {
        Self {
            manifest: AddonManifest::new(name),
        }
    }

    pub fn version(mut self, version: &str) -> Self {
        self.manifest.version = Some(version.to_string());
        self
    }

    /// Set the top-level entry point
    pub fn main(mut self, main: &str) -> Self {
        self.manifest.main = Some(main.to_string());
        self
    }

    /// Set the addon-section entry point
    pub fn addon_main(mut self, main: &str) -> Self {
        self.manifest.section_mut().main = Some(main.to_string());
        self
    }

    pub fn before(mut self, name: &str) -> Self {
        self.manifest.section_mut().before.push(name.to_string());
        self
    }

    pub fn after(mut self, name: &str) -> Self {
        self.manifest.section_mut().after.push(name.to_string());
        self
    }

    pub fn path(mut self, path: &str) -> Self {
        self.manifest.section_mut().paths.push(path.to_string());
        self
    }

    pub fn keyword(mut self, keyword: &str) -> Self {
        self.manifest.keywords.push(keyword.to_string());
        self
    }

    /// Build the manifest
    pub fn build(self) -> AddonManifest {
        self.manifest
    }
}
