#![cfg(test)]

use std::fs;
use std::sync::Arc;

use tempfile::tempdir;

use crate::addon_system::{AddonHost, AddonSystemError, JsonModuleLoader, ManifestBuilder};
use crate::config::HostConfig;
use crate::kernel::bootstrap::{Application, ProjectInfo};
use crate::kernel::constants;
use crate::kernel::error::Error;

fn json_config() -> HostConfig {
    HostConfig {
        module_extension: "json".to_string(),
        ..HostConfig::default()
    }
}

fn write_addon(root: &std::path::Path, dir: &str, manifest: &crate::addon_system::AddonManifest) {
    let location = root.join(constants::DEFAULT_NESTED_DIR).join(dir);
    fs::create_dir_all(&location).unwrap();
    fs::write(location.join("addon.json"), serde_json::to_string(manifest).unwrap()).unwrap();
    fs::write(location.join("index.json"), "{}").unwrap();
}

#[test]
fn test_application_host_defaults() {
    let app = Application::new(HostConfig::default(), Arc::new(JsonModuleLoader));
    assert_eq!(app.host().name(), constants::APP_NAME);
    assert!(app.host().error_sink().is_some());
    assert_eq!(app.instantiator().resolver().module_extension(), constants::MODULE_EXTENSION);
}

#[test]
fn test_resolve_order_of_project() {
    let dir = tempdir().unwrap();
    write_addon(dir.path(), "web", &ManifestBuilder::new("web").after("db").build());
    write_addon(dir.path(), "db", &ManifestBuilder::new("db").build());

    let app = Application::new(json_config(), Arc::new(JsonModuleLoader));
    assert_eq!(app.resolve_order(dir.path()).unwrap(), vec!["db", "web"]);
}

#[test]
fn test_load_addons_passes_project_info() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("addon.json"),
        serde_json::to_string(&ManifestBuilder::new("my-project").build()).unwrap(),
    )
    .unwrap();
    write_addon(dir.path(), "only", &ManifestBuilder::new("only").build());

    let app = Application::new(json_config(), Arc::new(JsonModuleLoader));
    let instances = app.load_addons(dir.path()).unwrap();

    assert_eq!(instances.len(), 1);
    let project = instances[0].project().unwrap();
    let info = project.downcast_ref::<ProjectInfo>().unwrap();
    assert_eq!(info.name, "my-project");
    assert_eq!(info.root, dir.path());
    assert_eq!(instances[0].parent_name(), constants::APP_NAME);
}

#[test]
fn test_project_without_manifest_named_after_directory() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("bare-project");
    fs::create_dir_all(&root).unwrap();

    let app = Application::with_default_loader(HostConfig::default());
    assert_eq!(app.project_manifest(&root).unwrap().name, "bare-project");
    assert!(app.load_addons(&root).unwrap().is_empty());
}

#[test]
fn test_discover_rejects_missing_directory() {
    let dir = tempdir().unwrap();
    let app = Application::with_default_loader(HostConfig::default());

    let err = app.discover(&dir.path().join("missing")).unwrap_err();
    assert!(matches!(err, Error::Io { .. }));
}

#[test]
fn test_cycle_surfaces_as_kernel_error() {
    let dir = tempdir().unwrap();
    write_addon(dir.path(), "a", &ManifestBuilder::new("a").after("b").build());
    write_addon(dir.path(), "b", &ManifestBuilder::new("b").after("a").build());

    let app = Application::new(json_config(), Arc::new(JsonModuleLoader));
    let err = app.load_addons(dir.path()).unwrap_err();
    assert!(matches!(err, Error::AddonSystem(AddonSystemError::Ordering(_))));
    assert!(err.to_string().contains("Cycle detected"));
}
