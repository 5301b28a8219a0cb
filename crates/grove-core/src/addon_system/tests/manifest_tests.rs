#![cfg(test)]

use std::fs;

use tempfile::tempdir;

use crate::addon_system::{AddonDescriptor, AddonManifest, AddonSystemError, ManifestBuilder};

#[test]
fn test_manifest_builder() {
    let manifest = ManifestBuilder::new("@acme/router")
        .version("1.2.0")
        .main("lib/router")
        .after("@acme/logger")
        .before("@acme/metrics")
        .path("extras/router-admin")
        .keyword("http")
        .build();

    assert_eq!(manifest.name, "@acme/router");
    assert_eq!(manifest.version.as_deref(), Some("1.2.0"));
    assert_eq!(manifest.entry_main(), Some("lib/router"));
    assert_eq!(manifest.after(), ["@acme/logger".to_string()]);
    assert_eq!(manifest.before(), ["@acme/metrics".to_string()]);
    assert_eq!(manifest.paths(), ["extras/router-admin".to_string()]);
    assert_eq!(manifest.keywords, vec!["http".to_string()]);
}

#[test]
fn test_addon_main_takes_precedence() {
    let manifest = ManifestBuilder::new("dual").main("top").addon_main("nested").build();
    assert_eq!(manifest.entry_main(), Some("nested"));

    let only_top = ManifestBuilder::new("top-only").main("top").build();
    assert_eq!(only_top.entry_main(), Some("top"));

    assert_eq!(AddonManifest::new("none").entry_main(), None);
}

#[test]
fn test_constraints_accept_string_or_array() {
    let json = r#"{
        "name": "x",
        "addon": { "before": "single", "after": ["one", "two"] }
    }"#;
    let manifest = AddonManifest::from_json(json).unwrap();
    assert_eq!(manifest.before(), ["single".to_string()]);
    assert_eq!(manifest.after(), ["one".to_string(), "two".to_string()]);

    let null_json = r#"{ "name": "y", "addon": { "before": null } }"#;
    let manifest = AddonManifest::from_json(null_json).unwrap();
    assert!(manifest.before().is_empty());
}

#[test]
fn test_missing_sections_default_to_empty() {
    let manifest = AddonManifest::from_json(r#"{ "name": "bare", "dependencies": {} }"#).unwrap();
    assert!(manifest.addon.is_none());
    assert!(manifest.before().is_empty());
    assert!(manifest.after().is_empty());
    assert!(manifest.paths().is_empty());
}

#[test]
fn test_manifest_load_from_disk() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("addon.json");

    let manifest = ManifestBuilder::new("disk").addon_main("./").build();
    fs::write(&path, serde_json::to_string(&manifest).unwrap()).unwrap();
    assert_eq!(AddonManifest::load(&path).unwrap(), manifest);

    // Missing file
    let err = AddonManifest::load(dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, AddonSystemError::ManifestError { source: Some(_), .. }));

    // Malformed file
    fs::write(&path, "{ not json").unwrap();
    let err = AddonManifest::load(&path).unwrap_err();
    match err {
        AddonSystemError::ManifestError { path: err_path, message, .. } => {
            assert_eq!(err_path, path);
            assert!(message.contains("parse"), "unexpected message: {}", message);
        }
        other => panic!("Expected ManifestError, got {:?}", other),
    }
}

#[test]
fn test_descriptor_exposes_manifest_constraints() {
    let manifest = ManifestBuilder::new("d").after("a").before("b").build();
    let descriptor = AddonDescriptor::from_manifest("/addons/d", manifest);

    assert_eq!(descriptor.name, "d");
    assert_eq!(descriptor.location(), std::path::Path::new("/addons/d"));
    assert_eq!(descriptor.after(), ["a".to_string()]);
    assert_eq!(descriptor.before(), ["b".to_string()]);
}
