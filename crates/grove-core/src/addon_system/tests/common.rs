// crates/grove-core/src/addon_system/tests/common.rs
#![cfg(test)]

use std::any::Any;
use std::error::Error as StdError;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tempfile::TempDir;

use crate::addon_system::error::Result;
use crate::addon_system::{
    Addon, AddonContext, AddonDescriptor, AddonHost, AddonManifest, AddonModule, ErrorSink, ModuleLoader,
};

/// Extension used by test fixtures for callable modules
pub const TEST_EXT: &str = "mod";

/// Error sink remembering every message it receives
#[derive(Default)]
pub struct RecordingSink {
    errors: Mutex<Vec<String>>,
}

impl RecordingSink {
    pub fn messages(&self) -> Vec<String> {
        self.errors.lock().unwrap().clone()
    }
}

impl ErrorSink for RecordingSink {
    fn write_error(&self, error: &(dyn StdError + 'static)) {
        self.errors.lock().unwrap().push(error.to_string());
    }
}

/// Stand-in for the application
pub struct TestHost {
    name: String,
    sink: Option<Arc<RecordingSink>>,
}

impl TestHost {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            sink: None,
        }
    }

    pub fn with_sink(name: &str, sink: Arc<RecordingSink>) -> Self {
        Self {
            name: name.to_string(),
            sink: Some(sink),
        }
    }

    pub fn shared(self) -> Arc<dyn AddonHost> {
        Arc::new(self)
    }
}

impl AddonHost for TestHost {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn error_sink(&self) -> Option<Arc<dyn ErrorSink>> {
        self.sink.clone().map(|sink| sink as Arc<dyn ErrorSink>)
    }
}

/// Wraps a loader and counts the calls reaching it
pub struct CountingLoader<L> {
    inner: L,
    calls: AtomicUsize,
    seen: Mutex<Vec<PathBuf>>,
}

impl<L: ModuleLoader> CountingLoader<L> {
    pub fn new(inner: L) -> Self {
        Self {
            inner,
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn seen(&self) -> Vec<PathBuf> {
        self.seen.lock().unwrap().clone()
    }
}

impl<L: ModuleLoader> ModuleLoader for CountingLoader<L> {
    fn load(&self, path: &Path) -> Result<AddonModule> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push(path.to_path_buf());
        self.inner.load(path)
    }
}

/// Addon recording what its constructor was given
#[derive(Debug)]
pub struct ContextAddon {
    pub context_name: String,
    pub root: PathBuf,
    pub manifest_name: String,
    pub has_project: bool,
}

impl ContextAddon {
    pub fn from_context(context: &AddonContext) -> Self {
        Self {
            context_name: context.name().to_string(),
            root: context.root().to_path_buf(),
            manifest_name: context.manifest().name.clone(),
            has_project: context.project().is_some(),
        }
    }
}

impl Addon for ContextAddon {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Callable module appending the addon name to `log` when constructed
pub fn logging_module(log: &Arc<Mutex<Vec<String>>>) -> AddonModule {
    let log = Arc::clone(log);
    AddonModule::callable(move |context| {
        log.lock().unwrap().push(context.name().to_string());
        Ok(Box::new(ContextAddon::from_context(context)))
    })
}

/// A temporary tree of addon packages
pub struct Fixture {
    dir: TempDir,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Create `<root>/<dir>/` with `manifest` written as `addon.json`
    pub fn package(&self, dir: &str, manifest: &AddonManifest) -> PathBuf {
        let location = self.dir.path().join(dir);
        fs::create_dir_all(&location).unwrap();
        fs::write(location.join("addon.json"), serde_json::to_string_pretty(manifest).unwrap()).unwrap();
        location
    }

    /// Create a file (and its parents) below the fixture root
    pub fn file(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.dir.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }

    /// Package with an `index.mod` entry point, its descriptor and the canonical entry point
    pub fn callable_package(&self, dir: &str, manifest: AddonManifest) -> (AddonDescriptor, PathBuf) {
        let location = self.package(dir, &manifest);
        let entry = self.file(&format!("{}/index.{}", dir, TEST_EXT), "");
        let name = manifest.name.clone();
        (
            AddonDescriptor::new(name, location, manifest),
            fs::canonicalize(entry).unwrap(),
        )
    }
}

