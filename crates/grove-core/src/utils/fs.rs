use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Immediate subdirectories of `path`, sorted by path.
///
/// `read_dir` order is platform dependent; sorting keeps discovery deterministic.
pub fn list_subdirectories<P: AsRef<Path>>(path: P) -> io::Result<Vec<PathBuf>> {
    let mut result = Vec::new();
    for entry in fs::read_dir(path)? {
        let entry_path = entry?.path();
        if entry_path.is_dir() {
            result.push(entry_path);
        }
    }
    result.sort();
    Ok(result)
}

/// Whether `path` has the given extension, compared case-insensitively
pub fn has_extension<P: AsRef<Path>>(path: P, extension: &str) -> bool {
    match path.as_ref().extension() {
        Some(ext) => ext.to_string_lossy().eq_ignore_ascii_case(extension),
        None => false,
    }
}
