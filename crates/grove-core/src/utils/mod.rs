pub mod fs;

pub use fs::{has_extension, list_subdirectories};
