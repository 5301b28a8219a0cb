pub mod common;
pub mod manifest_tests;
