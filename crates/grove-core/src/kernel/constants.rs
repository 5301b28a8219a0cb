/// Application name
pub const APP_NAME: &str = "grove";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// File extension of addon modules on this platform (`so`, `dylib`, `dll`)
pub const MODULE_EXTENSION: &str = std::env::consts::DLL_EXTENSION;

/// File stem used when a manifest names no entry point
pub const INDEX_STEM: &str = "index";

/// Default manifest file name inside an addon directory
pub const DEFAULT_MANIFEST_FILE: &str = "addon.json";

/// Default directory, relative to a project or addon, holding nested addons
pub const DEFAULT_NESTED_DIR: &str = "addons";

/// Symbol exported by dynamic addon libraries
pub const ENTRY_SYMBOL: &[u8] = b"grove_addon_module";

/// Configuration file looked up in a project root when none is given
pub const CONFIG_FILE_NAME: &str = "grove.toml";
