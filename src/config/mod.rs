//! Configuration
//!
//! Layered through the `config` crate: built-in defaults, then `aspect-store.toml` in the
//! working directory, then `ASPECT_STORE__<SECTION>__<KEY>` environment variables.

pub mod facade;
pub mod merge;
pub mod sources;
pub mod storage_paths;

use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};

pub use facade::ConfigLoader;
pub use storage_paths::StorageConfig;

/// Name of the per-workspace config file.
pub const CONFIG_FILE_NAME: &str = "aspect-store.toml";

/// Environment variable prefix for config overrides.
pub const ENV_PREFIX: &str = "ASPECT_STORE";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}
