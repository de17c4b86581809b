//! Entry point used by the CLI to obtain a `StoreConfig`.

use super::merge::MergeService;
use super::StoreConfig;
use config::ConfigError;
use std::path::Path;

pub struct ConfigLoader;

impl ConfigLoader {
    /// Defaults, then `aspect-store.toml` in `working_dir` if present, then the environment.
    pub fn load(working_dir: &Path) -> Result<StoreConfig, ConfigError> {
        MergeService::load(working_dir)
    }

    /// Same layering with an explicit file that must exist.
    pub fn load_from_file(path: &Path) -> Result<StoreConfig, ConfigError> {
        MergeService::load_from_file(path)
    }
}
