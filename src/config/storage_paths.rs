//! StorageConfig and storage root resolution.

use crate::error::ApiError;
use crate::store::StorageRoot;
use crate::types::ValidationProcess;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

fn default_models_dir() -> String {
    "models".to_string()
}

fn default_import_dir() -> String {
    "import-package".to_string()
}

fn default_export_dir() -> String {
    "export-package".to_string()
}

fn default_migration_dir() -> String {
    "migration".to_string()
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding every storage root; platform data dir when unset
    #[serde(default)]
    pub base_path: Option<PathBuf>,

    #[serde(default = "default_models_dir")]
    pub models_dir: String,

    #[serde(default = "default_import_dir")]
    pub import_dir: String,

    #[serde(default = "default_export_dir")]
    pub export_dir: String,

    #[serde(default = "default_migration_dir")]
    pub migration_dir: String,
}

impl StorageConfig {
    /// Resolve the base directory all storage roots live in.
    pub fn resolve_base_path(&self) -> Result<PathBuf, ApiError> {
        if let Some(base) = &self.base_path {
            if !base.as_os_str().is_empty() {
                return Ok(base.clone());
            }
        }
        let project_dirs =
            directories::ProjectDirs::from("", "aspect-store", "aspect-store").ok_or_else(|| {
                ApiError::ConfigError(
                    "Could not determine platform data directory (HOME not set)".to_string(),
                )
            })?;
        Ok(project_dirs.data_dir().to_path_buf())
    }

    pub fn dir_name(&self, process: ValidationProcess) -> &str {
        match process {
            ValidationProcess::Models => &self.models_dir,
            ValidationProcess::Import => &self.import_dir,
            ValidationProcess::Export => &self.export_dir,
            ValidationProcess::Migration => &self.migration_dir,
        }
    }

    /// Storage root of one working area.
    pub fn root_for(&self, process: ValidationProcess) -> Result<StorageRoot, ApiError> {
        let name = self.dir_name(process);
        if name.is_empty() || name.contains(['/', '\\']) || name == ".." {
            return Err(ApiError::ConfigError(format!(
                "Invalid {} directory name '{}'",
                process, name
            )));
        }
        Ok(StorageRoot::new(
            process,
            self.resolve_base_path()?.join(name),
        ))
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            base_path: None,
            models_dir: default_models_dir(),
            import_dir: default_import_dir(),
            export_dir: default_export_dir(),
            migration_dir: default_migration_dir(),
        }
    }
}
