//! Core types shared across the aspect model store.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// File extension of every stored model.
pub const TTL_EXTENSION: &str = ".ttl";

/// Marker file holding the most recently validated content of a workspace.
pub const LATEST_FILE_NAME: &str = "latest.ttl";

/// Scheme prefix of aspect model URNs.
pub const URN_PREFIX: &str = "urn:samm:";

/// OS-generated entries that never make a directory count as non-empty.
pub const NOISE_FILE_NAMES: &[&str] = &[".DS_Store", "Thumbs.db", "desktop.ini"];

pub fn is_noise_file(name: &str) -> bool {
    NOISE_FILE_NAMES.contains(&name)
}

/// Working area a storage root belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ValidationProcess {
    #[default]
    Models,
    Import,
    Export,
    Migration,
}

impl ValidationProcess {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationProcess::Models => "models",
            ValidationProcess::Import => "import",
            ValidationProcess::Export => "export",
            ValidationProcess::Migration => "migration",
        }
    }
}

impl fmt::Display for ValidationProcess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValidationProcess {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "models" => Ok(ValidationProcess::Models),
            "import" => Ok(ValidationProcess::Import),
            "export" => Ok(ValidationProcess::Export),
            "migration" => Ok(ValidationProcess::Migration),
            other => Err(format!(
                "Unknown process '{}' (must be 'models', 'import', 'export' or 'migration')",
                other
            )),
        }
    }
}
