//! Logging
//!
//! `tracing` subscriber setup. The configured section can be overridden through
//! `ASPECT_STORE_LOG` (filter directives), `ASPECT_STORE_LOG_FORMAT`, `ASPECT_STORE_LOG_OUTPUT`,
//! `ASPECT_STORE_LOG_MODULES` and `ASPECT_STORE_LOG_FILE`.

use crate::error::ApiError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::fmt::writer::{BoxMakeWriter, MakeWriterExt};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

const LOG_FILE_NAME: &str = "aspect-store.log";
const ENV_FILTER: &str = "ASPECT_STORE_LOG";
const ENV_FORMAT: &str = "ASPECT_STORE_LOG_FORMAT";
const ENV_OUTPUT: &str = "ASPECT_STORE_LOG_OUTPUT";
const ENV_MODULES: &str = "ASPECT_STORE_LOG_MODULES";
const ENV_FILE: &str = "ASPECT_STORE_LOG_FILE";

/// Logging section of the store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// trace, debug, info, warn, error or off
    #[serde(default = "default_log_level")]
    pub level: String,

    /// text or json
    #[serde(default = "default_format")]
    pub format: String,

    /// stdout, stderr, file, file+stderr or both
    #[serde(default = "default_output")]
    pub output: String,

    /// Log file when output includes a file; the state directory is used when unset
    #[serde(default)]
    pub file: Option<PathBuf>,

    /// ANSI colors for text written to a terminal
    #[serde(default = "default_true")]
    pub color: bool,

    /// Per-module level overrides, e.g. `aspect_store::scanner = "debug"`
    #[serde(default)]
    pub modules: HashMap<String, String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_format() -> String {
    "text".to_string()
}

fn default_output() -> String {
    "file".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_log_level(),
            format: default_format(),
            output: default_output(),
            file: None,
            color: true,
            modules: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(ApiError::ConfigError(format!(
                "Invalid log format: {} (must be 'json' or 'text')",
                other
            ))),
        }
    }
}

/// Where log lines go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogOutput {
    Stdout,
    Stderr,
    File,
    FileAndStderr,
    /// stdout and stderr
    Both,
}

impl LogOutput {
    pub fn writes_file(&self) -> bool {
        matches!(self, LogOutput::File | LogOutput::FileAndStderr)
    }
}

impl FromStr for LogOutput {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stdout" => Ok(LogOutput::Stdout),
            "stderr" => Ok(LogOutput::Stderr),
            "file" => Ok(LogOutput::File),
            "file+stderr" => Ok(LogOutput::FileAndStderr),
            "both" => Ok(LogOutput::Both),
            other => Err(ApiError::ConfigError(format!(
                "Invalid log output: {} (must be 'stdout', 'stderr', 'file', 'file+stderr', or 'both')",
                other
            ))),
        }
    }
}

/// Log file for a store, in order: `ASPECT_STORE_LOG_FILE`, the configured file, the default.
///
/// The default lives in the platform state directory, below a folder mirroring the store's
/// base path so separate stores keep separate logs.
pub fn resolve_log_file_path(
    configured: Option<&Path>,
    base_path: Option<&Path>,
) -> Result<PathBuf, ApiError> {
    if let Some(from_env) = std::env::var_os(ENV_FILE).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(from_env));
    }
    if let Some(path) = configured.filter(|p| !p.as_os_str().is_empty()) {
        return Ok(path.to_path_buf());
    }
    let dirs = directories::ProjectDirs::from("", "aspect-store", "aspect-store").ok_or_else(
        || ApiError::ConfigError("Could not determine platform state directory".to_string()),
    )?;
    let mut dir = dirs
        .state_dir()
        .unwrap_or_else(|| dirs.data_local_dir())
        .to_path_buf();
    // The base path may not exist yet; an unresolvable one shares the unscoped log.
    if let Some(canonical) = base_path.and_then(|b| dunce::canonicalize(b).ok()) {
        dir.extend(canonical.components().filter_map(|c| match c {
            Component::Normal(name) => Some(name),
            _ => None,
        }));
    }
    Ok(dir.join(LOG_FILE_NAME))
}

/// Install the global subscriber.
///
/// Fails if a subscriber is already installed or the section holds an unknown format, output
/// or directive.
pub fn init_logging(config: &LoggingConfig, base_path: Option<&Path>) -> Result<(), ApiError> {
    if !config.enabled {
        return Registry::default()
            .with(EnvFilter::new("off"))
            .try_init()
            .map_err(|e| ApiError::ConfigError(format!("Failed to install logger: {}", e)));
    }

    let filter = build_env_filter(config)?;
    let format: LogFormat = env_or(ENV_FORMAT, &config.format).parse()?;
    let output: LogOutput = env_or(ENV_OUTPUT, &config.output).parse()?;

    let writer = match output {
        LogOutput::Stdout => BoxMakeWriter::new(std::io::stdout),
        LogOutput::Stderr => BoxMakeWriter::new(std::io::stderr),
        LogOutput::Both => BoxMakeWriter::new(std::io::stdout.and(std::io::stderr)),
        LogOutput::File => BoxMakeWriter::new(open_log_file(config, base_path)?),
        LogOutput::FileAndStderr => {
            BoxMakeWriter::new(open_log_file(config, base_path)?.and(std::io::stderr))
        }
    };

    let registry = Registry::default().with(filter);
    let installed = match format {
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_writer(writer),
            )
            .try_init(),
        LogFormat::Text => registry
            .with(
                fmt::layer()
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_ansi(config.color && !output.writes_file())
                    .with_writer(writer),
            )
            .try_init(),
    };
    installed.map_err(|e| ApiError::ConfigError(format!("Failed to install logger: {}", e)))
}

fn env_or(var: &str, configured: &str) -> String {
    std::env::var(var)
        .ok()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| configured.to_string())
}

fn open_log_file(config: &LoggingConfig, base_path: Option<&Path>) -> Result<File, ApiError> {
    let path = resolve_log_file_path(config.file.as_deref(), base_path)?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            ApiError::ConfigError(format!("Failed to create log directory: {}", e))
        })?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|e| {
            ApiError::ConfigError(format!("Failed to open log file {}: {}", path.display(), e))
        })
}

/// `ASPECT_STORE_LOG` replaces the configured filter entirely; module overrides from the
/// section and from `ASPECT_STORE_LOG_MODULES` (`module=level,...`) are added to it otherwise.
fn build_env_filter(config: &LoggingConfig) -> Result<EnvFilter, ApiError> {
    if let Ok(filter) = EnvFilter::try_from_env(ENV_FILTER) {
        return Ok(filter);
    }
    if config.level == "off" {
        return Ok(EnvFilter::new("off"));
    }

    let from_env = std::env::var(ENV_MODULES).unwrap_or_default();
    let env_modules = from_env
        .split(',')
        .filter_map(|spec| spec.split_once('='))
        .map(|(module, level)| (module.trim(), level.trim()));
    let configured = config
        .modules
        .iter()
        .map(|(module, level)| (module.as_str(), level.as_str()));

    let mut filter = EnvFilter::new(&config.level);
    for (module, level) in configured.chain(env_modules) {
        let directive = format!("{}={}", module, level)
            .parse()
            .map_err(|e| ApiError::ConfigError(format!("Invalid log directive: {}", e)))?;
        filter = filter.add_directive(directive);
    }
    Ok(filter)
}
