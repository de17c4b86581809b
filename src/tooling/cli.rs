//! CLI Tooling
//!
//! Command-line interface over the model store. Every command resolves its storage root
//! from configuration and returns the text to print.

use crate::config::{ConfigLoader, StoreConfig};
use crate::error::{ApiError, StoreError};
use crate::identifier::ModelIdentifier;
use crate::logging::LoggingConfig;
use crate::scanner::Namespaces;
use crate::service::{ImportReport, PackageImporter};
use crate::store::{LocalFolderStore, ModelStore, StorageRoot};
use crate::types::{ValidationProcess, URN_PREFIX};
use clap::{Parser, Subcommand};
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

/// Aspect Store CLI - namespace-addressed aspect model repository
#[derive(Parser)]
#[command(name = "aspect-store")]
#[command(about = "Namespace-addressed local repository for SAMM aspect models")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Directory holding the storage roots (overrides configuration)
    #[arg(long)]
    pub base_path: Option<PathBuf>,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file, file+stderr, both)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output includes "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    /// Apply logging flags on top of the configured logging section.
    pub fn logging_config(&self, base: &LoggingConfig) -> LoggingConfig {
        let mut config = base.clone();
        if let Some(level) = &self.log_level {
            config.level = level.clone();
        }
        if let Some(format) = &self.log_format {
            config.format = format.clone();
        }
        if let Some(output) = &self.log_output {
            config.output = output.clone();
        }
        if let Some(file) = &self.log_file {
            config.file = Some(file.clone());
        }
        config
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// List namespaces and the models stored under them
    List {
        /// Rescan the storage root instead of using the cached listing
        #[arg(long)]
        refresh: bool,
        /// Storage root (models, import, export, migration)
        #[arg(long, default_value = "models")]
        process: ValidationProcess,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Print a stored model
    Show {
        /// `namespace:version:file.ttl` token or model URN
        identifier: String,
        #[arg(long, default_value = "models")]
        process: ValidationProcess,
    },
    /// Check whether a model is stored
    Exists {
        /// `namespace:version:file.ttl` token or model URN
        identifier: String,
        #[arg(long, default_value = "models")]
        process: ValidationProcess,
    },
    /// Save a turtle file into the store
    Save {
        /// Turtle file to read
        input: PathBuf,
        /// Target `namespace:version`; derived from the model's URN when omitted
        #[arg(long)]
        namespace: Option<String>,
        /// Target file name; derived from the model's URN when omitted
        #[arg(long)]
        file_name: Option<String>,
        #[arg(long, default_value = "models")]
        process: ValidationProcess,
    },
    /// Delete a stored model and any directories it leaves empty
    Delete {
        /// `namespace:version`
        namespace: String,
        /// Model file name
        file_name: String,
        #[arg(long, default_value = "models")]
        process: ValidationProcess,
    },
    /// Convert a `namespace:version:file.ttl` token to its URN
    Urn { token: String },
    /// List non-turtle files inside namespace folders
    Stray {
        #[arg(long, default_value = "import")]
        process: ValidationProcess,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Remove a working root (import, export or migration)
    Clean {
        #[arg(long)]
        process: ValidationProcess,
    },
    /// Move the unpacked import package into the models root
    Import {
        /// Replace models that already exist
        #[arg(long)]
        overwrite: bool,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
}

/// CLI context holding configuration and the store
pub struct CliContext {
    config: StoreConfig,
    store: Arc<LocalFolderStore>,
}

impl CliContext {
    /// Create a new CLI context from config files, environment and overrides
    pub fn new(base_path: Option<PathBuf>, config_path: Option<PathBuf>) -> Result<Self, ApiError> {
        let mut config = match &config_path {
            Some(path) => ConfigLoader::load_from_file(path)?,
            None => {
                let working_dir = std::env::current_dir().map_err(|e| {
                    ApiError::ConfigError(format!("Failed to read working directory: {}", e))
                })?;
                ConfigLoader::load(&working_dir)?
            }
        };
        if base_path.is_some() {
            config.storage.base_path = base_path;
        }
        Ok(Self::from_config(config))
    }

    pub fn from_config(config: StoreConfig) -> Self {
        Self {
            config,
            store: Arc::new(LocalFolderStore::new()),
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<LocalFolderStore> {
        &self.store
    }

    fn root(&self, process: ValidationProcess) -> Result<StorageRoot, ApiError> {
        self.config.storage.root_for(process)
    }

    /// Execute a CLI command
    pub fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        let started = Instant::now();
        let result = self.execute_inner(command);
        tracing::info!(
            command = command_name(command),
            ok = result.is_ok(),
            duration_ms = started.elapsed().as_millis() as u64,
            "Command finished"
        );
        result
    }

    fn execute_inner(&self, command: &Commands) -> Result<String, ApiError> {
        match command {
            Commands::List {
                refresh,
                process,
                format,
            } => {
                ensure_format(format)?;
                let root = self.root(*process)?;
                let listing = self.store.list_all_namespaces(*refresh, &root)?;
                format_listing(&listing, format)
            }
            Commands::Show {
                identifier,
                process,
            } => {
                let root = self.root(*process)?;
                Ok(self
                    .store
                    .read_as_string(&parse_model_reference(identifier), &root)?)
            }
            Commands::Exists {
                identifier,
                process,
            } => {
                let root = self.root(*process)?;
                Ok(self
                    .store
                    .exists(&parse_model_reference(identifier), &root)
                    .to_string())
            }
            Commands::Save {
                input,
                namespace,
                file_name,
                process,
            } => {
                let root = self.root(*process)?;
                let content = read_input(input)?;
                let saved = self.store.save(
                    namespace.as_deref(),
                    file_name.as_deref(),
                    &content,
                    &root,
                )?;
                Ok(format!("Saved {}", saved))
            }
            Commands::Delete {
                namespace,
                file_name,
                process,
            } => {
                let root = self.root(*process)?;
                self.store.delete(namespace, file_name, &root)?;
                Ok(format!("Deleted {}:{}", namespace, file_name))
            }
            Commands::Urn { token } => Ok(self.store.convert_file_name_to_urn(token)?.to_string()),
            Commands::Stray { process, format } => {
                ensure_format(format)?;
                let root = self.root(*process)?;
                let stray: Vec<String> = self
                    .store
                    .list_non_turtle_files(&root)?
                    .iter()
                    .map(|p| p.to_string_lossy().into_owned())
                    .collect();
                if format == "json" {
                    return to_json(&stray);
                }
                if stray.is_empty() {
                    return Ok("No stray files".to_string());
                }
                Ok(stray.join("\n"))
            }
            Commands::Clean { process } => {
                if *process == ValidationProcess::Models {
                    return Err(StoreError::IllegalArgument(
                        "refusing to remove the models root".to_string(),
                    )
                    .into());
                }
                let root = self.root(*process)?;
                self.store.delete_directory(root.path())?;
                Ok(format!("Removed {}", root.path().display()))
            }
            Commands::Import { overwrite, format } => {
                ensure_format(format)?;
                let from = self.root(ValidationProcess::Import)?;
                let into = self.root(ValidationProcess::Models)?;
                let report = PackageImporter::new(self.store.clone()).import(&from, &into, *overwrite)?;
                if format == "json" {
                    return to_json(&report);
                }
                Ok(format_import_report(&report))
            }
        }
    }
}

/// Accept both colon tokens and `urn:samm:` references.
fn parse_model_reference(reference: &str) -> ModelIdentifier {
    if reference.starts_with(URN_PREFIX) {
        ModelIdentifier::from_urn_or_path(reference)
    } else {
        ModelIdentifier::parse(reference)
    }
}

fn read_input(path: &Path) -> Result<String, ApiError> {
    std::fs::read_to_string(path).map_err(|e| {
        let err = if e.kind() == std::io::ErrorKind::NotFound {
            StoreError::FileNotFound {
                path: path.to_path_buf(),
                source: Some(e),
            }
        } else {
            StoreError::FileRead {
                path: path.to_path_buf(),
                source: e,
            }
        };
        err.into()
    })
}

fn ensure_format(format: &str) -> Result<(), ApiError> {
    if format == "text" || format == "json" {
        return Ok(());
    }
    Err(StoreError::IllegalArgument(format!(
        "Invalid output format: {} (must be 'text' or 'json')",
        format
    ))
    .into())
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, ApiError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| ApiError::ConfigError(format!("Failed to serialize output: {}", e)))
}

fn format_listing(listing: &Namespaces, format: &str) -> Result<String, ApiError> {
    if format == "json" {
        return to_json(listing);
    }
    if listing.is_empty() {
        return Ok("No namespaces found".to_string());
    }
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Namespace", "Version", "Models"]);
    for (key, files) in listing {
        let (namespace, version) = key.rsplit_once(':').unwrap_or((key.as_str(), ""));
        let models = if files.is_empty() {
            "-".to_string()
        } else {
            files.join("\n")
        };
        table.add_row(vec![namespace.to_string(), version.to_string(), models]);
    }
    Ok(table.to_string())
}

fn format_import_report(report: &ImportReport) -> String {
    let mut out = format!(
        "Imported {} model(s), skipped {}",
        report.imported.len(),
        report.skipped.len()
    );
    for skipped in &report.skipped {
        out.push_str(&format!("\n  skipped {}", skipped));
    }
    if !report.stray_files.is_empty() {
        out.push_str("\nIgnored non-turtle files:");
        for stray in &report.stray_files {
            out.push_str(&format!("\n  {}", stray));
        }
    }
    for failure in &report.failed {
        out.push_str(&format!("\n  failed {}: {}", failure.model, failure.message));
    }
    out
}

fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::List { .. } => "list",
        Commands::Show { .. } => "show",
        Commands::Exists { .. } => "exists",
        Commands::Save { .. } => "save",
        Commands::Delete { .. } => "delete",
        Commands::Urn { .. } => "urn",
        Commands::Stray { .. } => "stray",
        Commands::Clean { .. } => "clean",
        Commands::Import { .. } => "import",
    }
}
