//! Workflows composed from the store and the aspect-model SDK.

pub mod import;

use crate::error::ApiError;
use crate::identifier::ModelIdentifier;
use crate::sdk::{AspectModelResolver, ModelToolkit, ParseOptions, ValidationReport};
use crate::store::{LocalFolderStore, ModelStore, StorageRoot};
use crate::types::LATEST_FILE_NAME;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub use import::{ImportFailure, ImportReport, PackageImporter};

/// One model that could not be migrated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationFailure {
    pub model: String,
    pub message: String,
}

/// Outcome of migrating every model of a workspace.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationReport {
    pub migrated: Vec<String>,
    pub failed: Vec<MigrationFailure>,
}

impl MigrationReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

pub struct ModelService {
    store: Arc<dyn ModelStore>,
    resolver: Arc<dyn AspectModelResolver>,
    toolkit: Arc<dyn ModelToolkit>,
}

impl ModelService {
    /// Service over a local store, reusing its resolver.
    pub fn new(store: Arc<LocalFolderStore>, toolkit: Arc<dyn ModelToolkit>) -> Self {
        let resolver = Arc::clone(store.resolver());
        Self::with_parts(store, resolver, toolkit)
    }

    pub fn with_parts(
        store: Arc<dyn ModelStore>,
        resolver: Arc<dyn AspectModelResolver>,
        toolkit: Arc<dyn ModelToolkit>,
    ) -> Self {
        Self {
            store,
            resolver,
            toolkit,
        }
    }

    /// Validate content and keep it as the workspace's `latest.ttl`.
    ///
    /// The content is stashed whatever the report says; the caller decides what to do with
    /// violations.
    pub fn validate_and_stash(
        &self,
        content: &str,
        root: &StorageRoot,
    ) -> Result<ValidationReport, ApiError> {
        let model = self.resolver.parse_turtle(content, ParseOptions::default())?;
        let report = self.toolkit.validate(&model);
        self.store
            .save(None, Some(LATEST_FILE_NAME), content, root)?;
        tracing::info!(
            violations = report.violations.len(),
            process = %root.process(),
            "Validated and stashed model"
        );
        Ok(report)
    }

    /// Save a model and refresh the root's listing so it shows up immediately.
    pub fn create_or_save(
        &self,
        namespace: Option<&str>,
        file_name: Option<&str>,
        content: &str,
        root: &StorageRoot,
    ) -> Result<String, ApiError> {
        let saved = self.store.save(namespace, file_name, content, root)?;
        self.store.list_all_namespaces(true, root)?;
        Ok(saved)
    }

    /// Migrate every listed model in place.
    ///
    /// A model that fails is recorded and skipped; the rest of the workspace still migrates.
    pub fn migrate_workspace(&self, root: &StorageRoot) -> Result<MigrationReport, ApiError> {
        let listing = self.store.list_all_namespaces(true, root)?;
        let mut report = MigrationReport::default();
        for (namespace, files) in &listing {
            for file_name in files {
                let model = format!("{}:{}", namespace, file_name);
                match self.migrate_model(namespace, file_name, root) {
                    Ok(()) => report.migrated.push(model),
                    Err(e) => {
                        tracing::warn!("Failed to migrate {}: {}", model, e);
                        report.failed.push(MigrationFailure {
                            model,
                            message: e.to_string(),
                        });
                    }
                }
            }
        }
        self.store.list_all_namespaces(true, root)?;
        tracing::info!(
            migrated = report.migrated.len(),
            failed = report.failed.len(),
            "Migrated workspace"
        );
        Ok(report)
    }

    fn migrate_model(
        &self,
        namespace: &str,
        file_name: &str,
        root: &StorageRoot,
    ) -> Result<(), ApiError> {
        let identifier = ModelIdentifier::parse(&format!("{}:{}", namespace, file_name));
        let content = self.store.read_as_string(&identifier, root)?;
        let parsed = self.resolver.parse_turtle(&content, ParseOptions::for_save())?;
        let migrated = self.toolkit.migrate(parsed)?;
        let urn = self.resolver.resolve_aspect_model_urn(&migrated)?;
        let printed = self.toolkit.pretty_print(&migrated, &urn);
        self.store
            .save(Some(namespace), Some(file_name), &printed, root)?;
        Ok(())
    }
}
