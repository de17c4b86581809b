//! Package import: move an unpacked package from the import root into the models root.

use crate::error::{ApiError, StoreError};
use crate::identifier::ModelIdentifier;
use crate::store::{ModelStore, StorageRoot};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportReport {
    /// `namespace:version:file` tokens written to the target root
    pub imported: Vec<String>,
    /// Models left alone because the target already had them
    pub skipped: Vec<String>,
    /// Stray non-turtle files found in the package; they are not imported
    pub stray_files: Vec<String>,
    /// Models that could not be copied; the package is kept when this is not empty
    pub failed: Vec<ImportFailure>,
}

impl ImportReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportFailure {
    pub model: String,
    pub message: String,
}

pub struct PackageImporter {
    store: Arc<dyn ModelStore>,
}

impl PackageImporter {
    pub fn new(store: Arc<dyn ModelStore>) -> Self {
        Self { store }
    }

    /// Copy every listed model of `from` into `into`, then remove `from`.
    pub fn import(
        &self,
        from: &StorageRoot,
        into: &StorageRoot,
        overwrite: bool,
    ) -> Result<ImportReport, ApiError> {
        let listing = self.store.list_all_namespaces(true, from)?;
        let mut report = ImportReport {
            stray_files: self
                .store
                .list_non_turtle_files(from)?
                .iter()
                .map(|p| p.to_string_lossy().into_owned())
                .collect(),
            ..ImportReport::default()
        };
        for stray in &report.stray_files {
            tracing::warn!("Package contains non-turtle file {}", stray);
        }
        std::fs::create_dir_all(into.path()).map_err(|e| StoreError::FileWrite {
            path: into.path().to_path_buf(),
            source: e,
        })?;

        for (namespace, files) in &listing {
            if files.is_empty() {
                let dir = into.resolve(&ModelIdentifier::parse(namespace));
                std::fs::create_dir_all(&dir).map_err(|e| StoreError::FileWrite {
                    path: dir.clone(),
                    source: e,
                })?;
                continue;
            }
            for file_name in files {
                let token = format!("{}:{}", namespace, file_name);
                let identifier = ModelIdentifier::parse(&token);
                if !overwrite && self.store.exists(&identifier, into) {
                    report.skipped.push(token);
                    continue;
                }
                match self.copy_model(&identifier, namespace, file_name, from, into) {
                    Ok(()) => report.imported.push(token),
                    Err(e) => {
                        tracing::warn!("Failed to import {}: {}", token, e);
                        report.failed.push(ImportFailure {
                            model: token,
                            message: e.to_string(),
                        });
                    }
                }
            }
        }

        if report.is_success() {
            self.store.delete_directory(from.path())?;
        } else {
            tracing::warn!(
                "Keeping {} because {} model(s) failed to import",
                from.path().display(),
                report.failed.len()
            );
        }
        self.store.list_all_namespaces(true, into)?;
        tracing::info!(
            imported = report.imported.len(),
            skipped = report.skipped.len(),
            failed = report.failed.len(),
            "Imported package"
        );
        Ok(report)
    }

    fn copy_model(
        &self,
        identifier: &ModelIdentifier,
        namespace: &str,
        file_name: &str,
        from: &StorageRoot,
        into: &StorageRoot,
    ) -> Result<(), StoreError> {
        let content = self.store.read_as_string(identifier, from)?;
        self.store
            .save(Some(namespace), Some(file_name), &content, into)?;
        Ok(())
    }
}
