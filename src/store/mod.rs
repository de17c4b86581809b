//! Model store
//!
//! Maps model identifiers onto files below a storage root and keeps a cached listing of the
//! namespaces found there.

pub mod index;
pub mod local;

use crate::error::StoreError;
use crate::identifier::{AspectModelUrn, ModelIdentifier};
use crate::scanner::Namespaces;
use crate::types::ValidationProcess;
use std::path::{Path, PathBuf};

pub use index::NamespaceIndex;
pub use local::LocalFolderStore;

/// Base directory one working area keeps its models in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageRoot {
    process: ValidationProcess,
    path: PathBuf,
}

impl StorageRoot {
    pub fn new(process: ValidationProcess, path: impl Into<PathBuf>) -> Self {
        Self {
            process,
            path: path.into(),
        }
    }

    pub fn process(&self) -> ValidationProcess {
        self.process
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Absolute location of an identifier below this root.
    pub fn resolve(&self, identifier: &ModelIdentifier) -> PathBuf {
        self.path.join(identifier.relative_path())
    }
}

/// Storage contract the services and the CLI depend on.
pub trait ModelStore: Send + Sync {
    fn exists(&self, identifier: &ModelIdentifier, root: &StorageRoot) -> bool;

    fn read_as_string(
        &self,
        identifier: &ModelIdentifier,
        root: &StorageRoot,
    ) -> Result<String, StoreError>;

    /// Write a model and return its root-relative path.
    fn save(
        &self,
        namespace: Option<&str>,
        file_name: Option<&str>,
        content: &str,
        root: &StorageRoot,
    ) -> Result<String, StoreError>;

    fn delete(&self, namespace: &str, file_name: &str, root: &StorageRoot)
        -> Result<(), StoreError>;

    fn delete_directory(&self, path: &Path) -> Result<(), StoreError>;

    fn list_all_namespaces(
        &self,
        should_refresh: bool,
        root: &StorageRoot,
    ) -> Result<Namespaces, StoreError>;

    fn list_non_turtle_files(&self, root: &StorageRoot) -> Result<Vec<PathBuf>, StoreError>;

    fn convert_file_to_urn(&self, file: &Path) -> Result<AspectModelUrn, StoreError>;

    fn convert_file_name_to_urn(&self, token: &str) -> Result<AspectModelUrn, StoreError>;

    fn lock(&self, namespace: &str, file_name: &str) -> Result<bool, StoreError>;

    fn unlock(&self, namespace: &str, file_name: &str) -> Result<bool, StoreError>;
}
