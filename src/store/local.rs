//! Local folder store
//!
//! Models live at `<root>/<namespace>/<version>/<name>.ttl`, next to a `latest.ttl` marker
//! at the root of each workspace.

use crate::concurrency::FileLockTable;
use crate::error::StoreError;
use crate::identifier::{file_name_to_urn, file_to_urn, AspectModelUrn, ModelIdentifier};
use crate::scanner::{is_effectively_empty, FolderScanner, Namespaces};
use crate::sdk::{AspectModelResolver, DeclarationResolver, ParseOptions};
use crate::store::{ModelStore, NamespaceIndex, StorageRoot};
use crate::types::{LATEST_FILE_NAME, TTL_EXTENSION};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use walkdir::WalkDir;

pub struct LocalFolderStore {
    resolver: Arc<dyn AspectModelResolver>,
    index: NamespaceIndex,
    locks: FileLockTable,
}

impl LocalFolderStore {
    /// Store using the built-in declaration resolver.
    pub fn new() -> Self {
        Self::with_resolver(Arc::new(DeclarationResolver::new()))
    }

    pub fn with_resolver(resolver: Arc<dyn AspectModelResolver>) -> Self {
        Self {
            resolver,
            index: NamespaceIndex::new(),
            locks: FileLockTable::new(),
        }
    }

    pub fn resolver(&self) -> &Arc<dyn AspectModelResolver> {
        &self.resolver
    }

    pub fn locks(&self) -> &FileLockTable {
        &self.locks
    }

    /// Rescan a root and replace its cached listing.
    pub fn refresh(&self, root: &StorageRoot) -> Result<Namespaces, StoreError> {
        self.list_all_namespaces(true, root)
    }

    /// Root-relative path a save would write to.
    ///
    /// In order: the `latest.ttl` marker is written as is; without a namespace the path comes
    /// from the URN declared in the content; otherwise the namespace must be a
    /// `namespace:version` token and is joined with the file name.
    pub fn save_path(
        &self,
        namespace: Option<&str>,
        file_name: Option<&str>,
        content: &str,
    ) -> Result<PathBuf, StoreError> {
        let namespace = namespace.filter(|n| !n.is_empty());
        let file_name = file_name.filter(|f| !f.is_empty());

        if file_name == Some(LATEST_FILE_NAME) {
            return Ok(PathBuf::from(LATEST_FILE_NAME));
        }
        if let Some(file_name) = file_name {
            ensure_plain_segment("file name", file_name)?;
        }

        let Some(namespace) = namespace else {
            return Ok(self.resolve_urn(content)?.relative_path());
        };
        if namespace.contains(TTL_EXTENSION) {
            return Err(StoreError::InvalidNamespace {
                namespace: namespace.to_string(),
            });
        }
        let ModelIdentifier::NamespaceVersion {
            namespace: name_space,
            version,
        } = ModelIdentifier::parse(namespace)
        else {
            return Err(StoreError::InvalidNamespace {
                namespace: namespace.to_string(),
            });
        };
        ensure_plain_segment("namespace", &name_space)?;
        ensure_plain_segment("version", &version)?;

        let file_name = match file_name {
            Some(file_name) => file_name.to_string(),
            None => self.resolve_urn(content)?.file_name(),
        };
        Ok(ModelIdentifier::full(name_space, version, file_name).relative_path())
    }

    fn resolve_urn(&self, content: &str) -> Result<AspectModelUrn, StoreError> {
        self.resolver
            .resolve_content(content, ParseOptions::for_save())
            .map_err(|e| StoreError::InvalidAspectModel(e.to_string()))
    }

    /// Remove directories left empty below `root`, walking up from `start`.
    fn remove_empty_ancestors(&self, start: &Path, root: &Path) -> Result<(), StoreError> {
        let mut current = start.parent();
        while let Some(dir) = current {
            if dir == root || !dir.starts_with(root) {
                break;
            }
            if !is_effectively_empty(dir)? {
                break;
            }
            for entry in read_dir(dir)? {
                let entry = entry.map_err(|e| StoreError::FileRead {
                    path: dir.to_path_buf(),
                    source: e,
                })?;
                fs::remove_file(entry.path()).map_err(|e| StoreError::FileWrite {
                    path: entry.path(),
                    source: e,
                })?;
            }
            fs::remove_dir(dir).map_err(|e| StoreError::FileWrite {
                path: dir.to_path_buf(),
                source: e,
            })?;
            tracing::debug!(dir = %dir.display(), "Removed empty directory");
            current = dir.parent();
        }
        Ok(())
    }
}

impl Default for LocalFolderStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelStore for LocalFolderStore {
    fn exists(&self, identifier: &ModelIdentifier, root: &StorageRoot) -> bool {
        identifier.is_valid()
            && ensure_identifier_segments(identifier).is_ok()
            && root.resolve(identifier).is_file()
    }

    fn read_as_string(
        &self,
        identifier: &ModelIdentifier,
        root: &StorageRoot,
    ) -> Result<String, StoreError> {
        ensure_identifier_segments(identifier)?;
        let path = root.resolve(identifier);
        if !identifier.is_valid() || !path.is_file() {
            return Err(StoreError::not_found(path));
        }
        let bytes = fs::read(&path).map_err(|e| StoreError::FileRead {
            path: path.clone(),
            source: e,
        })?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    fn save(
        &self,
        namespace: Option<&str>,
        file_name: Option<&str>,
        content: &str,
        root: &StorageRoot,
    ) -> Result<String, StoreError> {
        let relative = self.save_path(namespace, file_name, content)?;
        let path = root.path().join(&relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| StoreError::FileWrite {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        fs::write(&path, content).map_err(|e| StoreError::FileWrite {
            path: path.clone(),
            source: e,
        })?;
        tracing::info!(path = %path.display(), process = %root.process(), "Saved model");
        Ok(relative.to_string_lossy().into_owned())
    }

    fn delete(
        &self,
        namespace: &str,
        file_name: &str,
        root: &StorageRoot,
    ) -> Result<(), StoreError> {
        ensure_plain_segment("file name", file_name)?;
        let relative = if file_name == LATEST_FILE_NAME {
            PathBuf::from(LATEST_FILE_NAME)
        } else {
            let identifier = ModelIdentifier::parse(namespace);
            if !identifier.is_valid() || namespace.contains(TTL_EXTENSION) {
                return Err(StoreError::InvalidNamespace {
                    namespace: namespace.to_string(),
                });
            }
            ensure_identifier_segments(&identifier)?;
            identifier.relative_path().join(file_name)
        };
        let path = root.path().join(relative);
        if !path.is_file() {
            return Err(StoreError::not_found(path));
        }
        fs::remove_file(&path).map_err(|e| StoreError::FileWrite {
            path: path.clone(),
            source: e,
        })?;
        self.remove_empty_ancestors(&path, root.path())?;
        tracing::info!(path = %path.display(), process = %root.process(), "Deleted model");
        Ok(())
    }

    fn delete_directory(&self, path: &Path) -> Result<(), StoreError> {
        if !path.exists() {
            return Ok(());
        }
        for entry in WalkDir::new(path).into_iter().filter_map(Result::ok) {
            let Ok(metadata) = entry.metadata() else {
                continue;
            };
            let mut permissions = metadata.permissions();
            if permissions.readonly() {
                permissions.set_readonly(false);
                if let Err(e) = fs::set_permissions(entry.path(), permissions) {
                    tracing::warn!(
                        "Failed to unlock {} before deletion: {}",
                        entry.path().display(),
                        e
                    );
                }
            }
        }
        fs::remove_dir_all(path).map_err(|e| StoreError::FileNotFound {
            path: path.to_path_buf(),
            source: Some(e),
        })?;
        self.index.remove(path);
        tracing::info!(path = %path.display(), "Deleted directory");
        Ok(())
    }

    fn list_all_namespaces(
        &self,
        should_refresh: bool,
        root: &StorageRoot,
    ) -> Result<Namespaces, StoreError> {
        if !root.path().is_dir() {
            return Err(StoreError::not_found(root.path()));
        }
        if !should_refresh {
            if let Some(cached) = self.index.get(root.path()) {
                return Ok(cached);
            }
        }
        // Scanning happens outside the index lock; concurrent refreshes race and the last
        // replacement wins.
        let listing = FolderScanner::new(root.path()).scan()?;
        self.index.replace(root.path(), listing.clone());
        tracing::info!(
            root = %root.path().display(),
            namespaces = listing.len(),
            "Refreshed namespace listing"
        );
        Ok(listing)
    }

    fn list_non_turtle_files(&self, root: &StorageRoot) -> Result<Vec<PathBuf>, StoreError> {
        if !root.path().is_dir() {
            return Err(StoreError::not_found(root.path()));
        }
        FolderScanner::new(root.path()).non_turtle_files()
    }

    fn convert_file_to_urn(&self, file: &Path) -> Result<AspectModelUrn, StoreError> {
        file_to_urn(file)
    }

    fn convert_file_name_to_urn(&self, token: &str) -> Result<AspectModelUrn, StoreError> {
        file_name_to_urn(token)
    }

    fn lock(&self, namespace: &str, file_name: &str) -> Result<bool, StoreError> {
        self.locks.lock(namespace, file_name)
    }

    fn unlock(&self, namespace: &str, file_name: &str) -> Result<bool, StoreError> {
        self.locks.unlock(namespace, file_name)
    }
}

fn ensure_plain_segment(label: &str, value: &str) -> Result<(), StoreError> {
    if value == "." || value == ".." || value.contains(['/', '\\']) {
        return Err(StoreError::IllegalArgument(format!(
            "{} '{}' must be a single path segment",
            label, value
        )));
    }
    Ok(())
}

/// Every segment of an identifier must stay a single directory level below the root.
fn ensure_identifier_segments(identifier: &ModelIdentifier) -> Result<(), StoreError> {
    if let Some(namespace) = identifier.namespace() {
        ensure_plain_segment("namespace", namespace)?;
    }
    if let Some(version) = identifier.version() {
        ensure_plain_segment("version", version)?;
    }
    if let Some(file_name) = identifier.file_name() {
        ensure_plain_segment("file name", file_name)?;
    }
    Ok(())
}

fn read_dir(dir: &Path) -> Result<fs::ReadDir, StoreError> {
    fs::read_dir(dir).map_err(|e| StoreError::FileRead {
        path: dir.to_path_buf(),
        source: e,
    })
}
