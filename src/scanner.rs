//! Namespace folder scanner
//!
//! Walks a storage root and classifies what it finds. Only turtle files at
//! `namespace/version/file.ttl` depth and empty `namespace/version` directories make it into
//! the namespace listing; everything else is noise for listing purposes.

use crate::error::StoreError;
use crate::identifier::to_directory_token;
use crate::types::{is_noise_file, LATEST_FILE_NAME, TTL_EXTENSION};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// `namespace:version` -> file names found under that directory.
pub type Namespaces = BTreeMap<String, Vec<String>>;

/// Depth of a model file below the storage root.
const MODEL_DEPTH: usize = 3;

/// Depth of a version directory below the storage root.
const VERSION_DEPTH: usize = 2;

/// Classification of one entry under a storage root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FolderEntry {
    TurtleFile(PathBuf),
    EmptyLeafDirectory(PathBuf),
    NonTurtleFile(PathBuf),
    ReservedMarker(PathBuf),
    Standalone(PathBuf),
    /// Non-empty directories and OS noise such as `.DS_Store`.
    Other(PathBuf),
}

impl FolderEntry {
    /// Root-relative path of the entry.
    pub fn path(&self) -> &Path {
        match self {
            FolderEntry::TurtleFile(p)
            | FolderEntry::EmptyLeafDirectory(p)
            | FolderEntry::NonTurtleFile(p)
            | FolderEntry::ReservedMarker(p)
            | FolderEntry::Standalone(p)
            | FolderEntry::Other(p) => p,
        }
    }
}

/// Directory walker over a storage root.
pub struct FolderScanner<'a> {
    root: &'a Path,
}

impl<'a> FolderScanner<'a> {
    pub fn new(root: &'a Path) -> Self {
        Self { root }
    }

    /// Classify every entry below the root, in file-name order.
    pub fn entries(&self) -> Result<Vec<FolderEntry>, StoreError> {
        let mut entries = Vec::new();
        for entry in WalkDir::new(self.root)
            .min_depth(1)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| StoreError::FileRead {
                path: e
                    .path()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| self.root.to_path_buf()),
                source: e.into(),
            })?;
            let relative = match entry.path().strip_prefix(self.root) {
                Ok(relative) => relative.to_path_buf(),
                Err(_) => {
                    tracing::warn!("Skipping entry outside scan root: {}", entry.path().display());
                    continue;
                }
            };
            let depth = entry.depth();
            let file_name = entry.file_name().to_string_lossy();

            let classified = if entry.file_type().is_dir() {
                if is_effectively_empty(entry.path())? {
                    FolderEntry::EmptyLeafDirectory(relative)
                } else {
                    FolderEntry::Other(relative)
                }
            } else if is_noise_file(&file_name) {
                FolderEntry::Other(relative)
            } else if depth < MODEL_DEPTH {
                FolderEntry::Standalone(relative)
            } else if depth > MODEL_DEPTH && file_name.ends_with(TTL_EXTENSION) {
                // No namespace:version token maps back onto a nested namespace path.
                tracing::warn!("Skipping turtle file below model depth: {}", relative.display());
                FolderEntry::Other(relative)
            } else if file_name == LATEST_FILE_NAME {
                FolderEntry::ReservedMarker(relative)
            } else if file_name.ends_with(TTL_EXTENSION) {
                FolderEntry::TurtleFile(relative)
            } else {
                FolderEntry::NonTurtleFile(relative)
            };
            entries.push(classified);
        }
        Ok(entries)
    }

    /// Build the namespace listing.
    ///
    /// Turtle files contribute their file name to their `namespace:version` group. Empty
    /// version directories contribute an empty group.
    pub fn scan(&self) -> Result<Namespaces, StoreError> {
        let mut namespaces = Namespaces::new();
        for entry in self.entries()? {
            match entry {
                FolderEntry::TurtleFile(path) => {
                    let token = to_directory_token(&path);
                    if let Some((key, file_name)) = token.rsplit_once(':') {
                        namespaces
                            .entry(key.to_string())
                            .or_default()
                            .push(file_name.to_string());
                    }
                }
                FolderEntry::EmptyLeafDirectory(path)
                    if path.components().count() == VERSION_DEPTH =>
                {
                    namespaces.entry(to_directory_token(&path)).or_default();
                }
                _ => {}
            }
        }
        tracing::debug!(
            root = %self.root.display(),
            groups = namespaces.len(),
            "Scanned namespace folders"
        );
        Ok(namespaces)
    }

    /// Files inside namespace folders that are not turtle files.
    pub fn non_turtle_files(&self) -> Result<Vec<PathBuf>, StoreError> {
        Ok(self
            .entries()?
            .into_iter()
            .filter_map(|entry| match entry {
                FolderEntry::NonTurtleFile(path) => Some(path),
                _ => None,
            })
            .collect())
    }
}

/// Whether a directory holds nothing but OS noise files.
pub(crate) fn is_effectively_empty(dir: &Path) -> Result<bool, StoreError> {
    let read_error = |e: std::io::Error| StoreError::FileRead {
        path: dir.to_path_buf(),
        source: e,
    };
    for entry in std::fs::read_dir(dir).map_err(read_error)? {
        let entry = entry.map_err(read_error)?;
        let is_file = entry.file_type().map(|t| t.is_file()).unwrap_or(false);
        if !is_file || !is_noise_file(&entry.file_name().to_string_lossy()) {
            return Ok(false);
        }
    }
    Ok(true)
}
