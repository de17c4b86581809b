//! Edit locks for stored model files
//!
//! Tracks which (namespace, file name) pairs an editing session currently holds. Locking is
//! try-once: a second lock on a held pair reports `false` instead of waiting.

use crate::error::StoreError;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::HashMap;

/// Key of one lock entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LockKey {
    pub namespace: String,
    pub file_name: String,
}

/// Holder marker of an active lock.
#[derive(Debug, Clone)]
pub struct LockEntry {
    pub locked_at: DateTime<Utc>,
}

/// In-memory lock table
///
/// The map lock is only held for the duration of a single check-and-insert or remove, so
/// calls on different keys never wait on each other beyond that.
pub struct FileLockTable {
    locks: Mutex<HashMap<LockKey, LockEntry>>,
}

impl FileLockTable {
    pub fn new() -> Self {
        Self {
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Take the lock for a file. Returns `false` if it is already held.
    pub fn lock(&self, namespace: &str, file_name: &str) -> Result<bool, StoreError> {
        let key = Self::key(namespace, file_name)?;
        let mut locks = self.locks.lock();
        if locks.contains_key(&key) {
            tracing::debug!(namespace, file_name, "File already locked");
            return Ok(false);
        }
        locks.insert(
            key,
            LockEntry {
                locked_at: Utc::now(),
            },
        );
        tracing::debug!(namespace, file_name, "File locked");
        Ok(true)
    }

    /// Release the lock for a file. Returns `false` if nothing was locked.
    pub fn unlock(&self, namespace: &str, file_name: &str) -> Result<bool, StoreError> {
        let key = Self::key(namespace, file_name)?;
        let released = self.locks.lock().remove(&key).is_some();
        if released {
            tracing::debug!(namespace, file_name, "File unlocked");
        }
        Ok(released)
    }

    pub fn is_locked(&self, namespace: &str, file_name: &str) -> Result<bool, StoreError> {
        let key = Self::key(namespace, file_name)?;
        Ok(self.locks.lock().contains_key(&key))
    }

    /// When the lock on a file was taken, if it is held.
    pub fn holder(&self, namespace: &str, file_name: &str) -> Result<Option<LockEntry>, StoreError> {
        let key = Self::key(namespace, file_name)?;
        Ok(self.locks.lock().get(&key).cloned())
    }

    fn key(namespace: &str, file_name: &str) -> Result<LockKey, StoreError> {
        validate_segment("namespace", namespace)?;
        validate_segment("file name", file_name)?;
        Ok(LockKey {
            namespace: namespace.to_string(),
            file_name: file_name.to_string(),
        })
    }
}

impl Default for FileLockTable {
    fn default() -> Self {
        Self::new()
    }
}

fn validate_segment(label: &str, value: &str) -> Result<(), StoreError> {
    if value.is_empty() {
        return Err(StoreError::IllegalArgument(format!("{} must not be empty", label)));
    }
    if value.contains("..") {
        return Err(StoreError::IllegalArgument(format!(
            "{} '{}' must not contain '..'",
            label, value
        )));
    }
    if !value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
    {
        return Err(StoreError::IllegalArgument(format!(
            "{} '{}' may only contain letters, digits, '-', '_' and '.'",
            label, value
        )));
    }
    Ok(())
}
