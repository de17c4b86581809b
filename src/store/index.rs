//! Namespace index
//!
//! Cached namespace listings, one per storage root. A listing is only ever replaced as a
//! whole; saves and deletes do not touch it.

use crate::scanner::Namespaces;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub struct NamespaceIndex {
    listings: RwLock<HashMap<PathBuf, Namespaces>>,
}

impl NamespaceIndex {
    pub fn new() -> Self {
        Self {
            listings: RwLock::new(HashMap::new()),
        }
    }

    /// Cached listing for a root. An empty listing counts as absent.
    pub fn get(&self, root: &Path) -> Option<Namespaces> {
        self.listings
            .read()
            .get(root)
            .filter(|listing| !listing.is_empty())
            .cloned()
    }

    pub fn replace(&self, root: &Path, listing: Namespaces) {
        self.listings.write().insert(root.to_path_buf(), listing);
    }

    /// Forget a root's listing, e.g. after the root itself was deleted.
    pub fn remove(&self, root: &Path) {
        self.listings.write().remove(root);
    }
}

impl Default for NamespaceIndex {
    fn default() -> Self {
        Self::new()
    }
}
