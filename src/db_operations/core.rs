use crate::error::AclResult;
use crate::permissions::{ObjectPermission, PermissionBackend};
use crate::types::PermissionKey;
use log::{debug, warn};
use std::path::Path;

/// Sled-backed storage for object permission records.
///
/// Records live in a single tree keyed by [`PermissionKey::to_storage_key`];
/// values are the JSON form of [`ObjectPermission`].
#[derive(Clone)]
pub struct DbOperations {
    pub(crate) permissions_tree: sled::Tree,
}

impl DbOperations {
    /// Wraps an open database, opening `tree_name` for permission records
    pub fn new(db: sled::Db, tree_name: &str) -> Result<Self, sled::Error> {
        let permissions_tree = db.open_tree(tree_name)?;
        Ok(Self { permissions_tree })
    }

    /// Opens (or creates) the database at `path`
    pub fn open(path: &Path, tree_name: &str) -> Result<Self, sled::Error> {
        debug!("Opening permission database at {}", path.display());
        let db = sled::open(path)?;
        Self::new(db, tree_name)
    }

    pub fn record_count(&self) -> usize {
        self.permissions_tree.len()
    }
}

impl PermissionBackend for DbOperations {
    fn load(&self, key: &PermissionKey) -> AclResult<Option<ObjectPermission>> {
        match self.permissions_tree.get(key.to_storage_key())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn save(&mut self, key: &PermissionKey, record: &ObjectPermission) -> AclResult<()> {
        let bytes = serde_json::to_vec(record)?;
        self.permissions_tree.insert(key.to_storage_key(), bytes)?;

        // Committed once inserted; a failed flush is retried by sled's background flusher
        if let Err(e) = self.permissions_tree.flush() {
            warn!("Failed to flush permission record {}: {}", key, e);
        }
        Ok(())
    }

    fn keys(&self) -> AclResult<Vec<PermissionKey>> {
        let mut keys = Vec::new();
        for result in self.permissions_tree.iter().keys() {
            let raw = result?;
            match PermissionKey::from_storage_key(&raw) {
                Some(key) => keys.push(key),
                None => {
                    warn!("Skipping malformed permission key of {} bytes", raw.len());
                }
            }
        }
        Ok(keys)
    }
}

impl std::fmt::Debug for DbOperations {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DbOperations")
            .field("tree", &String::from_utf8_lossy(&self.permissions_tree.name()))
            .field("records", &self.permissions_tree.len())
            .finish()
    }
}
