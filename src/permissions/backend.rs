//! Storage seam for object permission records.

use super::types::ObjectPermission;
use crate::error::AclResult;
use crate::types::PermissionKey;
use std::collections::HashMap;

/// Keyed record storage used by the object permission store.
///
/// `save` replaces the whole record for a key in one write.
pub trait PermissionBackend: Send + Sync {
    fn load(&self, key: &PermissionKey) -> AclResult<Option<ObjectPermission>>;

    fn save(&mut self, key: &PermissionKey, record: &ObjectPermission) -> AclResult<()>;

    /// All keys with a record, in ascending order
    fn keys(&self) -> AclResult<Vec<PermissionKey>>;
}

/// Records kept for the lifetime of the process
#[derive(Debug, Default, Clone)]
pub struct MemoryBackend {
    records: HashMap<PermissionKey, ObjectPermission>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl PermissionBackend for MemoryBackend {
    fn load(&self, key: &PermissionKey) -> AclResult<Option<ObjectPermission>> {
        Ok(self.records.get(key).cloned())
    }

    fn save(&mut self, key: &PermissionKey, record: &ObjectPermission) -> AclResult<()> {
        self.records.insert(*key, record.clone());
        Ok(())
    }

    fn keys(&self) -> AclResult<Vec<PermissionKey>> {
        let mut keys: Vec<PermissionKey> = self.records.keys().copied().collect();
        keys.sort();
        Ok(keys)
    }
}
