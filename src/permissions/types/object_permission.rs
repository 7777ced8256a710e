use crate::types::Entity;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Stored state of one (object, role) permission.
///
/// Manager and grants live in a single record so that any mutation is written
/// as one unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectPermission {
    pub manager: Entity,
    pub grants: BTreeSet<Entity>,
}

impl ObjectPermission {
    pub fn new(manager: Entity) -> Self {
        Self {
            manager,
            grants: BTreeSet::new(),
        }
    }

    pub fn is_managed_by(&self, entity: &Entity) -> bool {
        self.manager == *entity
    }

    pub fn has(&self, entity: &Entity) -> bool {
        self.grants.contains(entity)
    }

    /// Returns false when the entity already held the permission
    pub fn grant(&mut self, entity: Entity) -> bool {
        self.grants.insert(entity)
    }

    /// Returns false when the entity did not hold the permission
    pub fn revoke(&mut self, entity: &Entity) -> bool {
        self.grants.remove(entity)
    }
}
