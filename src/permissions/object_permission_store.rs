use super::backend::{MemoryBackend, PermissionBackend};
use super::types::ObjectPermission;
use crate::error::{AclError, AclResult};
use crate::message_bus::{AclEvent, ChangeObjectPermissionManager, SetObjectPermission, UnsetObjectPermission};
use crate::types::{Entity, ObjectId, PermissionKey, Role};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

/// What `create` does when the (object, role) permission already exists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecreatePolicy {
    /// Replace the manager and add the grantee, keeping existing grants
    #[default]
    Overwrite,
    /// Fail with [`AclError::PermissionExists`]
    Reject,
}

/// Object-scoped permission registry with manager-gated mutation.
///
/// Mutations compute the complete new record before writing it, so a failed
/// call never leaves a partial update behind. Each successful mutation returns
/// the events describing it; publishing them is up to the caller.
pub struct ObjectPermissionStore {
    backend: Box<dyn PermissionBackend>,
    recreate_policy: RecreatePolicy,
}

impl ObjectPermissionStore {
    pub fn new(backend: Box<dyn PermissionBackend>, recreate_policy: RecreatePolicy) -> Self {
        Self {
            backend,
            recreate_policy,
        }
    }

    /// A store backed by process memory with the default re-create policy
    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryBackend::new()), RecreatePolicy::default())
    }

    pub fn recreate_policy(&self) -> RecreatePolicy {
        self.recreate_policy
    }

    /// Establishes `manager` for (object, role) and grants it to `grantee`.
    ///
    /// Administrative standing of the caller is checked by the ACL, not here.
    pub fn create(&mut self, grantee: Entity, object: ObjectId, role: Role, manager: Entity) -> AclResult<Vec<AclEvent>> {
        if manager.is_zero() {
            return Err(AclError::InvalidManager(manager));
        }
        let key = PermissionKey::new(object, role);
        let mut record = match self.backend.load(&key)? {
            None => ObjectPermission::new(manager),
            Some(_) if self.recreate_policy == RecreatePolicy::Reject => {
                warn!("Rejected re-creation of object permission {}", key);
                return Err(AclError::PermissionExists { object, role });
            }
            Some(mut existing) => {
                info!("Re-creating object permission {}; manager {} -> {}", key, existing.manager, manager);
                existing.manager = manager;
                existing
            }
        };
        record.grant(grantee);
        self.backend.save(&key, &record)?;

        info!("Created object permission {} for {} managed by {}", key, grantee, manager);
        Ok(vec![
            SetObjectPermission::new(grantee, object, role).into(),
            ChangeObjectPermissionManager::new(object, role, manager).into(),
        ])
    }

    /// Grants (object, role) to `entity`; `acting` must be the current manager
    pub fn grant(&mut self, entity: Entity, object: ObjectId, role: Role, acting: Entity) -> AclResult<AclEvent> {
        let key = PermissionKey::new(object, role);
        let mut record = self.managed_record(&key, acting)?;
        if record.grant(entity) {
            self.backend.save(&key, &record)?;
        }
        debug!("{} granted {} to {}", acting, key, entity);
        Ok(SetObjectPermission::new(entity, object, role).into())
    }

    /// Revokes (object, role) from `entity`; `acting` must be the current manager
    pub fn revoke(&mut self, entity: Entity, object: ObjectId, role: Role, acting: Entity) -> AclResult<AclEvent> {
        let key = PermissionKey::new(object, role);
        let mut record = self.managed_record(&key, acting)?;
        if record.revoke(&entity) {
            self.backend.save(&key, &record)?;
        }
        debug!("{} revoked {} from {}", acting, key, entity);
        Ok(UnsetObjectPermission::new(entity, object, role).into())
    }

    /// Replaces the manager of (object, role); `acting` must be the current manager
    pub fn set_manager(&mut self, new_manager: Entity, object: ObjectId, role: Role, acting: Entity) -> AclResult<AclEvent> {
        if new_manager.is_zero() {
            return Err(AclError::InvalidManager(new_manager));
        }
        let key = PermissionKey::new(object, role);
        let mut record = self.managed_record(&key, acting)?;
        record.manager = new_manager;
        self.backend.save(&key, &record)?;
        info!("Manager of object permission {} changed from {} to {}", key, acting, new_manager);
        Ok(ChangeObjectPermissionManager::new(object, role, new_manager).into())
    }

    /// False for pairs that were never created
    pub fn has(&self, entity: &Entity, object: ObjectId, role: Role) -> AclResult<bool> {
        let key = PermissionKey::new(object, role);
        Ok(self.backend.load(&key)?.is_some_and(|record| record.has(entity)))
    }

    pub fn manager(&self, object: ObjectId, role: Role) -> AclResult<Option<Entity>> {
        let key = PermissionKey::new(object, role);
        Ok(self.backend.load(&key)?.map(|record| record.manager))
    }

    /// Holders of (object, role) in ascending order
    pub fn grantees(&self, object: ObjectId, role: Role) -> AclResult<Vec<Entity>> {
        let key = PermissionKey::new(object, role);
        Ok(self
            .backend
            .load(&key)?
            .map(|record| record.grants.into_iter().collect())
            .unwrap_or_default())
    }

    /// Every (object, role) pair that has been created
    pub fn permission_keys(&self) -> AclResult<Vec<PermissionKey>> {
        self.backend.keys()
    }

    fn managed_record(&self, key: &PermissionKey, acting: Entity) -> AclResult<ObjectPermission> {
        match self.backend.load(key)? {
            Some(record) if record.is_managed_by(&acting) => Ok(record),
            Some(_) => {
                warn!("{} is not the manager of object permission {}", acting, key);
                Err(AclError::unauthorized(acting, format!("is not the manager of object permission {}", key)))
            }
            None => {
                warn!("{} tried to change object permission {} which has no manager", acting, key);
                Err(AclError::unauthorized(acting, format!("object permission {} has no manager", key)))
            }
        }
    }
}
