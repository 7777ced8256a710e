//! Event type definitions and unified AclEvent enum
use crate::types::{Entity, ObjectId, Role};
use serde::{Deserialize, Serialize};

/// Trait for types that can be used as events in the message bus
pub trait EventType: Clone + Send + 'static {
    /// Get the unique type identifier for this event type
    fn type_id() -> &'static str;
}

/// The manager of an object permission was established or replaced
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChangeObjectPermissionManager {
    pub object: ObjectId,
    pub role: Role,
    pub manager: Entity,
}

impl ChangeObjectPermissionManager {
    pub fn new(object: ObjectId, role: Role, manager: Entity) -> Self {
        Self {
            object,
            role,
            manager,
        }
    }
}

impl EventType for ChangeObjectPermissionManager {
    fn type_id() -> &'static str {
        "ChangeObjectPermissionManager"
    }
}

/// An entity was granted an object permission
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SetObjectPermission {
    pub entity: Entity,
    pub object: ObjectId,
    pub role: Role,
}

impl SetObjectPermission {
    pub fn new(entity: Entity, object: ObjectId, role: Role) -> Self {
        Self {
            entity,
            object,
            role,
        }
    }
}

impl EventType for SetObjectPermission {
    fn type_id() -> &'static str {
        "SetObjectPermission"
    }
}

/// An object permission was revoked from an entity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UnsetObjectPermission {
    pub entity: Entity,
    pub object: ObjectId,
    pub role: Role,
}

impl UnsetObjectPermission {
    pub fn new(entity: Entity, object: ObjectId, role: Role) -> Self {
        Self {
            entity,
            object,
            role,
        }
    }
}

impl EventType for UnsetObjectPermission {
    fn type_id() -> &'static str {
        "UnsetObjectPermission"
    }
}

/// A context-level role was granted or revoked in the role registry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SetPermission {
    pub entity: Entity,
    pub context: Entity,
    pub role: Role,
    pub allowed: bool,
}

impl EventType for SetPermission {
    fn type_id() -> &'static str {
        "SetPermission"
    }
}

/// The manager of a context-level role changed in the role registry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChangePermissionManager {
    pub context: Entity,
    pub role: Role,
    pub manager: Entity,
}

impl EventType for ChangePermissionManager {
    fn type_id() -> &'static str {
        "ChangePermissionManager"
    }
}

/// Unified event enumeration that encompasses all event types
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum AclEvent {
    // Object ACL events
    ChangeObjectPermissionManager(ChangeObjectPermissionManager),
    SetObjectPermission(SetObjectPermission),
    UnsetObjectPermission(UnsetObjectPermission),
    // Role registry events
    SetPermission(SetPermission),
    ChangePermissionManager(ChangePermissionManager),
}

impl AclEvent {
    /// Get the event type as a string identifier
    pub fn event_type(&self) -> &'static str {
        match self {
            AclEvent::ChangeObjectPermissionManager(_) => ChangeObjectPermissionManager::type_id(),
            AclEvent::SetObjectPermission(_) => SetObjectPermission::type_id(),
            AclEvent::UnsetObjectPermission(_) => UnsetObjectPermission::type_id(),
            AclEvent::SetPermission(_) => SetPermission::type_id(),
            AclEvent::ChangePermissionManager(_) => ChangePermissionManager::type_id(),
        }
    }
}

impl EventType for AclEvent {
    fn type_id() -> &'static str {
        "AclEvent"
    }
}

impl From<ChangeObjectPermissionManager> for AclEvent {
    fn from(event: ChangeObjectPermissionManager) -> Self {
        AclEvent::ChangeObjectPermissionManager(event)
    }
}

impl From<SetObjectPermission> for AclEvent {
    fn from(event: SetObjectPermission) -> Self {
        AclEvent::SetObjectPermission(event)
    }
}

impl From<UnsetObjectPermission> for AclEvent {
    fn from(event: UnsetObjectPermission) -> Self {
        AclEvent::UnsetObjectPermission(event)
    }
}

impl From<SetPermission> for AclEvent {
    fn from(event: SetPermission) -> Self {
        AclEvent::SetPermission(event)
    }
}

impl From<ChangePermissionManager> for AclEvent {
    fn from(event: ChangePermissionManager) -> Self {
        AclEvent::ChangePermissionManager(event)
    }
}
