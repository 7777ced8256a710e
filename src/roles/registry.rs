use super::RoleAuthority;
use crate::error::{AclError, AclResult};
use crate::message_bus::{AclEvent, ChangePermissionManager, MessageBus, SetPermission};
use crate::types::{Entity, Role};
use log::{debug, info, warn};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

/// Name of the role allowing an entity to create new context permissions
pub const CREATE_PERMISSIONS_ROLE: &str = "CREATE_PERMISSIONS_ROLE";

#[derive(Default)]
struct RegistryState {
    initialized: bool,
    /// (entity, context, role)
    grants: HashSet<(Entity, Entity, Role)>,
    /// (context, role) -> manager
    managers: HashMap<(Entity, Role), Entity>,
}

/// Kernel-style role registry mapping (entity, context, role) to a grant.
///
/// Each (context, role) permission has a manager; only that manager may grant,
/// revoke or hand over the permission. Creating a new permission requires
/// [`CREATE_PERMISSIONS_ROLE`] on the registry itself, which is bootstrapped by
/// [`RoleRegistry::initialize`].
pub struct RoleRegistry {
    /// Identity of the registry, the context of its own roles
    entity: Entity,
    state: Mutex<RegistryState>,
    message_bus: Option<Arc<MessageBus>>,
}

impl RoleRegistry {
    pub fn new(entity: Entity) -> Self {
        Self {
            entity,
            state: Mutex::new(RegistryState::default()),
            message_bus: None,
        }
    }

    /// Create a registry announcing its changes on `message_bus`
    pub fn with_message_bus(entity: Entity, message_bus: Arc<MessageBus>) -> Self {
        Self {
            message_bus: Some(message_bus),
            ..Self::new(entity)
        }
    }

    pub fn entity(&self) -> Entity {
        self.entity
    }

    pub fn create_permissions_role() -> Role {
        Role::from_name(CREATE_PERMISSIONS_ROLE)
    }

    fn lock(&self) -> AclResult<MutexGuard<'_, RegistryState>> {
        self.state.lock().map_err(|_| AclError::LockPoisoned)
    }

    /// Bootstraps the registry by giving `permissions_creator` the right to create permissions
    pub fn initialize(&self, permissions_creator: Entity) -> AclResult<()> {
        let mut events = Vec::new();
        {
            let mut state = self.lock()?;
            if state.initialized {
                return Err(AclError::AlreadyInitialized);
            }
            if permissions_creator.is_zero() {
                return Err(AclError::InvalidManager(permissions_creator));
            }
            state.initialized = true;
            let role = Self::create_permissions_role();
            Self::apply_create(&mut state, &mut events, permissions_creator, self.entity, role, permissions_creator);
        }
        info!("Role registry {} initialized by {}", self.entity, permissions_creator);
        self.emit(events);
        Ok(())
    }

    /// Creates the (context, role) permission, granting it to `entity` and
    /// making `manager` its manager. Fails if the permission already has a manager.
    pub fn create_permission(
        &self,
        sender: Entity,
        entity: Entity,
        context: Entity,
        role: Role,
        manager: Entity,
    ) -> AclResult<()> {
        let mut events = Vec::new();
        {
            let mut state = self.lock()?;
            if !state.initialized {
                return Err(AclError::NotInitialized);
            }
            let creator_role = Self::create_permissions_role();
            if !state.grants.contains(&(sender, self.entity, creator_role)) {
                warn!("{} attempted to create permission {} on {} without {}", sender, role, context, CREATE_PERMISSIONS_ROLE);
                return Err(AclError::unauthorized(sender, format!("lacks {}", CREATE_PERMISSIONS_ROLE)));
            }
            if state.managers.contains_key(&(context, role)) {
                return Err(AclError::ManagerExists { context, role });
            }
            if manager.is_zero() {
                return Err(AclError::InvalidManager(manager));
            }
            Self::apply_create(&mut state, &mut events, entity, context, role, manager);
        }
        info!("Created permission {} on {} for {} managed by {}", role, context, entity, manager);
        self.emit(events);
        Ok(())
    }

    pub fn grant_permission(&self, sender: Entity, entity: Entity, context: Entity, role: Role) -> AclResult<()> {
        let event = {
            let mut state = self.lock()?;
            Self::require_manager(&state, sender, context, role)?;
            state.grants.insert((entity, context, role));
            SetPermission {
                entity,
                context,
                role,
                allowed: true,
            }
        };
        debug!("Granted {} on {} to {}", role, context, entity);
        self.emit(vec![event.into()]);
        Ok(())
    }

    pub fn revoke_permission(&self, sender: Entity, entity: Entity, context: Entity, role: Role) -> AclResult<()> {
        let event = {
            let mut state = self.lock()?;
            Self::require_manager(&state, sender, context, role)?;
            state.grants.remove(&(entity, context, role));
            SetPermission {
                entity,
                context,
                role,
                allowed: false,
            }
        };
        debug!("Revoked {} on {} from {}", role, context, entity);
        self.emit(vec![event.into()]);
        Ok(())
    }

    /// Hands management of (context, role) to `new_manager`
    pub fn set_permission_manager(&self, sender: Entity, new_manager: Entity, context: Entity, role: Role) -> AclResult<()> {
        if new_manager.is_zero() {
            return Err(AclError::InvalidManager(new_manager));
        }
        let event = {
            let mut state = self.lock()?;
            Self::require_manager(&state, sender, context, role)?;
            state.managers.insert((context, role), new_manager);
            ChangePermissionManager {
                context,
                role,
                manager: new_manager,
            }
        };
        info!("Manager of {} on {} is now {}", role, context, new_manager);
        self.emit(vec![event.into()]);
        Ok(())
    }

    pub fn has_permission(&self, entity: &Entity, context: &Entity, role: &Role) -> bool {
        self.state
            .lock()
            .map(|state| state.grants.contains(&(*entity, *context, *role)))
            .unwrap_or(false)
    }

    pub fn get_permission_manager(&self, context: &Entity, role: &Role) -> Option<Entity> {
        self.state
            .lock()
            .ok()
            .and_then(|state| state.managers.get(&(*context, *role)).copied())
    }

    fn apply_create(
        state: &mut RegistryState,
        events: &mut Vec<AclEvent>,
        entity: Entity,
        context: Entity,
        role: Role,
        manager: Entity,
    ) {
        state.grants.insert((entity, context, role));
        state.managers.insert((context, role), manager);
        events.push(
            SetPermission {
                entity,
                context,
                role,
                allowed: true,
            }
            .into(),
        );
        events.push(ChangePermissionManager { context, role, manager }.into());
    }

    fn require_manager(state: &RegistryState, sender: Entity, context: Entity, role: Role) -> AclResult<()> {
        match state.managers.get(&(context, role)) {
            Some(manager) if *manager == sender => Ok(()),
            _ => {
                warn!("{} is not the manager of {} on {}", sender, role, context);
                Err(AclError::unauthorized(sender, format!("is not the manager of {} on {}", role, context)))
            }
        }
    }

    fn emit(&self, events: Vec<AclEvent>) {
        let Some(bus) = &self.message_bus else {
            return;
        };
        for event in events {
            bus.publish_event(event);
        }
    }
}

impl RoleAuthority for RoleRegistry {
    fn has_role(&self, entity: &Entity, context: &Entity, role: &Role) -> bool {
        self.has_permission(entity, context, role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (RoleRegistry, Entity) {
        let root = Entity::from_low_u64(1);
        let registry = RoleRegistry::new(Entity::from_low_u64(0xac1));
        registry.initialize(root).unwrap();
        (registry, root)
    }

    #[test]
    fn test_initialize_grants_create_permissions_role() {
        let (registry, root) = setup();
        let role = RoleRegistry::create_permissions_role();
        assert!(registry.has_permission(&root, &registry.entity(), &role));
        assert_eq!(registry.get_permission_manager(&registry.entity(), &role), Some(root));
        assert!(matches!(registry.initialize(root), Err(AclError::AlreadyInitialized)));
    }

    #[test]
    fn test_create_permission_requires_creator_role() {
        let (registry, root) = setup();
        let holder = Entity::from_low_u64(2);
        let app = Entity::from_low_u64(0xa99);
        let role = Role::from_name("APP_MANAGER_ROLE");

        let err = registry.create_permission(holder, holder, app, role, holder).unwrap_err();
        assert!(err.is_unauthorized());

        registry.create_permission(root, holder, app, role, holder).unwrap();
        assert!(registry.has_role(&holder, &app, &role));
        assert!(!registry.has_role(&root, &app, &role));

        let err = registry.create_permission(root, root, app, role, root).unwrap_err();
        assert!(matches!(err, AclError::ManagerExists { .. }));
    }

    #[test]
    fn test_only_manager_grants_and_revokes() {
        let (registry, root) = setup();
        let other = Entity::from_low_u64(3);
        let app = Entity::from_low_u64(0xa99);
        let role = Role::from(7);
        registry.create_permission(root, root, app, role, root).unwrap();

        assert!(registry.grant_permission(other, other, app, role).unwrap_err().is_unauthorized());
        registry.grant_permission(root, other, app, role).unwrap();
        assert!(registry.has_permission(&other, &app, &role));

        assert!(registry.revoke_permission(other, root, app, role).unwrap_err().is_unauthorized());
        registry.revoke_permission(root, other, app, role).unwrap();
        assert!(!registry.has_permission(&other, &app, &role));
    }

    #[test]
    fn test_set_permission_manager_hands_over_control() {
        let (registry, root) = setup();
        let next = Entity::from_low_u64(4);
        let app = Entity::from_low_u64(0xa99);
        let role = Role::from(8);
        registry.create_permission(root, root, app, role, root).unwrap();

        registry.set_permission_manager(root, next, app, role).unwrap();
        assert_eq!(registry.get_permission_manager(&app, &role), Some(next));
        assert!(registry.grant_permission(root, root, app, role).unwrap_err().is_unauthorized());
        registry.grant_permission(next, next, app, role).unwrap();
    }

    #[test]
    fn test_create_before_initialize_fails() {
        let registry = RoleRegistry::new(Entity::from_low_u64(0xac1));
        let root = Entity::from_low_u64(1);
        let err = registry
            .create_permission(root, root, Entity::from_low_u64(9), Role::from(1), root)
            .unwrap_err();
        assert!(matches!(err, AclError::NotInitialized));
    }

    #[test]
    fn test_events_published_on_bus() {
        let bus = Arc::new(MessageBus::new());
        let registry = RoleRegistry::with_message_bus(Entity::from_low_u64(0xac1), Arc::clone(&bus));
        let mut consumer = bus.subscribe::<SetPermission>();
        let root = Entity::from_low_u64(1);

        registry.initialize(root).unwrap();

        let event = consumer.try_recv().unwrap();
        assert_eq!(event.entity, root);
        assert!(event.allowed);
        assert_eq!(bus.history_of("ChangePermissionManager").len(), 1);
    }
}
