use super::backend::{MemoryBackend, PermissionBackend};
use super::object_permission_store::ObjectPermissionStore;
use crate::config::{AclConfig, StorageConfig, DEFAULT_ADMIN_ROLE};
use crate::db_operations::DbOperations;
use crate::error::{AclError, AclResult};
use crate::message_bus::{AclEvent, MessageBus};
use crate::roles::RoleAuthority;
use crate::types::{Entity, ObjectId, PermissionKey, Role};
use log::{debug, error, info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Object-scoped access control list.
///
/// Creating an object permission requires the admin role within this ACL's
/// context, as reported by the injected [`RoleAuthority`]. Afterwards only the
/// recorded manager of an (object, role) pair may grant, revoke or hand over
/// that permission. Queries need no capability.
///
/// Mutations hold the store's write lock until their events are published, so
/// listeners observe events in commit order.
pub struct ObjectAcl {
    /// Context identity the admin role is checked against
    app: Entity,
    admin_role: Role,
    authority: Arc<dyn RoleAuthority>,
    store: RwLock<ObjectPermissionStore>,
    message_bus: Arc<MessageBus>,
    initialized: AtomicBool,
}

impl ObjectAcl {
    pub fn new(
        app: Entity,
        authority: Arc<dyn RoleAuthority>,
        store: ObjectPermissionStore,
        message_bus: Arc<MessageBus>,
    ) -> Self {
        Self {
            app,
            admin_role: Role::from_name(DEFAULT_ADMIN_ROLE),
            authority,
            store: RwLock::new(store),
            message_bus,
            initialized: AtomicBool::new(false),
        }
    }

    /// Builds the ACL described by `config`, opening sled storage when configured
    pub fn from_config(app: Entity, authority: Arc<dyn RoleAuthority>, config: &AclConfig) -> AclResult<Self> {
        config.validate()?;
        let backend: Box<dyn PermissionBackend> = match &config.storage {
            StorageConfig::Memory => Box::new(MemoryBackend::new()),
            StorageConfig::Sled { path, tree } => Box::new(DbOperations::open(path, tree)?),
        };
        let store = ObjectPermissionStore::new(backend, config.recreate_policy);
        let message_bus = Arc::new(MessageBus::with_history_limit(config.history_limit));

        Ok(Self::new(app, authority, store, message_bus).with_admin_role(config.admin_role_id()))
    }

    /// Replaces the role checked by [`ObjectAcl::create_object_permission`]
    pub fn with_admin_role(mut self, admin_role: Role) -> Self {
        self.admin_role = admin_role;
        self
    }

    pub fn app(&self) -> Entity {
        self.app
    }

    /// The role a sender needs on [`ObjectAcl::app`] to create object permissions
    pub fn objectacl_admin_role(&self) -> Role {
        self.admin_role
    }

    pub fn message_bus(&self) -> Arc<MessageBus> {
        Arc::clone(&self.message_bus)
    }

    /// One-time activation; mutations fail until this has run
    pub fn initialize(&self) -> AclResult<()> {
        self.initialized
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map_err(|_| AclError::AlreadyInitialized)?;
        info!("Object ACL {} initialized", self.app);
        Ok(())
    }

    pub fn has_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    /// Creates the (object, role) permission with `manager` as its manager and
    /// grants it to `grantee`. Requires the admin role.
    pub fn create_object_permission(
        &self,
        sender: Entity,
        grantee: Entity,
        object: ObjectId,
        role: Role,
        manager: Entity,
    ) -> AclResult<()> {
        self.require_initialized()?;
        if !self.authority.has_role(&sender, &self.app, &self.admin_role) {
            warn!("{} lacks the object ACL admin role on {}", sender, self.app);
            return Err(AclError::unauthorized(sender, "lacks the object ACL admin role"));
        }

        let mut store = self.write_store()?;
        let events = store.create(grantee, object, role, manager)?;
        self.publish(events);
        Ok(())
    }

    pub fn grant_object_permission(&self, sender: Entity, entity: Entity, object: ObjectId, role: Role) -> AclResult<()> {
        self.require_initialized()?;
        let mut store = self.write_store()?;
        let event = store.grant(entity, object, role, sender)?;
        self.publish(vec![event]);
        Ok(())
    }

    pub fn revoke_object_permission(&self, sender: Entity, entity: Entity, object: ObjectId, role: Role) -> AclResult<()> {
        self.require_initialized()?;
        let mut store = self.write_store()?;
        let event = store.revoke(entity, object, role, sender)?;
        self.publish(vec![event]);
        Ok(())
    }

    /// Hands management of (object, role) to `new_manager`; `sender` must be the current manager
    pub fn set_object_permission_manager(
        &self,
        sender: Entity,
        new_manager: Entity,
        object: ObjectId,
        role: Role,
    ) -> AclResult<()> {
        self.require_initialized()?;
        let mut store = self.write_store()?;
        let event = store.set_manager(new_manager, object, role, sender)?;
        self.publish(vec![event]);
        Ok(())
    }

    /// Whether `entity` holds (object, role). Storage failures deny.
    pub fn has_object_permission(&self, entity: &Entity, object: ObjectId, role: Role) -> bool {
        self.read_store()
            .and_then(|store| store.has(entity, object, role))
            .unwrap_or_else(|e| {
                error!("Object permission lookup for {} on {}/{} failed: {}", entity, object, role, e);
                false
            })
    }

    pub fn get_object_permission_manager(&self, object: ObjectId, role: Role) -> Option<Entity> {
        self.read_store()
            .and_then(|store| store.manager(object, role))
            .unwrap_or_else(|e| {
                error!("Object permission manager lookup for {}/{} failed: {}", object, role, e);
                None
            })
    }

    pub fn object_permission_holders(&self, object: ObjectId, role: Role) -> AclResult<Vec<Entity>> {
        self.read_store()?.grantees(object, role)
    }

    /// Every (object, role) pair created so far
    pub fn object_permissions(&self) -> AclResult<Vec<PermissionKey>> {
        self.read_store()?.permission_keys()
    }

    fn require_initialized(&self) -> AclResult<()> {
        if self.has_initialized() {
            Ok(())
        } else {
            Err(AclError::NotInitialized)
        }
    }

    fn read_store(&self) -> AclResult<RwLockReadGuard<'_, ObjectPermissionStore>> {
        self.store.read().map_err(|_| AclError::LockPoisoned)
    }

    fn write_store(&self) -> AclResult<RwLockWriteGuard<'_, ObjectPermissionStore>> {
        self.store.write().map_err(|_| AclError::LockPoisoned)
    }

    fn publish(&self, events: Vec<AclEvent>) {
        for event in events {
            let event_type = event.event_type();
            let delivered = self.message_bus.publish_event(event);
            debug!("Published {} event to {} consumers", event_type, delivered);
        }
    }
}
