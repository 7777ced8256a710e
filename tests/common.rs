//! Shared fixture mirroring a freshly deployed organization: a kernel role
//! registry bootstrapped by `root`, and an object ACL whose admin role is
//! held by `root`.

#![allow(dead_code)]

use objectacl::{Entity, MessageBus, ObjectAcl, ObjectPermissionStore, Role, RoleRegistry};
use std::sync::Arc;

pub const DUMMY_ROLE: u64 = 1;

pub fn dummy_role() -> Role {
    Role::from(DUMMY_ROLE)
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub struct AclFixture {
    pub registry: Arc<RoleRegistry>,
    pub kernel: Entity,
    pub acl: ObjectAcl,
    pub message_bus: Arc<MessageBus>,
    pub root: Entity,
    pub holder: Entity,
    pub account3: Entity,
}

impl AclFixture {
    pub fn new() -> Self {
        Self::with_store(ObjectPermissionStore::in_memory())
    }

    pub fn with_store(store: ObjectPermissionStore) -> Self {
        init_logging();

        let root = Entity::random();
        let holder = Entity::random();
        let account3 = Entity::random();
        let kernel = Entity::random();
        let app = Entity::random();

        let message_bus = Arc::new(MessageBus::new());
        let registry = Arc::new(RoleRegistry::with_message_bus(
            Entity::random(),
            Arc::clone(&message_bus),
        ));
        registry.initialize(root).unwrap();

        let app_manager_role = Role::from_name("APP_MANAGER_ROLE");
        registry
            .create_permission(root, holder, kernel, app_manager_role, holder)
            .unwrap();

        let acl = ObjectAcl::new(
            app,
            registry.clone(),
            store,
            Arc::clone(&message_bus),
        );

        registry
            .create_permission(root, root, app, acl.objectacl_admin_role(), root)
            .unwrap();
        registry
            .grant_permission(root, root, app, acl.objectacl_admin_role())
            .unwrap();

        acl.initialize().unwrap();

        registry
            .grant_permission(
                root,
                app,
                registry.entity(),
                RoleRegistry::create_permissions_role(),
            )
            .unwrap();

        message_bus.clear_history();

        Self {
            registry,
            kernel,
            acl,
            message_bus,
            root,
            holder,
            account3,
        }
    }
}
