mod common;

use common::{dummy_role, init_logging};
use objectacl::{
    AclConfig, AclError, DbOperations, Entity, ObjectAcl, ObjectId, ObjectPermissionStore,
    RecreatePolicy, Role, RoleAuthority, StorageConfig,
};
use std::sync::Arc;
use tempfile::TempDir;

/// Grants the admin role to a single entity
fn admin_only(admin: Entity) -> Arc<dyn RoleAuthority> {
    let admin_role = Role::from_name("OBJECTACL_ADMIN_ROLE");
    Arc::new(move |entity: &Entity, _: &Entity, role: &Role| *entity == admin && *role == admin_role)
}

fn sled_config(dir: &TempDir, recreate_policy: RecreatePolicy) -> AclConfig {
    AclConfig {
        recreate_policy,
        storage: StorageConfig::Sled {
            path: dir.path().join("acl_db"),
            tree: "object_permissions".to_string(),
        },
        ..AclConfig::default()
    }
}

#[test]
fn test_permissions_persist_across_reopen() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let app = Entity::from_low_u64(0x0b1);
    let root = Entity::from_low_u64(1);
    let holder = Entity::from_low_u64(2);
    let config = sled_config(&dir, RecreatePolicy::Overwrite);

    {
        let acl = ObjectAcl::from_config(app, admin_only(root), &config).unwrap();
        acl.initialize().unwrap();
        acl.create_object_permission(root, holder, ObjectId(1), dummy_role(), root)
            .unwrap();
        acl.set_object_permission_manager(root, holder, ObjectId(1), dummy_role())
            .unwrap();
    }

    let acl = ObjectAcl::from_config(app, admin_only(root), &config).unwrap();
    acl.initialize().unwrap();
    assert!(acl.has_object_permission(&holder, ObjectId(1), dummy_role()));
    assert_eq!(acl.get_object_permission_manager(ObjectId(1), dummy_role()), Some(holder));

    // The reopened ACL enforces the persisted manager
    assert!(acl
        .revoke_object_permission(root, holder, ObjectId(1), dummy_role())
        .unwrap_err()
        .is_unauthorized());
    acl.revoke_object_permission(holder, holder, ObjectId(1), dummy_role())
        .unwrap();
    assert!(!acl.has_object_permission(&holder, ObjectId(1), dummy_role()));
}

#[test]
fn test_reject_policy_with_sled_backend() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let root = Entity::from_low_u64(1);
    let config = sled_config(&dir, RecreatePolicy::Reject);
    let acl = ObjectAcl::from_config(Entity::from_low_u64(0x0b1), admin_only(root), &config).unwrap();
    acl.initialize().unwrap();

    acl.create_object_permission(root, root, ObjectId(3), dummy_role(), root)
        .unwrap();
    let history = acl.message_bus().history();
    let err = acl
        .create_object_permission(root, Entity::from_low_u64(9), ObjectId(3), dummy_role(), root)
        .unwrap_err();

    assert!(matches!(err, AclError::PermissionExists { .. }));
    assert_eq!(acl.message_bus().history(), history);
    assert_eq!(acl.object_permission_holders(ObjectId(3), dummy_role()).unwrap(), vec![root]);
}

#[test]
fn test_store_over_explicit_db_operations() {
    init_logging();
    let db = sled::Config::new().temporary(true).open().unwrap();
    let ops = DbOperations::new(db, "object_permissions").unwrap();
    let mut store = ObjectPermissionStore::new(Box::new(ops.clone()), RecreatePolicy::Overwrite);
    let root = Entity::from_low_u64(1);

    store.create(root, ObjectId(5), Role::from(2), root).unwrap();
    store.create(root, ObjectId(4), Role::from(2), root).unwrap();

    assert_eq!(ops.record_count(), 2);
    let objects: Vec<ObjectId> = store
        .permission_keys()
        .unwrap()
        .into_iter()
        .map(|key| key.object)
        .collect();
    assert_eq!(objects, vec![ObjectId(4), ObjectId(5)]);
}

#[test]
fn test_invalid_config_is_rejected() {
    let config = AclConfig {
        storage: StorageConfig::Sled {
            path: "".into(),
            tree: "object_permissions".to_string(),
        },
        ..AclConfig::default()
    };
    let result = ObjectAcl::from_config(Entity::from_low_u64(1), admin_only(Entity::from_low_u64(1)), &config);
    assert!(matches!(result, Err(AclError::Config(_))));
}
