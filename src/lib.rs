//! # ObjectACL
//!
//! An object-scoped permission registry layered on top of a role-based access
//! control substrate.
//!
//! A sender holding the admin role (checked through a [`RoleAuthority`]) creates
//! an object permission for an (object, role) pair, naming its manager and a
//! first holder. From then on only that manager may grant, revoke or hand over
//! the permission, and anyone may ask who holds it. Every successful mutation is
//! announced on a [`MessageBus`].
//!
//! ```rust
//! use std::sync::Arc;
//! use objectacl::{Entity, MessageBus, ObjectAcl, ObjectId, ObjectPermissionStore, Role, RoleRegistry};
//!
//! let root = Entity::from_low_u64(1);
//! let holder = Entity::from_low_u64(2);
//! let app = Entity::from_low_u64(0x0b1);
//!
//! let registry = Arc::new(RoleRegistry::new(Entity::from_low_u64(0xac1)));
//! registry.initialize(root).unwrap();
//!
//! let acl = ObjectAcl::new(app, registry.clone(), ObjectPermissionStore::in_memory(), Arc::new(MessageBus::new()));
//! registry
//!     .create_permission(root, root, app, acl.objectacl_admin_role(), root)
//!     .unwrap();
//! acl.initialize().unwrap();
//!
//! acl.create_object_permission(root, holder, ObjectId(1), Role::from(1), root).unwrap();
//! assert!(acl.has_object_permission(&holder, ObjectId(1), Role::from(1)));
//! assert!(acl.grant_object_permission(holder, holder, ObjectId(1), Role::from(1)).is_err());
//! ```

pub mod config;
pub mod db_operations;
pub mod error;
pub mod message_bus;
pub mod permissions;
pub mod roles;
pub mod types;

pub use config::{AclConfig, ConfigError, StorageConfig};
pub use db_operations::DbOperations;
pub use error::{AclError, AclResult};
pub use message_bus::{AclEvent, MessageBus};
pub use permissions::{ObjectAcl, ObjectPermission, ObjectPermissionStore, PermissionBackend, RecreatePolicy};
pub use roles::{RoleAuthority, RoleRegistry};
pub use types::{Entity, ObjectId, PermissionKey, Role};
