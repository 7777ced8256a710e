// permissions module

pub mod backend;
pub mod object_acl;
pub mod object_permission_store;
pub mod types;

pub use backend::{MemoryBackend, PermissionBackend};
pub use object_acl::ObjectAcl;
pub use object_permission_store::{ObjectPermissionStore, RecreatePolicy};
pub use types::ObjectPermission;
