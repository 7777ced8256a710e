pub mod object_permission;

pub use object_permission::ObjectPermission;
