//! Context-level role checks consumed by the object ACL.
//!
//! The object ACL never decides on its own who may create object permissions;
//! it asks a [`RoleAuthority`]. [`RoleRegistry`] is the bundled kernel-style
//! implementation, but any backend can be injected.

pub mod registry;

pub use registry::{RoleRegistry, CREATE_PERMISSIONS_ROLE};

use crate::types::{Entity, Role};

/// Answers whether `entity` holds `role` within `context`
pub trait RoleAuthority: Send + Sync {
    fn has_role(&self, entity: &Entity, context: &Entity, role: &Role) -> bool;
}

impl<F> RoleAuthority for F
where
    F: Fn(&Entity, &Entity, &Role) -> bool + Send + Sync,
{
    fn has_role(&self, entity: &Entity, context: &Entity, role: &Role) -> bool {
        self(entity, context, role)
    }
}
