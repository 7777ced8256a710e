use crate::config::ConfigError;
use crate::types::{Entity, ObjectId, Role};
use thiserror::Error;

/// Unified error type for the object ACL.
///
/// Every mutating operation either succeeds completely or returns one of these
/// variants without touching stored state.
#[derive(Debug, Error)]
pub enum AclError {
    /// The sender lacks the capability required by the operation
    #[error("Unauthorized: {sender} {reason}")]
    Unauthorized { sender: Entity, reason: String },

    /// Re-creating an existing object permission is rejected by policy
    #[error("Object permission already exists for object {object} and role {role}")]
    PermissionExists { object: ObjectId, role: Role },

    /// A context role already has a manager in the role registry
    #[error("Permission manager already set for context {context} and role {role}")]
    ManagerExists { context: Entity, role: Role },

    /// The zero entity cannot manage a permission
    #[error("Invalid permission manager: {0}")]
    InvalidManager(Entity),

    #[error("Access control list has not been initialized")]
    NotInitialized,

    #[error("Access control list has already been initialized")]
    AlreadyInitialized,

    #[error("Invalid entity: {0}")]
    InvalidEntity(String),

    #[error("Invalid role: {0}")]
    InvalidRole(String),

    #[error("Database error: {0}")]
    Storage(#[from] sled::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A previous holder of the store lock panicked mid-update
    #[error("Permission store lock poisoned")]
    LockPoisoned,
}

impl AclError {
    /// Create an authorization failure for `sender`
    pub fn unauthorized<S: Into<String>>(sender: Entity, reason: S) -> Self {
        Self::Unauthorized {
            sender,
            reason: reason.into(),
        }
    }

    /// True when the error is an authorization failure
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }
}

// Type alias for convenience
pub type AclResult<T> = Result<T, AclError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthorized_display() {
        let sender = Entity::from_low_u64(7);
        let err = AclError::unauthorized(sender, "is not the permission manager");
        assert!(err.is_unauthorized());
        assert_eq!(
            err.to_string(),
            "Unauthorized: 0x0000000000000000000000000000000000000007 is not the permission manager"
        );
    }

    #[test]
    fn test_sled_error_conversion() {
        let err: AclError = sled::Error::Unsupported("nope".to_string()).into();
        assert!(matches!(err, AclError::Storage(_)));
        assert!(!err.is_unauthorized());
    }
}
