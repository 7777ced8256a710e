//! Object ACL configuration
//!
//! Configuration is read from TOML. Every field has a default, so an empty
//! document yields an in-memory ACL using the `OBJECTACL_ADMIN_ROLE` admin role
//! and the overwrite re-create policy.
//!
//! ```toml
//! admin_role = "OBJECTACL_ADMIN_ROLE"
//! recreate_policy = "reject"
//! history_limit = 256
//!
//! [storage]
//! type = "sled"
//! path = "/var/lib/objectacl"
//! tree = "object_permissions"
//! ```

pub mod error;

pub use error::{ConfigError, ConfigResult};

use crate::permissions::RecreatePolicy;
use crate::types::Role;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Role name checked before object permissions may be created
pub const DEFAULT_ADMIN_ROLE: &str = "OBJECTACL_ADMIN_ROLE";

/// Sled tree holding object permission records
pub const DEFAULT_PERMISSIONS_TREE: &str = "object_permissions";

/// Where object permission records live
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StorageConfig {
    /// Records live for the lifetime of the ACL instance
    #[default]
    Memory,
    /// Records persist in a sled database
    Sled {
        path: PathBuf,
        #[serde(default = "default_tree")]
        tree: String,
    },
}

fn default_tree() -> String {
    DEFAULT_PERMISSIONS_TREE.to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AclConfig {
    /// Name of the role a sender needs to create object permissions
    pub admin_role: String,
    pub recreate_policy: RecreatePolicy,
    /// Unified events retained by the message bus history
    pub history_limit: usize,
    pub storage: StorageConfig,
}

impl Default for AclConfig {
    fn default() -> Self {
        Self {
            admin_role: DEFAULT_ADMIN_ROLE.to_string(),
            recreate_policy: RecreatePolicy::default(),
            history_limit: crate::message_bus::DEFAULT_HISTORY_LIMIT,
            storage: StorageConfig::default(),
        }
    }
}

impl AclConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file
    pub fn load(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            return Err(ConfigError::not_found(path.display().to_string()));
        }
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn to_toml_string(&self) -> ConfigResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Write the configuration to `path`, creating parent directories
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        self.validate()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_toml_string()?)?;
        Ok(())
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.admin_role.trim().is_empty() {
            return Err(ConfigError::validation("admin_role must not be empty"));
        }
        if let StorageConfig::Sled { path, tree } = &self.storage {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::validation("storage.path must not be empty"));
            }
            if tree.trim().is_empty() {
                return Err(ConfigError::validation("storage.tree must not be empty"));
            }
        }
        Ok(())
    }

    /// The role identifier derived from `admin_role`
    pub fn admin_role_id(&self) -> Role {
        Role::from_name(&self.admin_role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = AclConfig::from_toml_str("").unwrap();
        assert_eq!(config, AclConfig::default());
        assert_eq!(config.storage, StorageConfig::Memory);
        assert_eq!(config.recreate_policy, RecreatePolicy::Overwrite);
        assert_eq!(config.admin_role_id(), Role::from_name(DEFAULT_ADMIN_ROLE));
    }

    #[test]
    fn test_parse_sled_storage() {
        let config = AclConfig::from_toml_str(
            r#"
            recreate_policy = "reject"
            history_limit = 16

            [storage]
            type = "sled"
            path = "/tmp/acl"
            "#,
        )
        .unwrap();

        assert_eq!(config.recreate_policy, RecreatePolicy::Reject);
        assert_eq!(config.history_limit, 16);
        assert_eq!(
            config.storage,
            StorageConfig::Sled {
                path: PathBuf::from("/tmp/acl"),
                tree: DEFAULT_PERMISSIONS_TREE.to_string(),
            }
        );
    }

    #[test]
    fn test_validation_rejects_empty_values() {
        let err = AclConfig::from_toml_str("admin_role = \"  \"").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));

        let err = AclConfig::from_toml_str(
            "[storage]\ntype = \"sled\"\npath = \"/tmp/acl\"\ntree = \"\"\n",
        )
        .unwrap_err();
        assert!(err.user_message().contains("storage.tree"));
    }

    #[test]
    fn test_unknown_policy_is_a_parse_error() {
        let err = AclConfig::from_toml_str("recreate_policy = \"sometimes\"").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("acl.toml");
        let config = AclConfig {
            admin_role: "CUSTOM_ADMIN_ROLE".to_string(),
            recreate_policy: RecreatePolicy::Reject,
            history_limit: 8,
            storage: StorageConfig::Sled {
                path: dir.path().join("db"),
                tree: "perms".to_string(),
            },
        };

        config.save(&path).unwrap();
        assert_eq!(AclConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempdir().unwrap();
        let err = AclConfig::load(&dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }
}
