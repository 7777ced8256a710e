//! Identity and key types shared by the role registry and the object ACL.
//!
//! None of these types interpret their contents: an [`Entity`] is an opaque
//! 20-byte address, a [`Role`] an opaque 32-byte identifier and an
//! [`ObjectId`] an opaque numeric handle. Entities and roles are rendered as
//! `0x`-prefixed lowercase hex, which is also their serialized form.

use crate::error::AclError;
use rand::RngCore;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

/// Length in bytes of an [`Entity`]
pub const ENTITY_LEN: usize = 20;

/// Length in bytes of a [`Role`]
pub const ROLE_LEN: usize = 32;

/// Length in bytes of a [`PermissionKey`] storage key
pub const PERMISSION_KEY_LEN: usize = 8 + ROLE_LEN;

fn decode_hex<const N: usize>(s: &str) -> Result<[u8; N], String> {
    let digits = s.strip_prefix("0x").unwrap_or(s);
    let bytes = hex::decode(digits).map_err(|e| format!("{s}: {e}"))?;
    bytes
        .try_into()
        .map_err(|b: Vec<u8>| format!("{}: expected {} bytes, found {}", s, N, b.len()))
}

/// Opaque identity participating in permission checks
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Entity([u8; ENTITY_LEN]);

impl Entity {
    /// The unset identity; never a valid permission manager
    pub const ZERO: Entity = Entity([0u8; ENTITY_LEN]);

    pub const fn new(bytes: [u8; ENTITY_LEN]) -> Self {
        Self(bytes)
    }

    /// Builds an entity whose low 8 bytes hold `value` big-endian
    pub fn from_low_u64(value: u64) -> Self {
        let mut bytes = [0u8; ENTITY_LEN];
        bytes[ENTITY_LEN - 8..].copy_from_slice(&value.to_be_bytes());
        Self(bytes)
    }

    /// Generates a random, non-zero entity
    pub fn random() -> Self {
        let mut rng = rand::thread_rng();
        loop {
            let mut bytes = [0u8; ENTITY_LEN];
            rng.fill_bytes(&mut bytes);
            let entity = Self(bytes);
            if !entity.is_zero() {
                return entity;
            }
        }
    }

    pub fn as_bytes(&self) -> &[u8; ENTITY_LEN] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; ENTITY_LEN]
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entity({})", self)
    }
}

impl FromStr for Entity {
    type Err = AclError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode_hex::<ENTITY_LEN>(s)
            .map(Self)
            .map_err(AclError::InvalidEntity)
    }
}

impl From<[u8; ENTITY_LEN]> for Entity {
    fn from(bytes: [u8; ENTITY_LEN]) -> Self {
        Self(bytes)
    }
}

impl Serialize for Entity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Entity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

/// Opaque identifier naming a capability
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Role([u8; ROLE_LEN]);

impl Role {
    pub const fn new(bytes: [u8; ROLE_LEN]) -> Self {
        Self(bytes)
    }

    /// Derives a role identifier from its constant name, e.g. `"CREATE_PERMISSIONS_ROLE"`
    pub fn from_name(name: &str) -> Self {
        let digest = Sha256::digest(name.as_bytes());
        let mut bytes = [0u8; ROLE_LEN];
        bytes.copy_from_slice(&digest);
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; ROLE_LEN] {
        &self.0
    }
}

impl From<u64> for Role {
    fn from(value: u64) -> Self {
        let mut bytes = [0u8; ROLE_LEN];
        bytes[ROLE_LEN - 8..].copy_from_slice(&value.to_be_bytes());
        Self(bytes)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Role({})", self)
    }
}

impl FromStr for Role {
    type Err = AclError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode_hex::<ROLE_LEN>(s)
            .map(Self)
            .map_err(AclError::InvalidRole)
    }
}

impl Serialize for Role {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

/// Opaque handle naming a protected resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(pub u64);

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ObjectId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// Composite key of an object permission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PermissionKey {
    pub object: ObjectId,
    pub role: Role,
}

impl PermissionKey {
    pub fn new(object: ObjectId, role: Role) -> Self {
        Self { object, role }
    }

    /// Big-endian object id followed by the role bytes, so keys sort by object first
    pub fn to_storage_key(&self) -> [u8; PERMISSION_KEY_LEN] {
        let mut key = [0u8; PERMISSION_KEY_LEN];
        key[..8].copy_from_slice(&self.object.0.to_be_bytes());
        key[8..].copy_from_slice(&self.role.0);
        key
    }

    pub fn from_storage_key(bytes: &[u8]) -> Option<Self> {
        if bytes.len() != PERMISSION_KEY_LEN {
            return None;
        }
        let mut object = [0u8; 8];
        object.copy_from_slice(&bytes[..8]);
        let mut role = [0u8; ROLE_LEN];
        role.copy_from_slice(&bytes[8..]);
        Some(Self {
            object: ObjectId(u64::from_be_bytes(object)),
            role: Role(role),
        })
    }
}

impl fmt::Display for PermissionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.object, self.role)
    }
}
