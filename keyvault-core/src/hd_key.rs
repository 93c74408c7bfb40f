//! Hierarchical deterministic keys
//!
//! An `HdKey` is a BLS12-381 private scalar tagged with the absolute path that
//! produced it. Keys are derived from a master key with relative paths such as
//! `/0/0/0`; each segment is one hardened derivation step.

use bls12_381::Scalar;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;
use zeroize::Zeroizing;

use crate::bls::{scalar_from_be_bytes, scalar_to_be_bytes, PublicKey, SECRET_KEY_LENGTH};
use crate::derivation::{derive_base_sk, derive_child_sk, BASE_PATH};
use crate::error::{KeyVaultError, KeyVaultResult};

// ASCII digits only; at most three per segment.
static RELATIVE_PATH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(/[0-9]{1,3})+$").expect("relative path pattern is valid"));

/// Validate a relative path and return its segment indices.
pub fn parse_relative_path(relative_path: &str) -> KeyVaultResult<Vec<u32>> {
    if !RELATIVE_PATH.is_match(relative_path) {
        return Err(KeyVaultError::InvalidPath);
    }

    relative_path
        .split('/')
        .skip(1)
        .map(|segment| segment.parse::<u32>().map_err(|_| KeyVaultError::InvalidPath))
        .collect()
}

/// Private key at a known derivation path
#[derive(Clone)]
pub struct HdKey {
    id: Uuid,
    path: String,
    private_key: Scalar,
}

impl HdKey {
    /// Derive the master key (at `m/12381/3600`) from a root seed.
    pub fn from_seed(seed: &[u8]) -> KeyVaultResult<Self> {
        let private_key = derive_base_sk(seed)?;
        Ok(Self {
            id: Uuid::new_v4(),
            path: BASE_PATH.to_string(),
            private_key,
        })
    }

    /// Derive a descendant key along `relative_path` (e.g. `/1/2/3`).
    ///
    /// The returned key gets a fresh id; the path records every step taken.
    pub fn derive(&self, relative_path: &str) -> KeyVaultResult<Self> {
        let indices = parse_relative_path(relative_path)?;

        let mut private_key = self.private_key;
        let mut path = self.path.clone();
        for index in indices {
            private_key = derive_child_sk(&private_key, index)?;
            path.push_str(&format!("/{}", index));
        }

        Ok(Self {
            id: Uuid::new_v4(),
            path,
            private_key,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn public_key(&self) -> PublicKey {
        PublicKey::from_scalar(&self.private_key)
    }

    /// Private scalar, 32 bytes big-endian
    pub fn private_key_bytes(&self) -> Zeroizing<[u8; SECRET_KEY_LENGTH]> {
        Zeroizing::new(scalar_to_be_bytes(&self.private_key))
    }

    /// Parse a key from its JSON record.
    pub fn from_json(data: &[u8]) -> KeyVaultResult<Self> {
        let record: HdKeyRecord = serde_json::from_slice(data)
            .map_err(|e| KeyVaultError::MalformedRecord(e.to_string()))?;
        Self::try_from(record)
    }
}

/// Master key derivation (`m/12381/3600`) from a seed
pub fn master_key_from_seed(seed: &[u8]) -> KeyVaultResult<HdKey> {
    HdKey::from_seed(seed)
}

impl fmt::Debug for HdKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HdKey")
            .field("id", &self.id)
            .field("path", &self.path)
            .field("private_key", &"[REDACTED]")
            .finish()
    }
}

/// Persisted form of an `HdKey`
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HdKeyRecord {
    pub id: Uuid,
    pub path: String,
    /// Hex, 32 bytes big-endian
    pub private_scalar: String,
}

impl From<HdKey> for HdKeyRecord {
    fn from(key: HdKey) -> Self {
        Self {
            id: key.id,
            private_scalar: hex::encode(&key.private_key_bytes()[..]),
            path: key.path,
        }
    }
}

impl TryFrom<HdKeyRecord> for HdKey {
    type Error = KeyVaultError;

    fn try_from(record: HdKeyRecord) -> Result<Self, Self::Error> {
        let bytes = Zeroizing::new(hex::decode(&record.private_scalar).map_err(|e| {
            KeyVaultError::MalformedRecord(format!("could not parse privateScalar: {}", e))
        })?);
        let private_key = scalar_from_be_bytes(&bytes).ok_or_else(|| {
            KeyVaultError::MalformedRecord("could not parse privateScalar".to_string())
        })?;

        Ok(Self {
            id: record.id,
            path: record.path,
            private_key,
        })
    }
}

impl Serialize for HdKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        HdKeyRecord::from(self.clone()).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for HdKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let record = HdKeyRecord::deserialize(deserializer)?;
        HdKey::try_from(record).map_err(serde::de::Error::custom)
    }
}
