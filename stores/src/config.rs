// Configuration for opening a key vault
// TOML file selecting the storage backend and encryption at rest

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use keyvault_core::{KeyVaultError, KeyVaultResult, PortfolioOptions, Storage};

use crate::encryptor::Argon2AesGcmEncryptor;
use crate::in_memory::InMemoryStore;
use crate::sled_store::SledStore;

/// Storage backend type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Volatile in-process storage
    #[default]
    Memory,

    /// sled database on disk; requires `path`
    Sled,
}

impl StorageBackend {
    /// Get all available backend names
    pub fn variants() -> &'static [&'static str] {
        &["memory", "sled"]
    }
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageBackend::Memory => write!(f, "memory"),
            StorageBackend::Sled => write!(f, "sled"),
        }
    }
}

impl FromStr for StorageBackend {
    type Err = KeyVaultError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" => Ok(StorageBackend::Memory),
            "sled" => Ok(StorageBackend::Sled),
            _ => Err(KeyVaultError::Config(format!(
                "unknown storage backend {} (expected one of {})",
                s,
                StorageBackend::variants().join(", ")
            ))),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
    /// Database directory for the sled backend
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// Seal secrets with Argon2id + AES-256-GCM; needs a password at open time
    #[serde(default)]
    pub encrypt: bool,
}

/// Top-level vault configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyVaultConfig {
    #[serde(default)]
    pub enable_simple_signer: bool,
    #[serde(default)]
    pub storage: StorageConfig,
}

impl KeyVaultConfig {
    pub fn from_toml_str(config: &str) -> KeyVaultResult<Self> {
        toml::from_str(config).map_err(|e| KeyVaultError::Config(e.to_string()))
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> KeyVaultResult<Self> {
        let config_str = fs::read_to_string(path.as_ref()).map_err(|e| {
            KeyVaultError::Config(format!("{}: {}", path.as_ref().display(), e))
        })?;
        Self::from_toml_str(&config_str)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> KeyVaultResult<()> {
        let config_str =
            toml::to_string_pretty(self).map_err(|e| KeyVaultError::Config(e.to_string()))?;
        fs::write(path.as_ref(), config_str).map_err(|e| {
            KeyVaultError::Config(format!("{}: {}", path.as_ref().display(), e))
        })
    }

    /// Configuration for a sled-backed vault at `path`
    pub fn sled<P: Into<PathBuf>>(path: P, encrypt: bool) -> Self {
        Self {
            enable_simple_signer: false,
            storage: StorageConfig {
                backend: StorageBackend::Sled,
                path: Some(path.into()),
                encrypt,
            },
        }
    }
}

/// Open the configured storage backend.
pub fn open_storage(config: &StorageConfig) -> KeyVaultResult<Box<dyn Storage>> {
    match config.backend {
        StorageBackend::Memory => Ok(Box::new(InMemoryStore::new())),
        StorageBackend::Sled => {
            let path = config.path.as_ref().ok_or_else(|| {
                KeyVaultError::Config("the sled backend requires a path".to_string())
            })?;
            Ok(Box::new(SledStore::open(path)?))
        }
    }
}

/// Bootstrap options for a vault described by `config`.
///
/// The seed is not part of the configuration; add it with `set_seed` or
/// `generate_seed` when creating a vault.
pub fn options_from_config(
    config: &KeyVaultConfig,
    password: Option<&str>,
) -> KeyVaultResult<PortfolioOptions> {
    let mut options = PortfolioOptions::new()
        .set_storage(open_storage(&config.storage)?)
        .enable_simple_signer(config.enable_simple_signer);

    if config.storage.encrypt {
        let password = password.ok_or_else(|| {
            KeyVaultError::Config("encrypted storage requires a password".to_string())
        })?;
        options = options
            .set_encryptor(Arc::new(Argon2AesGcmEncryptor::new()))
            .set_password(password);
    }

    Ok(options)
}
