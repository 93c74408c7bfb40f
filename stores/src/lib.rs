// KeyVault storage backends
// In-memory and sled implementations of the vault storage contract

pub mod codec;
pub mod config;
pub mod encryptor;
pub mod in_memory;
pub mod sled_store;

pub use crate::config::{
    open_storage, options_from_config, KeyVaultConfig, StorageBackend, StorageConfig,
};
pub use crate::encryptor::Argon2AesGcmEncryptor;
pub use crate::in_memory::InMemoryStore;
pub use crate::sled_store::SledStore;
