// KeyVault core library
// Hierarchical deterministic BLS12-381 key management for validator keys

// Public modules
pub mod account;
pub mod bls;
pub mod derivation;
pub mod error;
pub mod hd_key;
pub mod logging;
pub mod options;
pub mod storage;
pub mod vault;
pub mod wallet;

#[cfg(test)]
mod testing;

// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Re-export commonly used types
pub use crate::account::ValidatorAccount;
pub use crate::bls::PublicKey;
pub use crate::error::{KeyVaultError, KeyVaultResult, StorageError};
pub use crate::hd_key::{master_key_from_seed, HdKey, HdKeyRecord};
pub use crate::options::PortfolioOptions;
pub use crate::storage::{EncryptedSecret, Encryptor, Storage, VaultContext};
pub use crate::vault::{KeyVault, PortfolioRecord, WalletStream};
pub use crate::wallet::{HdWallet, WalletRecord};
