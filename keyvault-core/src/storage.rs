//! Storage contract consumed by the vault, its wallets and accounts
//!
//! Implementations persist three kinds of records (the vault record, wallet
//! records and accounts) plus the root seed. Secret material goes through
//! the installed `Encryptor`, if any.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;
use zeroize::Zeroizing;

use crate::account::ValidatorAccount;
use crate::error::StorageError;
use crate::vault::PortfolioRecord;
use crate::wallet::WalletRecord;

/// Password-based encryption of secret material at rest
pub trait Encryptor: Send + Sync {
    /// Identifier recorded alongside every ciphertext
    fn name(&self) -> &str;

    fn version(&self) -> u32;

    fn encrypt(&self, secret: &[u8], passphrase: &[u8]) -> Result<EncryptedSecret, StorageError>;

    fn decrypt(
        &self,
        encrypted: &EncryptedSecret,
        passphrase: &[u8],
    ) -> Result<Zeroizing<Vec<u8>>, StorageError>;
}

/// Ciphertext envelope produced by an `Encryptor`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedSecret {
    pub encryptor: String,
    pub version: u32,
    #[serde(with = "hex::serde")]
    pub salt: Vec<u8>,
    #[serde(with = "hex::serde")]
    pub nonce: Vec<u8>,
    #[serde(with = "hex::serde")]
    pub ciphertext: Vec<u8>,
}

/// Persistence interface for vaults, wallets, accounts and the root seed
pub trait Storage: Send + Sync {
    /// Human-readable backend name
    fn name(&self) -> &str;

    fn save_portfolio(&self, portfolio: &PortfolioRecord) -> Result<(), StorageError>;

    /// The saved vault record, or `None` if no vault has been saved yet.
    fn open_portfolio(&self) -> Result<Option<PortfolioRecord>, StorageError>;

    fn save_wallet(&self, wallet: &WalletRecord) -> Result<(), StorageError>;

    /// Fails with `StorageError::NotFound` for an unknown id.
    fn open_wallet(&self, id: Uuid) -> Result<WalletRecord, StorageError>;

    fn save_account(&self, account: &ValidatorAccount) -> Result<(), StorageError>;

    /// Unknown accounts are not an error: the lookup returns `Ok(None)`.
    fn open_account(
        &self,
        wallet_id: Uuid,
        account_id: Uuid,
    ) -> Result<Option<ValidatorAccount>, StorageError>;

    fn list_accounts(&self, wallet_id: Uuid) -> Result<Vec<ValidatorAccount>, StorageError>;

    fn securely_fetch_portfolio_seed(&self) -> Result<Zeroizing<Vec<u8>>, StorageError>;

    fn securely_save_portfolio_seed(&self, seed: &[u8]) -> Result<(), StorageError>;

    /// Install an encryptor applied around every persisted secret from now on.
    fn set_encryptor(&mut self, encryptor: Arc<dyn Encryptor>, password: Zeroizing<Vec<u8>>);
}

/// State shared by a vault and every wallet it hands out
pub struct VaultContext {
    pub storage: Arc<dyn Storage>,
    /// Encryptor installed on `storage`, kept for callers that need to know
    /// how secrets are sealed. The core itself only goes through `storage`.
    pub encryptor: Option<Arc<dyn Encryptor>>,
}

impl VaultContext {
    pub fn new(storage: Arc<dyn Storage>, encryptor: Option<Arc<dyn Encryptor>>) -> Self {
        Self { storage, encryptor }
    }
}

impl std::fmt::Debug for VaultContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultContext")
            .field("storage", &self.storage.name())
            .field("encryptor", &self.encryptor.as_ref().map(|e| e.name().to_string()))
            .finish()
    }
}
