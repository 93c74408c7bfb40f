//! Hierarchical deterministic wallets
//!
//! A wallet owns the key at `/<ordinal>` below the vault's master key and
//! derives validator accounts beneath it. It keeps no account index of its
//! own; listing and lookups are answered by storage.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::account::ValidatorAccount;
use crate::error::{KeyVaultError, KeyVaultResult};
use crate::hd_key::HdKey;
use crate::storage::VaultContext;

/// Wallet type reported by `HdWallet::wallet_type`
pub const HD_WALLET_TYPE: &str = "hierarchical deterministic";

/// Relative path of an account's withdrawal key below its wallet key.
pub fn withdrawal_path(account_ordinal: usize) -> String {
    format!("/{}", account_ordinal)
}

/// Relative path of an account's signing key below its wallet key.
pub fn validation_path(account_ordinal: usize) -> String {
    format!("/{}/0", account_ordinal)
}

/// Persisted form of a wallet
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletRecord {
    pub id: Uuid,
    pub name: String,
    /// Path of the wallet key relative to the vault's master key
    pub path: String,
    pub key: HdKey,
}

/// Wallet bound to the storage context of the vault that created it
#[derive(Clone)]
pub struct HdWallet {
    id: Uuid,
    name: String,
    key: HdKey,
    path: String,
    context: Arc<VaultContext>,
}

impl HdWallet {
    pub(crate) fn new(name: String, key: HdKey, path: String, context: Arc<VaultContext>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            key,
            path,
            context,
        }
    }

    /// Rebuild a wallet from its persisted record.
    pub fn from_record(record: WalletRecord, context: Arc<VaultContext>) -> Self {
        Self {
            id: record.id,
            name: record.name,
            key: record.key,
            path: record.path,
            context,
        }
    }

    pub fn record(&self) -> WalletRecord {
        WalletRecord {
            id: self.id,
            name: self.name.clone(),
            path: self.path.clone(),
            key: self.key.clone(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Path of the wallet key relative to the vault's master key
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn wallet_type(&self) -> &'static str {
        HD_WALLET_TYPE
    }

    /// Derive and persist a new validator account.
    ///
    /// The n-th account of a wallet (n = accounts currently stored) gets its
    /// withdrawal key at `/n` and its signing key at `/n/0`. Names must be
    /// unique within the wallet.
    ///
    /// A wallet must have a single writer. Two clones creating accounts
    /// concurrently would both see the same ordinal and derive the same
    /// signing key, as would a create after an account record was deleted
    /// from storage behind the wallet's back.
    pub fn create_validator_account(&self, name: &str) -> KeyVaultResult<ValidatorAccount> {
        let existing = self.context.storage.list_accounts(self.id)?;
        if existing.iter().any(|account| account.name() == name) {
            return Err(KeyVaultError::DuplicateName(name.to_string()));
        }

        let ordinal = existing.len();
        let withdrawal_key = self.key.derive(&withdrawal_path(ordinal))?;
        let validation_key = self.key.derive(&validation_path(ordinal))?;

        let account = ValidatorAccount::new(
            name.to_string(),
            self.id,
            validation_key,
            withdrawal_key.public_key(),
        );
        self.context.storage.save_account(&account)?;

        info!(
            wallet_id = %self.id,
            account_id = %account.id(),
            name = name,
            path = account.path(),
            "Validator account created"
        );

        Ok(account)
    }

    pub fn accounts(&self) -> KeyVaultResult<Vec<ValidatorAccount>> {
        Ok(self.context.storage.list_accounts(self.id)?)
    }

    pub fn account_by_id(&self, id: Uuid) -> KeyVaultResult<ValidatorAccount> {
        self.context
            .storage
            .open_account(self.id, id)?
            .ok_or_else(|| KeyVaultError::NotFound(format!("account {}", id)))
    }

    pub fn account_by_name(&self, name: &str) -> KeyVaultResult<ValidatorAccount> {
        self.accounts()?
            .into_iter()
            .find(|account| account.name() == name)
            .ok_or_else(|| KeyVaultError::NotFound(format!("account {}", name)))
    }
}

impl fmt::Debug for HdWallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HdWallet")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("path", &self.path)
            .finish()
    }
}
