// In-memory storage backend
// Volatile maps behind RwLocks; useful for tests and short-lived vaults

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::debug;
use uuid::Uuid;
use zeroize::Zeroizing;

use keyvault_core::{
    Encryptor, PortfolioRecord, Storage, StorageError, ValidatorAccount, WalletRecord,
};

use crate::codec::SecretCodec;

/// Name reported by `InMemoryStore::name`
pub const IN_MEMORY_STORE_NAME: &str = "in-memory";

/// Storage backend keeping every record in process memory
///
/// Wallet and account records hold private keys and are kept sealed, like
/// the seed, so an installed encryptor covers them too.
#[derive(Default)]
pub struct InMemoryStore {
    portfolio: Arc<RwLock<Option<PortfolioRecord>>>,
    wallets: Arc<RwLock<HashMap<Uuid, Vec<u8>>>>,
    accounts: Arc<RwLock<HashMap<Uuid, HashMap<Uuid, Vec<u8>>>>>,
    seed: Arc<RwLock<Option<Vec<u8>>>>,
    codec: SecretCodec,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for InMemoryStore {
    fn name(&self) -> &str {
        IN_MEMORY_STORE_NAME
    }

    fn save_portfolio(&self, portfolio: &PortfolioRecord) -> Result<(), StorageError> {
        *self.portfolio.write().map_err(|_| StorageError::LockPoisoned)? = Some(portfolio.clone());
        Ok(())
    }

    fn open_portfolio(&self) -> Result<Option<PortfolioRecord>, StorageError> {
        Ok(self
            .portfolio
            .read()
            .map_err(|_| StorageError::LockPoisoned)?
            .clone())
    }

    fn save_wallet(&self, wallet: &WalletRecord) -> Result<(), StorageError> {
        let sealed = self.codec.seal_record(wallet)?;
        self.wallets
            .write()
            .map_err(|_| StorageError::LockPoisoned)?
            .insert(wallet.id, sealed);
        debug!(wallet_id = %wallet.id, "Wallet saved");
        Ok(())
    }

    fn open_wallet(&self, id: Uuid) -> Result<WalletRecord, StorageError> {
        let wallets = self.wallets.read().map_err(|_| StorageError::LockPoisoned)?;
        let sealed = wallets
            .get(&id)
            .ok_or_else(|| StorageError::NotFound(format!("wallet {}", id)))?;
        self.codec.open_record(sealed)
    }

    fn save_account(&self, account: &ValidatorAccount) -> Result<(), StorageError> {
        let sealed = self.codec.seal_record(account)?;
        self.accounts
            .write()
            .map_err(|_| StorageError::LockPoisoned)?
            .entry(account.wallet_id())
            .or_default()
            .insert(account.id(), sealed);
        debug!(wallet_id = %account.wallet_id(), account_id = %account.id(), "Account saved");
        Ok(())
    }

    fn open_account(
        &self,
        wallet_id: Uuid,
        account_id: Uuid,
    ) -> Result<Option<ValidatorAccount>, StorageError> {
        let accounts = self.accounts.read().map_err(|_| StorageError::LockPoisoned)?;
        accounts
            .get(&wallet_id)
            .and_then(|wallet_accounts| wallet_accounts.get(&account_id))
            .map(|sealed| self.codec.open_record(sealed))
            .transpose()
    }

    fn list_accounts(&self, wallet_id: Uuid) -> Result<Vec<ValidatorAccount>, StorageError> {
        let accounts = self.accounts.read().map_err(|_| StorageError::LockPoisoned)?;
        match accounts.get(&wallet_id) {
            Some(wallet_accounts) => wallet_accounts
                .values()
                .map(|sealed| self.codec.open_record(sealed))
                .collect(),
            None => Ok(Vec::new()),
        }
    }

    fn securely_fetch_portfolio_seed(&self) -> Result<Zeroizing<Vec<u8>>, StorageError> {
        let seed = self.seed.read().map_err(|_| StorageError::LockPoisoned)?;
        let sealed = seed
            .as_ref()
            .ok_or_else(|| StorageError::NotFound("portfolio seed".to_string()))?;
        self.codec.open(sealed)
    }

    fn securely_save_portfolio_seed(&self, seed: &[u8]) -> Result<(), StorageError> {
        let sealed = self.codec.seal(seed)?;
        *self.seed.write().map_err(|_| StorageError::LockPoisoned)? = Some(sealed);
        Ok(())
    }

    fn set_encryptor(&mut self, encryptor: Arc<dyn Encryptor>, password: Zeroizing<Vec<u8>>) {
        self.codec.set_encryptor(encryptor, password);
    }
}
