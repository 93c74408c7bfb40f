// Persistent storage backend on sled
// One tree per record kind; secret-bearing records are sealed before writing

use sled::{Db, Tree};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;
use zeroize::Zeroizing;

use keyvault_core::{
    Encryptor, PortfolioRecord, Storage, StorageError, ValidatorAccount, WalletRecord,
};

use crate::codec::SecretCodec;

/// Name reported by `SledStore::name`
pub const SLED_STORE_NAME: &str = "sled";

const PORTFOLIO_TREE: &str = "portfolio";
const WALLETS_TREE: &str = "wallets";
const ACCOUNTS_TREE: &str = "accounts";
const SEED_TREE: &str = "seed";

const PORTFOLIO_KEY: &[u8] = b"__portfolio__";
const SEED_KEY: &[u8] = b"__seed__";

fn db_error(e: sled::Error) -> StorageError {
    StorageError::Backend(e.to_string())
}

/// Key of an account: `<walletId>/<accountId>`, so a wallet's accounts share a prefix
fn account_key(wallet_id: Uuid, account_id: Uuid) -> String {
    format!("{}/{}", wallet_id, account_id)
}

fn account_prefix(wallet_id: Uuid) -> String {
    format!("{}/", wallet_id)
}

/// Vault storage backend
pub struct SledStore {
    /// Sled database handle
    db: Arc<Db>,
    portfolio: Tree,
    wallets: Tree,
    accounts: Tree,
    seed: Tree,
    codec: SecretCodec,
}

impl SledStore {
    /// Open (or create) the store at `path`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let db = sled::open(path.as_ref()).map_err(db_error)?;
        info!(path = %path.as_ref().display(), "Opened sled store");
        Self::from_db(db)
    }

    /// Store backed by a throwaway database that is removed on drop
    pub fn temporary() -> Result<Self, StorageError> {
        let db = sled::Config::new()
            .temporary(true)
            .open()
            .map_err(db_error)?;
        Self::from_db(db)
    }

    fn from_db(db: Db) -> Result<Self, StorageError> {
        Ok(Self {
            portfolio: db.open_tree(PORTFOLIO_TREE).map_err(db_error)?,
            wallets: db.open_tree(WALLETS_TREE).map_err(db_error)?,
            accounts: db.open_tree(ACCOUNTS_TREE).map_err(db_error)?,
            seed: db.open_tree(SEED_TREE).map_err(db_error)?,
            db: Arc::new(db),
            codec: SecretCodec::default(),
        })
    }

    /// Flush all pending writes to disk
    pub fn flush(&self) -> Result<(), StorageError> {
        self.db.flush().map_err(db_error)?;
        Ok(())
    }
}

impl Storage for SledStore {
    fn name(&self) -> &str {
        SLED_STORE_NAME
    }

    fn save_portfolio(&self, portfolio: &PortfolioRecord) -> Result<(), StorageError> {
        self.portfolio
            .insert(PORTFOLIO_KEY, serde_json::to_vec(portfolio)?)
            .map_err(db_error)?;
        Ok(())
    }

    fn open_portfolio(&self) -> Result<Option<PortfolioRecord>, StorageError> {
        match self.portfolio.get(PORTFOLIO_KEY).map_err(db_error)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn save_wallet(&self, wallet: &WalletRecord) -> Result<(), StorageError> {
        let sealed = self.codec.seal_record(wallet)?;
        self.wallets
            .insert(wallet.id.to_string().as_bytes(), sealed)
            .map_err(db_error)?;
        debug!(wallet_id = %wallet.id, "Wallet saved");
        Ok(())
    }

    fn open_wallet(&self, id: Uuid) -> Result<WalletRecord, StorageError> {
        let sealed = self
            .wallets
            .get(id.to_string().as_bytes())
            .map_err(db_error)?
            .ok_or_else(|| StorageError::NotFound(format!("wallet {}", id)))?;
        self.codec.open_record(&sealed)
    }

    fn save_account(&self, account: &ValidatorAccount) -> Result<(), StorageError> {
        let sealed = self.codec.seal_record(account)?;
        let key = account_key(account.wallet_id(), account.id());
        self.accounts
            .insert(key.as_bytes(), sealed)
            .map_err(db_error)?;
        debug!(wallet_id = %account.wallet_id(), account_id = %account.id(), "Account saved");
        Ok(())
    }

    fn open_account(
        &self,
        wallet_id: Uuid,
        account_id: Uuid,
    ) -> Result<Option<ValidatorAccount>, StorageError> {
        let key = account_key(wallet_id, account_id);
        match self.accounts.get(key.as_bytes()).map_err(db_error)? {
            Some(sealed) => Ok(Some(self.codec.open_record(&sealed)?)),
            None => Ok(None),
        }
    }

    fn list_accounts(&self, wallet_id: Uuid) -> Result<Vec<ValidatorAccount>, StorageError> {
        let mut accounts = Vec::new();

        for item in self.accounts.scan_prefix(account_prefix(wallet_id).as_bytes()) {
            let (_, sealed) = item.map_err(db_error)?;
            accounts.push(self.codec.open_record(&sealed)?);
        }

        Ok(accounts)
    }

    fn securely_fetch_portfolio_seed(&self) -> Result<Zeroizing<Vec<u8>>, StorageError> {
        let sealed = self
            .seed
            .get(SEED_KEY)
            .map_err(db_error)?
            .ok_or_else(|| StorageError::NotFound("portfolio seed".to_string()))?;
        self.codec.open(&sealed)
    }

    fn securely_save_portfolio_seed(&self, seed: &[u8]) -> Result<(), StorageError> {
        let sealed = self.codec.seal(seed)?;
        self.seed.insert(SEED_KEY, sealed).map_err(db_error)?;
        Ok(())
    }

    fn set_encryptor(&mut self, encryptor: Arc<dyn Encryptor>, password: Zeroizing<Vec<u8>>) {
        self.codec.set_encryptor(encryptor, password);
    }
}

impl Drop for SledStore {
    fn drop(&mut self) {
        if let Err(e) = self.db.flush() {
            tracing::warn!(error = %e, "Failed to flush sled store on drop");
        }
    }
}
