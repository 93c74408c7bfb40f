//! In-crate test doubles for the storage contract

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use uuid::Uuid;
use zeroize::Zeroizing;

use crate::account::ValidatorAccount;
use crate::error::StorageError;
use crate::storage::{EncryptedSecret, Encryptor, Storage, VaultContext};
use crate::vault::PortfolioRecord;
use crate::wallet::WalletRecord;

pub const SEED: &str = "0102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1fff";

#[derive(Default)]
struct State {
    portfolio: Option<PortfolioRecord>,
    wallets: HashMap<Uuid, WalletRecord>,
    accounts: HashMap<Uuid, Vec<ValidatorAccount>>,
    seed: Option<Vec<u8>>,
}

/// Shared-state storage with switchable failures
#[derive(Clone, Default)]
pub struct MockStorage {
    state: Arc<RwLock<State>>,
    fail_wallets: Arc<AtomicBool>,
    fail_portfolio: Arc<AtomicBool>,
    fail_accounts: Arc<AtomicBool>,
    encryptor_set: Arc<AtomicBool>,
}

impl MockStorage {
    pub fn fail_wallet_saves(&self, fail: bool) {
        self.fail_wallets.store(fail, Ordering::SeqCst);
    }

    pub fn fail_portfolio_saves(&self, fail: bool) {
        self.fail_portfolio.store(fail, Ordering::SeqCst);
    }

    pub fn fail_account_saves(&self, fail: bool) {
        self.fail_accounts.store(fail, Ordering::SeqCst);
    }

    pub fn remove_wallet(&self, id: Uuid) {
        self.state.write().unwrap().wallets.remove(&id);
    }

    pub fn wallet_count(&self) -> usize {
        self.state.read().unwrap().wallets.len()
    }

    pub fn encryptor_probe(&self) -> Arc<AtomicBool> {
        self.encryptor_set.clone()
    }

    fn check(flag: &AtomicBool) -> Result<(), StorageError> {
        if flag.load(Ordering::SeqCst) {
            return Err(StorageError::Backend("injected failure".to_string()));
        }
        Ok(())
    }
}

impl Storage for MockStorage {
    fn name(&self) -> &str {
        "mock"
    }

    fn save_portfolio(&self, portfolio: &PortfolioRecord) -> Result<(), StorageError> {
        Self::check(&self.fail_portfolio)?;
        self.state.write().unwrap().portfolio = Some(portfolio.clone());
        Ok(())
    }

    fn open_portfolio(&self) -> Result<Option<PortfolioRecord>, StorageError> {
        Ok(self.state.read().unwrap().portfolio.clone())
    }

    fn save_wallet(&self, wallet: &WalletRecord) -> Result<(), StorageError> {
        Self::check(&self.fail_wallets)?;
        self.state.write().unwrap().wallets.insert(wallet.id, wallet.clone());
        Ok(())
    }

    fn open_wallet(&self, id: Uuid) -> Result<WalletRecord, StorageError> {
        self.state
            .read()
            .unwrap()
            .wallets
            .get(&id)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(format!("wallet {}", id)))
    }

    fn save_account(&self, account: &ValidatorAccount) -> Result<(), StorageError> {
        Self::check(&self.fail_accounts)?;
        let mut state = self.state.write().unwrap();
        let accounts = state.accounts.entry(account.wallet_id()).or_default();
        accounts.retain(|existing| existing.id() != account.id());
        accounts.push(account.clone());
        Ok(())
    }

    fn open_account(
        &self,
        wallet_id: Uuid,
        account_id: Uuid,
    ) -> Result<Option<ValidatorAccount>, StorageError> {
        Ok(self
            .list_accounts(wallet_id)?
            .into_iter()
            .find(|account| account.id() == account_id))
    }

    fn list_accounts(&self, wallet_id: Uuid) -> Result<Vec<ValidatorAccount>, StorageError> {
        Ok(self
            .state
            .read()
            .unwrap()
            .accounts
            .get(&wallet_id)
            .cloned()
            .unwrap_or_default())
    }

    fn securely_fetch_portfolio_seed(&self) -> Result<Zeroizing<Vec<u8>>, StorageError> {
        self.state
            .read()
            .unwrap()
            .seed
            .clone()
            .map(Zeroizing::new)
            .ok_or_else(|| StorageError::NotFound("seed".to_string()))
    }

    fn securely_save_portfolio_seed(&self, seed: &[u8]) -> Result<(), StorageError> {
        self.state.write().unwrap().seed = Some(seed.to_vec());
        Ok(())
    }

    fn set_encryptor(&mut self, _encryptor: Arc<dyn Encryptor>, _password: Zeroizing<Vec<u8>>) {
        self.encryptor_set.store(true, Ordering::SeqCst);
    }
}

/// Pass-through encryptor
pub struct MockEncryptor;

impl Encryptor for MockEncryptor {
    fn name(&self) -> &str {
        "plain"
    }

    fn version(&self) -> u32 {
        1
    }

    fn encrypt(&self, secret: &[u8], _passphrase: &[u8]) -> Result<EncryptedSecret, StorageError> {
        Ok(EncryptedSecret {
            encryptor: self.name().to_string(),
            version: self.version(),
            salt: Vec::new(),
            nonce: Vec::new(),
            ciphertext: secret.to_vec(),
        })
    }

    fn decrypt(
        &self,
        encrypted: &EncryptedSecret,
        _passphrase: &[u8],
    ) -> Result<Zeroizing<Vec<u8>>, StorageError> {
        Ok(Zeroizing::new(encrypted.ciphertext.clone()))
    }
}

pub fn context(storage: Arc<MockStorage>) -> Arc<VaultContext> {
    Arc::new(VaultContext::new(storage, None))
}
