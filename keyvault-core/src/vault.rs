//! The key vault (portfolio)
//!
//! The vault holds the master key derived from the root seed and a name index
//! of the wallets created beneath it. Wallet `n` (0-based creation ordinal)
//! lives at `/n` below the master key.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::thread;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{KeyVaultError, KeyVaultResult};
use crate::hd_key::HdKey;
use crate::options::PortfolioOptions;
use crate::storage::VaultContext;
use crate::wallet::HdWallet;

/// Capacity of the channel feeding a `WalletStream`
pub const WALLET_CHANNEL_CAPACITY: usize = 1024;

/// Persisted form of a vault
///
/// The master key and the storage context are not part of the record; they
/// are rebuilt from the stored seed and the bootstrap options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawPortfolioRecord")]
pub struct PortfolioRecord {
    pub id: Uuid,
    pub enable_simple_signer: bool,
    pub index_mapper: HashMap<String, Uuid>,
}

impl PortfolioRecord {
    /// Parse a vault record, reporting the first missing field by name.
    pub fn from_json(data: &[u8]) -> KeyVaultResult<Self> {
        let raw: RawPortfolioRecord = serde_json::from_slice(data)
            .map_err(|e| KeyVaultError::MalformedRecord(e.to_string()))?;
        Self::try_from(raw)
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPortfolioRecord {
    id: Option<Uuid>,
    enable_simple_signer: Option<bool>,
    index_mapper: Option<HashMap<String, Uuid>>,
}

fn missing_var(name: &str) -> KeyVaultError {
    KeyVaultError::MalformedRecord(format!("could not find var: {}", name))
}

impl TryFrom<RawPortfolioRecord> for PortfolioRecord {
    type Error = KeyVaultError;

    fn try_from(raw: RawPortfolioRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: raw.id.ok_or_else(|| missing_var("id"))?,
            enable_simple_signer: raw
                .enable_simple_signer
                .ok_or_else(|| missing_var("enableSimpleSigner"))?,
            index_mapper: raw.index_mapper.ok_or_else(|| missing_var("indexMapper"))?,
        })
    }
}

/// Root of the key hierarchy
pub struct KeyVault {
    id: Uuid,
    key: HdKey,
    index_mapper: HashMap<String, Uuid>,
    enable_simple_signer: bool,
    context: Arc<VaultContext>,
}

impl KeyVault {
    /// Create a new vault from a seed and persist it.
    pub fn new(options: PortfolioOptions) -> KeyVaultResult<Self> {
        let resolved = options.resolve()?;
        let seed = resolved
            .seed
            .ok_or_else(|| KeyVaultError::InvalidSeed("a seed is required".to_string()))?;

        let key = HdKey::from_seed(&seed)?;
        let context = Arc::new(VaultContext::new(resolved.storage, resolved.encryptor));
        context.storage.securely_save_portfolio_seed(&seed)?;

        let vault = Self {
            id: Uuid::new_v4(),
            key,
            index_mapper: HashMap::new(),
            enable_simple_signer: resolved.enable_simple_signer,
            context,
        };
        vault.context.storage.save_portfolio(&vault.record())?;

        info!(
            vault_id = %vault.id,
            storage = vault.context.storage.name(),
            "Key vault created"
        );
        Ok(vault)
    }

    /// Reopen the vault persisted in the configured storage.
    pub fn open(options: PortfolioOptions) -> KeyVaultResult<Self> {
        let resolved = options.resolve()?;
        let context = Arc::new(VaultContext::new(resolved.storage, resolved.encryptor));

        let record = context
            .storage
            .open_portfolio()?
            .ok_or_else(|| KeyVaultError::NotFound("portfolio".to_string()))?;
        if let Some(expected) = resolved.portfolio_id {
            if record.id != expected {
                return Err(KeyVaultError::NotFound(format!("portfolio {}", expected)));
            }
        }

        let seed = context.storage.securely_fetch_portfolio_seed()?;
        let key = HdKey::from_seed(&seed)?;

        info!(
            vault_id = %record.id,
            wallets = record.index_mapper.len(),
            "Key vault opened"
        );
        Ok(Self {
            id: record.id,
            key,
            index_mapper: record.index_mapper,
            enable_simple_signer: record.enable_simple_signer,
            context,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn enable_simple_signer(&self) -> bool {
        self.enable_simple_signer
    }

    pub fn wallet_count(&self) -> usize {
        self.index_mapper.len()
    }

    pub fn record(&self) -> PortfolioRecord {
        PortfolioRecord {
            id: self.id,
            enable_simple_signer: self.enable_simple_signer,
            index_mapper: self.index_mapper.clone(),
        }
    }

    /// Derive, register and persist a new wallet.
    ///
    /// If either the wallet or the vault record fails to save, the name is
    /// removed from the index again and the storage error is returned. A
    /// wallet record saved before a failed vault save stays orphaned.
    pub fn create_wallet(&mut self, name: &str) -> KeyVaultResult<HdWallet> {
        if self.index_mapper.contains_key(name) {
            return Err(KeyVaultError::DuplicateName(name.to_string()));
        }

        let path = format!("/{}", self.index_mapper.len());
        let key = self.key.derive(&path)?;
        let wallet = HdWallet::new(name.to_string(), key, path, self.context.clone());

        self.index_mapper.insert(name.to_string(), wallet.id());
        if let Err(err) = self.persist_wallet(&wallet) {
            self.index_mapper.remove(name);
            warn!(
                vault_id = %self.id,
                name = name,
                error = %err,
                "Wallet creation rolled back"
            );
            return Err(err);
        }

        info!(
            vault_id = %self.id,
            wallet_id = %wallet.id(),
            name = name,
            path = wallet.path(),
            "Wallet created"
        );
        Ok(wallet)
    }

    fn persist_wallet(&self, wallet: &HdWallet) -> KeyVaultResult<()> {
        self.context.storage.save_wallet(&wallet.record())?;
        self.context.storage.save_portfolio(&self.record())?;
        Ok(())
    }

    pub fn wallet_by_id(&self, id: Uuid) -> KeyVaultResult<HdWallet> {
        let record = self.context.storage.open_wallet(id)?;
        Ok(HdWallet::from_record(record, self.context.clone()))
    }

    pub fn wallet_by_name(&self, name: &str) -> KeyVaultResult<HdWallet> {
        let id = self
            .index_mapper
            .get(name)
            .ok_or_else(|| KeyVaultError::NotFound(format!("wallet {}", name)))?;
        self.wallet_by_id(*id)
    }

    /// Stream every wallet in the index.
    ///
    /// Wallets are resolved on a producer thread over a snapshot of the index;
    /// order is unspecified. Wallets storage cannot resolve are skipped.
    pub fn wallets(&self) -> WalletStream {
        let (sender, receiver) = mpsc::channel(WALLET_CHANNEL_CAPACITY);
        let snapshot: Vec<(String, Uuid)> = self
            .index_mapper
            .iter()
            .map(|(name, id)| (name.clone(), *id))
            .collect();
        let context = self.context.clone();

        thread::spawn(move || {
            for (name, id) in snapshot {
                let record = match context.storage.open_wallet(id) {
                    Ok(record) => record,
                    Err(err) => {
                        warn!(
                            wallet_id = %id,
                            name = %name,
                            error = %err,
                            "Skipping unresolvable wallet"
                        );
                        continue;
                    }
                };

                if sender
                    .blocking_send(HdWallet::from_record(record, context.clone()))
                    .is_err()
                {
                    debug!("Wallet stream dropped by consumer");
                    break;
                }
            }
        });

        WalletStream { receiver }
    }
}

impl fmt::Debug for KeyVault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyVault")
            .field("id", &self.id)
            .field("wallets", &self.index_mapper.len())
            .field("enable_simple_signer", &self.enable_simple_signer)
            .field("context", &self.context)
            .finish()
    }
}

/// Finite, non-restartable sequence of wallets produced by `KeyVault::wallets`
///
/// Async callers should prefer `next_wallet`. The `Iterator` impl blocks the
/// calling thread and also works on a runtime thread.
pub struct WalletStream {
    receiver: mpsc::Receiver<HdWallet>,
}

impl WalletStream {
    pub async fn next_wallet(&mut self) -> Option<HdWallet> {
        self.receiver.recv().await
    }
}

impl Iterator for WalletStream {
    type Item = HdWallet;

    fn next(&mut self) -> Option<HdWallet> {
        if Handle::try_current().is_err() {
            return self.receiver.blocking_recv();
        }

        // blocking_recv refuses to run on a runtime thread; wait from a
        // helper thread outside the runtime context instead.
        let receiver = &mut self.receiver;
        thread::scope(|scope| {
            scope
                .spawn(move || receiver.blocking_recv())
                .join()
                .ok()
                .flatten()
        })
    }
}
