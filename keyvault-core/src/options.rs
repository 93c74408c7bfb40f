//! Bootstrap options for creating or reopening a key vault

use rand::rngs::OsRng;
use rand::RngCore;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;
use zeroize::Zeroizing;

use crate::error::{KeyVaultError, KeyVaultResult};
use crate::storage::{Encryptor, Storage};

/// Length of seeds produced by `PortfolioOptions::generate_seed`
pub const GENERATED_SEED_LENGTH: usize = 32;

/// Builder collecting everything a `KeyVault` needs at construction time
#[derive(Default)]
pub struct PortfolioOptions {
    encryptor: Option<Arc<dyn Encryptor>>,
    password: Option<Zeroizing<Vec<u8>>>,
    storage: Option<Box<dyn Storage>>,
    enable_simple_signer: bool,
    seed: Option<Zeroizing<Vec<u8>>>,
    portfolio_id: Option<Uuid>,
}

impl PortfolioOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_encryptor(mut self, encryptor: Arc<dyn Encryptor>) -> Self {
        self.encryptor = Some(encryptor);
        self
    }

    pub fn set_storage(mut self, storage: Box<dyn Storage>) -> Self {
        self.storage = Some(storage);
        self
    }

    pub fn set_password(mut self, password: &str) -> Self {
        self.password = Some(Zeroizing::new(password.as_bytes().to_vec()));
        self
    }

    pub fn enable_simple_signer(mut self, enabled: bool) -> Self {
        self.enable_simple_signer = enabled;
        self
    }

    pub fn set_seed(mut self, seed: Vec<u8>) -> Self {
        self.seed = Some(Zeroizing::new(seed));
        self
    }

    /// Use a fresh random 32-byte seed from the OS RNG.
    pub fn generate_seed(self) -> KeyVaultResult<Self> {
        let mut seed = vec![0u8; GENERATED_SEED_LENGTH];
        OsRng
            .try_fill_bytes(&mut seed)
            .map_err(|e| KeyVaultError::InvalidSeed(format!("seed generation failed: {}", e)))?;
        Ok(self.set_seed(seed))
    }

    /// Require the reopened vault to have this id.
    pub fn set_portfolio_id(mut self, id: Uuid) -> Self {
        self.portfolio_id = Some(id);
        self
    }

    pub fn seed(&self) -> Option<&[u8]> {
        self.seed.as_ref().map(|seed| seed.as_slice())
    }

    /// Validate the options and install the encryptor on the storage.
    pub(crate) fn resolve(self) -> KeyVaultResult<ResolvedOptions> {
        let mut storage = self
            .storage
            .ok_or_else(|| KeyVaultError::Config("storage is required".to_string()))?;

        match (&self.encryptor, self.password) {
            (Some(encryptor), Some(password)) => {
                storage.set_encryptor(encryptor.clone(), password);
            }
            (Some(_), None) => {
                return Err(KeyVaultError::Config(
                    "an encryptor requires a password".to_string(),
                ))
            }
            (None, _) => {}
        }

        Ok(ResolvedOptions {
            storage: Arc::from(storage),
            encryptor: self.encryptor,
            enable_simple_signer: self.enable_simple_signer,
            seed: self.seed,
            portfolio_id: self.portfolio_id,
        })
    }
}

impl fmt::Debug for PortfolioOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PortfolioOptions")
            .field("encryptor", &self.encryptor.as_ref().map(|e| e.name().to_string()))
            .field("storage", &self.storage.as_ref().map(|s| s.name().to_string()))
            .field("enable_simple_signer", &self.enable_simple_signer)
            .field("has_seed", &self.seed.is_some())
            .field("portfolio_id", &self.portfolio_id)
            .finish()
    }
}

pub(crate) struct ResolvedOptions {
    pub storage: Arc<dyn Storage>,
    pub encryptor: Option<Arc<dyn Encryptor>>,
    pub enable_simple_signer: bool,
    pub seed: Option<Zeroizing<Vec<u8>>>,
    pub portfolio_id: Option<Uuid>,
}
