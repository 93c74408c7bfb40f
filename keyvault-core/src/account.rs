//! Validator accounts
//!
//! An account is the leaf of the key tree: a named signing key owned by one
//! wallet. Accounts are only created through `HdWallet::create_validator_account`.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::bls::PublicKey;
use crate::hd_key::HdKey;

/// Named validator signing key belonging to a wallet
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidatorAccount {
    id: Uuid,
    wallet_id: Uuid,
    name: String,
    validation_key: HdKey,
    withdrawal_public_key: PublicKey,
}

impl ValidatorAccount {
    pub(crate) fn new(
        name: String,
        wallet_id: Uuid,
        validation_key: HdKey,
        withdrawal_public_key: PublicKey,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            wallet_id,
            name,
            validation_key,
            withdrawal_public_key,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn wallet_id(&self) -> Uuid {
        self.wallet_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Public key of the signing (validation) key
    pub fn public_key(&self) -> PublicKey {
        self.validation_key.public_key()
    }

    pub fn withdrawal_public_key(&self) -> PublicKey {
        self.withdrawal_public_key
    }

    /// Absolute derivation path of the signing key
    pub fn path(&self) -> &str {
        self.validation_key.path()
    }

    pub fn validation_key(&self) -> &HdKey {
        &self.validation_key
    }
}

impl fmt::Debug for ValidatorAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidatorAccount")
            .field("id", &self.id)
            .field("wallet_id", &self.wallet_id)
            .field("name", &self.name)
            .field("path", &self.path())
            .field("public_key", &self.public_key())
            .finish()
    }
}
