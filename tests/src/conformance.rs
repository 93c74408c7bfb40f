// Storage conformance suite
// Each check takes a fresh storage instance and panics on the first violation

use std::collections::HashSet;
use tracing::debug;
use uuid::Uuid;

use keyvault_core::{KeyVaultError, Storage, ValidatorAccount};

use crate::new_vault;

/// Saving then opening each account returns the same account.
pub fn saving_accounts(storage: &dyn Storage, accounts: &[ValidatorAccount]) {
    for account in accounts {
        debug!(name = account.name(), "adding account");
        storage.save_account(account).expect("account saves");

        let opened = storage
            .open_account(account.wallet_id(), account.id())
            .expect("account opens")
            .expect("account was saved");
        assert_eq!(opened.id(), account.id());
        assert_eq!(opened.name(), account.name());
        assert_eq!(opened.public_key().to_bytes(), account.public_key().to_bytes());
        assert_eq!(opened.path(), account.path());
    }
}

/// An account already in storage opens with the same id, key and name.
pub fn opening_account(storage: &dyn Storage, account: &ValidatorAccount) {
    let opened = storage
        .open_account(account.wallet_id(), account.id())
        .expect("account opens")
        .expect("account exists");
    assert_eq!(opened.id().to_string(), account.id().to_string());
    assert_eq!(opened.public_key().to_bytes(), account.public_key().to_bytes());
    assert_eq!(opened.name(), account.name());
}

/// The wallet reports an unknown account as `NotFound`.
pub fn fetching_non_existing_account(storage: Box<dyn Storage>) {
    let mut vault = new_vault(storage);
    let wallet = vault.create_wallet("test").expect("wallet is created");

    let err = wallet
        .account_by_id(Uuid::new_v4())
        .expect_err("unknown account is reported by the wallet");
    assert!(matches!(err, KeyVaultError::NotFound(_)));
    assert!(wallet.accounts().expect("listing works").is_empty());
}

/// Unknown account through the raw storage contract.
pub fn fetching_non_existing_account_raw(storage: &dyn Storage) {
    let result = storage
        .open_account(Uuid::new_v4(), Uuid::new_v4())
        .expect("unknown account is not an error");
    assert!(result.is_none());
}

/// Ten accounts created through a wallet are all listed by storage.
pub fn listing_accounts(storage: Box<dyn Storage>) {
    let mut vault = new_vault(storage);
    let wallet = vault.create_wallet("test").expect("wallet is created");

    let mut created = HashSet::new();
    for i in 0..10 {
        let account = wallet
            .create_validator_account(&i.to_string())
            .expect("account is created");
        created.insert(account.id());
    }

    let listed: HashSet<Uuid> = wallet
        .accounts()
        .expect("listing works")
        .iter()
        .map(|account| account.id())
        .collect();
    assert_eq!(listed, created, "every created account is listed");
}
