use keyvault_core::Storage;
use keyvault_stores::{Argon2AesGcmEncryptor, InMemoryStore, SledStore};
use keyvault_tests::{conformance, sample_accounts};
use std::sync::Arc;
use tempfile::TempDir;
use zeroize::Zeroizing;

fn encrypted<S: Storage>(mut storage: S) -> S {
    storage.set_encryptor(
        Arc::new(Argon2AesGcmEncryptor::with_params(1024, 1, 1)),
        Zeroizing::new(b"conformance-password".to_vec()),
    );
    storage
}

#[test]
fn test_in_memory_saving_and_opening_accounts() {
    let storage = InMemoryStore::new();
    let accounts = sample_accounts(3);
    conformance::saving_accounts(&storage, &accounts);
    conformance::opening_account(&storage, &accounts[0]);
}

#[test]
fn test_in_memory_non_existing_account() {
    conformance::fetching_non_existing_account_raw(&InMemoryStore::new());
    conformance::fetching_non_existing_account(Box::new(InMemoryStore::new()));
}

#[test]
fn test_in_memory_listing_accounts() {
    conformance::listing_accounts(Box::new(InMemoryStore::new()));
}

#[test]
fn test_encrypted_in_memory_conformance() {
    let accounts = sample_accounts(2);
    conformance::saving_accounts(&encrypted(InMemoryStore::new()), &accounts);
    conformance::listing_accounts(Box::new(encrypted(InMemoryStore::new())));
}

#[test]
fn test_sled_saving_and_opening_accounts() {
    let temp_dir = TempDir::new().unwrap();
    let storage = SledStore::open(temp_dir.path().join("vault.db")).unwrap();
    let accounts = sample_accounts(3);
    conformance::saving_accounts(&storage, &accounts);
    conformance::opening_account(&storage, &accounts[2]);
}

#[test]
fn test_sled_non_existing_account() {
    conformance::fetching_non_existing_account_raw(&SledStore::temporary().unwrap());
    conformance::fetching_non_existing_account(Box::new(SledStore::temporary().unwrap()));
}

#[test]
fn test_sled_listing_accounts() {
    let temp_dir = TempDir::new().unwrap();
    let storage = SledStore::open(temp_dir.path().join("vault.db")).unwrap();
    conformance::listing_accounts(Box::new(storage));
}

#[test]
fn test_encrypted_sled_conformance() {
    let accounts = sample_accounts(2);
    conformance::saving_accounts(&encrypted(SledStore::temporary().unwrap()), &accounts);
    conformance::listing_accounts(Box::new(encrypted(SledStore::temporary().unwrap())));
}
