// KeyVault test framework
// Shared fixtures and a conformance suite every storage backend must pass

pub mod conformance;

use keyvault_core::{KeyVault, PortfolioOptions, Storage};

/// Seed used across the fixed derivation vectors
pub const TEST_SEED: &str = "0102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1fff";

pub fn test_seed() -> Vec<u8> {
    hex::decode(TEST_SEED).expect("test seed is valid hex")
}

/// New vault over `storage`, seeded with `TEST_SEED`
pub fn new_vault(storage: Box<dyn Storage>) -> KeyVault {
    KeyVault::new(
        PortfolioOptions::new()
            .set_storage(storage)
            .set_seed(test_seed()),
    )
    .expect("vault creation succeeds")
}

/// Accounts derived by a throwaway in-memory vault, ready to be saved elsewhere
pub fn sample_accounts(count: usize) -> Vec<keyvault_core::ValidatorAccount> {
    let mut vault = new_vault(Box::new(keyvault_stores::InMemoryStore::new()));
    let wallet = vault.create_wallet("sample").expect("wallet is created");
    (0..count)
        .map(|i| {
            wallet
                .create_validator_account(&format!("account-{}", i))
                .expect("account is created")
        })
        .collect()
}
