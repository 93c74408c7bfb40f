use keyvault_core::{master_key_from_seed, KeyVaultError};
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn prop_derivation_is_deterministic(
        seed in proptest::collection::vec(any::<u8>(), 1..64),
        segments in proptest::collection::vec(0u32..1000, 1..4),
    ) {
        let path: String = segments.iter().map(|s| format!("/{}", s)).collect();
        let first = master_key_from_seed(&seed).unwrap().derive(&path).unwrap();
        let second = master_key_from_seed(&seed).unwrap().derive(&path).unwrap();

        prop_assert_eq!(first.path(), second.path());
        prop_assert_eq!(*first.private_key_bytes(), *second.private_key_bytes());
        prop_assert_eq!(first.public_key(), second.public_key());
    }

    #[test]
    fn prop_four_digit_segments_rejected(segment in 1000u32..100_000) {
        let master = master_key_from_seed(&[1u8; 32]).unwrap();
        let result = master.derive(&format!("/0/{}", segment));
        prop_assert!(matches!(result, Err(KeyVaultError::InvalidPath)));
    }

    #[test]
    fn prop_marshaling_preserves_key(segments in proptest::collection::vec(0u32..1000, 1..3)) {
        let path: String = segments.iter().map(|s| format!("/{}", s)).collect();
        let key = master_key_from_seed(&[7u8; 32]).unwrap().derive(&path).unwrap();
        let restored: keyvault_core::HdKey =
            serde_json::from_slice(&serde_json::to_vec(&key).unwrap()).unwrap();

        prop_assert_eq!(key.id(), restored.id());
        prop_assert_eq!(key.path(), restored.path());
        prop_assert_eq!(*key.private_key_bytes(), *restored.private_key_bytes());
    }
}
