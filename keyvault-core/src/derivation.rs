//! Hierarchical key derivation for BLS12-381 validator keys
//!
//! Implements the EIP-2333 key tree as first published: the master scalar
//! is `HKDF_mod_r(seed)` and each child is `HKDF_mod_r` of the compressed
//! Lamport public key built from the parent scalar and the child index.
//! Every step is hardened; a child reveals nothing about its parent or siblings.
//!
//! `HKDF_mod_r` here uses the fixed salt `BLS-SIG-KEYGEN-SALT-`, no info and
//! a 48-byte expansion reduced modulo the curve order r. Keys previously
//! derived by the vault depend on exactly this variant; do not replace it with
//! the later salt-hashing revision of the algorithm.

use bls12_381::Scalar;
use hkdf::Hkdf;
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use crate::bls::{scalar_from_wide_be, scalar_to_be_bytes};
use crate::error::{KeyVaultError, KeyVaultResult};

/// Salt used by `HKDF_mod_r`
pub const KEYGEN_SALT: &[u8] = b"BLS-SIG-KEYGEN-SALT-";

/// Bytes of HKDF output reduced into one scalar (ceil(3 * ceil(log2(r)) / 16))
pub const HKDF_MOD_R_LENGTH: usize = 48;

/// Number of 32-byte chunks in a Lamport secret key
pub const LAMPORT_CHUNKS: usize = 255;

const CHUNK_SIZE: usize = 32;

/// Purpose index of the eth2 validator key tree (EIP-2334)
pub const PURPOSE: u32 = 12381;

/// Coin type of the eth2 validator key tree (EIP-2334)
pub const COIN_TYPE: u32 = 3600;

/// Absolute path every master key sits at
pub const BASE_PATH: &str = "m/12381/3600";

fn hkdf_mod_r(ikm: &[u8]) -> KeyVaultResult<Scalar> {
    let hk = Hkdf::<Sha256>::new(Some(KEYGEN_SALT), ikm);
    let mut okm = Zeroizing::new([0u8; HKDF_MOD_R_LENGTH]);
    hk.expand(&[], &mut okm[..])
        .map_err(|e| KeyVaultError::KeyDerivation(e.to_string()))?;

    scalar_from_wide_be(&okm[..])
        .ok_or_else(|| KeyVaultError::KeyDerivation("scalar reduction failed".to_string()))
}

fn ikm_to_lamport_sk(ikm: &[u8], salt: &[u8]) -> KeyVaultResult<Zeroizing<Vec<u8>>> {
    let hk = Hkdf::<Sha256>::new(Some(salt), ikm);
    let mut okm = Zeroizing::new(vec![0u8; LAMPORT_CHUNKS * CHUNK_SIZE]);
    hk.expand(&[], &mut okm[..])
        .map_err(|e| KeyVaultError::KeyDerivation(e.to_string()))?;
    Ok(okm)
}

/// Compressed Lamport public key of `parent` at `index`.
fn parent_sk_to_lamport_pk(parent: &Scalar, index: u32) -> KeyVaultResult<[u8; 32]> {
    let salt = index.to_be_bytes();
    let ikm = Zeroizing::new(scalar_to_be_bytes(parent));
    let not_ikm = Zeroizing::new((*ikm).map(|b| !b));

    let lamport_0 = ikm_to_lamport_sk(&ikm[..], &salt)?;
    let lamport_1 = ikm_to_lamport_sk(&not_ikm[..], &salt)?;

    let mut compressor = Sha256::new();
    for chunk in lamport_0
        .chunks_exact(CHUNK_SIZE)
        .chain(lamport_1.chunks_exact(CHUNK_SIZE))
    {
        compressor.update(Sha256::digest(chunk));
    }

    Ok(compressor.finalize().into())
}

/// Derive the root scalar `m` from a seed.
pub fn derive_master_sk(seed: &[u8]) -> KeyVaultResult<Scalar> {
    if seed.is_empty() {
        return Err(KeyVaultError::InvalidSeed("seed is empty".to_string()));
    }
    hkdf_mod_r(seed)
}

/// Derive the hardened child of `parent` at `index`.
pub fn derive_child_sk(parent: &Scalar, index: u32) -> KeyVaultResult<Scalar> {
    let compressed_lamport_pk = parent_sk_to_lamport_pk(parent, index)?;
    hkdf_mod_r(&compressed_lamport_pk)
}

/// Derive the scalar at `BASE_PATH` for a seed.
pub fn derive_base_sk(seed: &[u8]) -> KeyVaultResult<Scalar> {
    let master = derive_master_sk(seed)?;
    let purpose = derive_child_sk(&master, PURPOSE)?;
    derive_child_sk(&purpose, COIN_TYPE)
}
