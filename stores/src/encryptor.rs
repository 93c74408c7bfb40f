// Password-based encryption of vault secrets
// Argon2id key derivation and AES-256-GCM sealing

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use argon2::{Algorithm, Argon2, Params, Version};
use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::Zeroizing;

use keyvault_core::{EncryptedSecret, Encryptor, StorageError};

/// Name recorded in every envelope this encryptor produces
pub const ENCRYPTOR_NAME: &str = "argon2id-aes256gcm";

/// Envelope format version
pub const ENCRYPTOR_VERSION: u32 = 1;

const SALT_LENGTH: usize = 16;
const NONCE_LENGTH: usize = 12;
const KEY_LENGTH: usize = 32;

/// Argon2id memory cost in KiB (64 MiB)
pub const DEFAULT_MEMORY_KIB: u32 = 64 * 1024;
pub const DEFAULT_ITERATIONS: u32 = 3;
pub const DEFAULT_LANES: u32 = 4;

/// Argon2id + AES-256-GCM encryptor
#[derive(Debug, Clone)]
pub struct Argon2AesGcmEncryptor {
    memory_kib: u32,
    iterations: u32,
    lanes: u32,
}

impl Default for Argon2AesGcmEncryptor {
    fn default() -> Self {
        Self {
            memory_kib: DEFAULT_MEMORY_KIB,
            iterations: DEFAULT_ITERATIONS,
            lanes: DEFAULT_LANES,
        }
    }
}

impl Argon2AesGcmEncryptor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Custom Argon2id cost parameters. Envelopes can only be opened with the
    /// parameters they were sealed with.
    pub fn with_params(memory_kib: u32, iterations: u32, lanes: u32) -> Self {
        Self {
            memory_kib,
            iterations,
            lanes,
        }
    }

    fn derive_key(
        &self,
        passphrase: &[u8],
        salt: &[u8],
    ) -> Result<Zeroizing<[u8; KEY_LENGTH]>, String> {
        let params = Params::new(self.memory_kib, self.iterations, self.lanes, Some(KEY_LENGTH))
            .map_err(|e| e.to_string())?;
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

        let mut key = Zeroizing::new([0u8; KEY_LENGTH]);
        argon2
            .hash_password_into(passphrase, salt, &mut key[..])
            .map_err(|e| e.to_string())?;
        Ok(key)
    }
}

impl Encryptor for Argon2AesGcmEncryptor {
    fn name(&self) -> &str {
        ENCRYPTOR_NAME
    }

    fn version(&self) -> u32 {
        ENCRYPTOR_VERSION
    }

    fn encrypt(&self, secret: &[u8], passphrase: &[u8]) -> Result<EncryptedSecret, StorageError> {
        let mut salt = vec![0u8; SALT_LENGTH];
        OsRng.fill_bytes(&mut salt);
        let mut nonce = vec![0u8; NONCE_LENGTH];
        OsRng.fill_bytes(&mut nonce);

        let key = self
            .derive_key(passphrase, &salt)
            .map_err(StorageError::Encryption)?;
        let cipher = Aes256Gcm::new_from_slice(&key[..])
            .map_err(|e| StorageError::Encryption(e.to_string()))?;

        let ciphertext = cipher
            .encrypt(Nonce::from_slice(&nonce), secret)
            .map_err(|e| StorageError::Encryption(e.to_string()))?;

        Ok(EncryptedSecret {
            encryptor: ENCRYPTOR_NAME.to_string(),
            version: ENCRYPTOR_VERSION,
            salt,
            nonce,
            ciphertext,
        })
    }

    fn decrypt(
        &self,
        encrypted: &EncryptedSecret,
        passphrase: &[u8],
    ) -> Result<Zeroizing<Vec<u8>>, StorageError> {
        if encrypted.encryptor != ENCRYPTOR_NAME || encrypted.version != ENCRYPTOR_VERSION {
            return Err(StorageError::Decryption(format!(
                "unsupported envelope {} v{}",
                encrypted.encryptor, encrypted.version
            )));
        }
        if encrypted.nonce.len() != NONCE_LENGTH {
            return Err(StorageError::Decryption("invalid nonce length".to_string()));
        }

        let key = self
            .derive_key(passphrase, &encrypted.salt)
            .map_err(StorageError::Decryption)?;
        let cipher = Aes256Gcm::new_from_slice(&key[..])
            .map_err(|e| StorageError::Decryption(e.to_string()))?;

        let plaintext = cipher
            .decrypt(Nonce::from_slice(&encrypted.nonce), encrypted.ciphertext.as_ref())
            .map_err(|e| StorageError::Decryption(e.to_string()))?;

        Ok(Zeroizing::new(plaintext))
    }
}
