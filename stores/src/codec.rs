// Record encoding shared by the storage backends
// Records are JSON; secret-bearing ones are sealed when an encryptor is installed

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use zeroize::Zeroizing;

use keyvault_core::{EncryptedSecret, Encryptor, StorageError};

#[derive(Serialize, Deserialize)]
#[serde(tag = "format", rename_all = "lowercase")]
enum StoredSecret {
    Plain {
        #[serde(with = "hex::serde")]
        data: Vec<u8>,
    },
    Encrypted {
        envelope: EncryptedSecret,
    },
}

/// Seals and opens stored values with the installed encryptor, if any
#[derive(Default)]
pub struct SecretCodec {
    encryptor: Option<(Arc<dyn Encryptor>, Zeroizing<Vec<u8>>)>,
}

impl SecretCodec {
    pub fn set_encryptor(&mut self, encryptor: Arc<dyn Encryptor>, password: Zeroizing<Vec<u8>>) {
        self.encryptor = Some((encryptor, password));
    }

    /// Wrap secret bytes for storage.
    pub fn seal(&self, secret: &[u8]) -> Result<Vec<u8>, StorageError> {
        let stored = match &self.encryptor {
            Some((encryptor, password)) => StoredSecret::Encrypted {
                envelope: encryptor.encrypt(secret, password)?,
            },
            None => StoredSecret::Plain {
                data: secret.to_vec(),
            },
        };
        Ok(serde_json::to_vec(&stored)?)
    }

    /// Recover secret bytes written by `seal`.
    pub fn open(&self, stored: &[u8]) -> Result<Zeroizing<Vec<u8>>, StorageError> {
        match serde_json::from_slice(stored)? {
            StoredSecret::Plain { data } => Ok(Zeroizing::new(data)),
            StoredSecret::Encrypted { envelope } => {
                let (encryptor, password) = self.encryptor.as_ref().ok_or_else(|| {
                    StorageError::Decryption(
                        "record is encrypted but no encryptor is set".to_string(),
                    )
                })?;
                encryptor.decrypt(&envelope, password)
            }
        }
    }

    pub fn seal_record<T: Serialize>(&self, record: &T) -> Result<Vec<u8>, StorageError> {
        let json = Zeroizing::new(serde_json::to_vec(record)?);
        self.seal(&json)
    }

    pub fn open_record<T: DeserializeOwned>(&self, stored: &[u8]) -> Result<T, StorageError> {
        let json = self.open(stored)?;
        Ok(serde_json::from_slice(&json)?)
    }
}
