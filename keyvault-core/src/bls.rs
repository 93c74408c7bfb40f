//! BLS12-381 key projection
//!
//! Private keys are scalars of the BLS12-381 scalar field; public keys are the
//! compressed G1 point `sk * G1` (48 bytes). Scalars are exchanged as 32-byte
//! big-endian strings, which is the encoding used by eth2 keystores.

use bls12_381::{G1Affine, G1Projective, Scalar};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Length of a serialized private scalar
pub const SECRET_KEY_LENGTH: usize = 32;

/// Length of a compressed public key
pub const PUBLIC_KEY_LENGTH: usize = 48;

/// Reduce a big-endian integer of at most 64 bytes modulo the scalar field order.
pub(crate) fn scalar_from_wide_be(bytes: &[u8]) -> Option<Scalar> {
    if bytes.len() > 64 {
        return None;
    }
    let mut wide = [0u8; 64];
    for (i, b) in bytes.iter().rev().enumerate() {
        wide[i] = *b;
    }
    Some(Scalar::from_bytes_wide(&wide))
}

/// Parse a canonical 32-byte big-endian scalar. Values >= r are rejected.
pub fn scalar_from_be_bytes(bytes: &[u8]) -> Option<Scalar> {
    if bytes.len() != SECRET_KEY_LENGTH {
        return None;
    }
    let mut le = [0u8; SECRET_KEY_LENGTH];
    for (i, b) in bytes.iter().rev().enumerate() {
        le[i] = *b;
    }
    Option::from(Scalar::from_bytes(&le))
}

pub fn scalar_to_be_bytes(scalar: &Scalar) -> [u8; SECRET_KEY_LENGTH] {
    let mut out = scalar.to_bytes();
    out.reverse();
    out
}

/// BLS12-381 public key (48 bytes compressed)
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct PublicKey(G1Affine);

impl PublicKey {
    /// Project a private scalar onto G1
    pub fn from_scalar(scalar: &Scalar) -> Self {
        Self(G1Affine::from(G1Projective::generator() * scalar))
    }

    /// Load from bytes (48 bytes compressed)
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        let arr: [u8; PUBLIC_KEY_LENGTH] = bytes.try_into().ok()?;
        Option::<G1Affine>::from(G1Affine::from_compressed(&arr)).map(Self)
    }

    /// Serialize to bytes (48 bytes compressed)
    pub fn to_bytes(&self) -> [u8; PUBLIC_KEY_LENGTH] {
        self.0.to_compressed()
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bytes = self.to_bytes();
        write!(f, "PublicKey({})", hex::encode(&bytes[..8]))
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl Serialize for PublicKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let bytes = hex::decode(&s).map_err(serde::de::Error::custom)?;
        PublicKey::from_bytes(&bytes)
            .ok_or_else(|| serde::de::Error::custom("invalid public key bytes"))
    }
}
