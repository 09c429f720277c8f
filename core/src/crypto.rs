// Copyright (c) 2026 Rackdeck Labs
// SPDX-License-Identifier: AGPL-3.0

//! AES-256-GCM sealing with HKDF-SHA256 key derivation.
//!
//! Everything the CLI encrypts — the S3 state blob, the master-password
//! verifier, secrets at rest in the context file — goes through
//! [`seal`]/[`open`]. Ciphertext is carried as an [`EncryptedBox`], a
//! JSON-friendly envelope with base64 nonce and ciphertext.

use aes_gcm::{aead::Aead, Aes256Gcm, KeyInit};
use hkdf::Hkdf;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::Error;

/// Domain-separation info for password-derived vault keys.
const KEY_INFO: &[u8] = b"rdc-vault-key-v1";

/// 256-bit symmetric key. Zeroed on drop, redacted in Debug output.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecretKey(pub [u8; 32]);

impl std::fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SecretKey([REDACTED])")
    }
}

/// Sealed blob as stored in JSON documents.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EncryptedBox {
    /// 12-byte AEAD nonce, base64.
    #[serde(with = "b64")]
    pub nonce: Vec<u8>,
    /// Ciphertext with the 16-byte auth tag appended, base64.
    #[serde(with = "b64")]
    pub ciphertext: Vec<u8>,
    /// Cipher identifier, for forward compatibility.
    #[serde(default = "default_algo")]
    pub algo: String,
}

fn default_algo() -> String {
    "aes-256-gcm".to_string()
}

/// Derive a vault key from a master password and per-vault salt.
pub fn derive_key(password: &str, salt: &[u8]) -> SecretKey {
    let hk = Hkdf::<Sha256>::new(Some(salt), password.as_bytes());
    let mut okm = [0u8; 32];
    hk.expand(KEY_INFO, &mut okm)
        .expect("HKDF expand failed for 32-byte output");
    SecretKey(okm)
}

/// Generate a random 16-byte KDF salt.
pub fn random_salt() -> [u8; 16] {
    let mut salt = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut salt);
    salt
}

/// Encrypt plaintext under `key` with a fresh random nonce.
pub fn seal(plaintext: &[u8], key: &SecretKey) -> Result<EncryptedBox, Error> {
    let cipher =
        Aes256Gcm::new_from_slice(&key.0).map_err(|e| Error::Crypto(e.to_string()))?;
    let mut nonce = [0u8; 12];
    rand::thread_rng().fill_bytes(&mut nonce);
    let ciphertext = cipher
        .encrypt(aes_gcm::Nonce::from_slice(&nonce), plaintext)
        .map_err(|e| Error::Crypto(e.to_string()))?;
    Ok(EncryptedBox {
        nonce: nonce.to_vec(),
        ciphertext,
        algo: default_algo(),
    })
}

/// Decrypt a sealed blob. Returns `Crypto` on auth failure; callers that
/// are verifying a master password map that to [`Error::WrongPassword`].
pub fn open(sealed: &EncryptedBox, key: &SecretKey) -> Result<Vec<u8>, Error> {
    if sealed.algo != "aes-256-gcm" {
        return Err(Error::Crypto(format!("unsupported cipher '{}'", sealed.algo)));
    }
    if sealed.nonce.len() != 12 {
        return Err(Error::Crypto("bad nonce length".to_string()));
    }
    let cipher =
        Aes256Gcm::new_from_slice(&key.0).map_err(|e| Error::Crypto(e.to_string()))?;
    cipher
        .decrypt(
            aes_gcm::Nonce::from_slice(&sealed.nonce),
            sealed.ciphertext.as_ref(),
        )
        .map_err(|_| Error::Crypto("authentication failed".to_string()))
}

/// Seal a UTF-8 string (API tokens, S3 secret keys).
pub fn seal_str(plaintext: &str, key: &SecretKey) -> Result<EncryptedBox, Error> {
    seal(plaintext.as_bytes(), key)
}

/// Open a sealed UTF-8 string.
pub fn open_str(sealed: &EncryptedBox, key: &SecretKey) -> Result<String, Error> {
    let bytes = open(sealed, key)?;
    String::from_utf8(bytes).map_err(|_| Error::Crypto("sealed value is not UTF-8".to_string()))
}

/// base64 (de)serialization for byte fields inside JSON envelopes.
mod b64 {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], ser: S) -> Result<S::Ok, S::Error> {
        ser.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(de)?;
        STANDARD.decode(s).map_err(serde::de::Error::custom)
    }
}
