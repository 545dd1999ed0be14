//! Passphrase Cipher
//!
//! AES-256-GCM keyed from a passphrase and a per-message random salt.
//!
//! Encoded layout (standard base64 of the concatenation):
//!
//! ```text
//! "Salted__" (8) | salt (8) | nonce (12) | ciphertext | tag (16)
//! ```
//!
//! The magic prefix means every encoded value starts with `U2FsdGVk`.
//! Key = SHA-256(passphrase || salt). Salt and nonce are drawn from the OS
//! RNG on every call, so equal plaintexts never share a ciphertext.

use aes_gcm::{
    Aes256Gcm, Key, Nonce,
    aead::{Aead, KeyInit},
};
use rand::{RngCore, rngs::OsRng};
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use crate::crypto::{CryptoError, from_base64, to_base64};

pub const SALTED_MAGIC: &[u8; 8] = b"Salted__";
pub const SALT_LEN: usize = 8;
pub const NONCE_LEN: usize = 12;
pub const TAG_LEN: usize = 16;

const HEADER_LEN: usize = SALTED_MAGIC.len() + SALT_LEN + NONCE_LEN;

/// Encrypt `plaintext` under `passphrase`, returning the base64 envelope
pub fn encrypt_with_passphrase(plaintext: &[u8], passphrase: &[u8]) -> Result<String, CryptoError> {
    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);
    let mut nonce = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut nonce);

    let key = derive_key(passphrase, &salt);
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_slice()));
    let sealed = cipher
        .encrypt(Nonce::from_slice(&nonce), plaintext)
        .map_err(|e| CryptoError::Encryption(e.to_string()))?;

    let mut out = Vec::with_capacity(HEADER_LEN + sealed.len());
    out.extend_from_slice(SALTED_MAGIC);
    out.extend_from_slice(&salt);
    out.extend_from_slice(&nonce);
    out.extend_from_slice(&sealed);

    Ok(to_base64(&out))
}

/// Decrypt a value produced by [`encrypt_with_passphrase`]
pub fn decrypt_with_passphrase(encoded: &str, passphrase: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let raw = from_base64(encoded)?;
    if raw.len() < HEADER_LEN + TAG_LEN {
        return Err(CryptoError::MalformedCiphertext("too short"));
    }
    if &raw[..SALTED_MAGIC.len()] != SALTED_MAGIC {
        return Err(CryptoError::MalformedCiphertext("missing salt header"));
    }

    let salt = &raw[SALTED_MAGIC.len()..SALTED_MAGIC.len() + SALT_LEN];
    let nonce = &raw[SALTED_MAGIC.len() + SALT_LEN..HEADER_LEN];
    let sealed = &raw[HEADER_LEN..];

    let key = derive_key(passphrase, salt);
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_slice()));
    cipher
        .decrypt(Nonce::from_slice(nonce), sealed)
        .map_err(|_| CryptoError::Decryption)
}

fn derive_key(passphrase: &[u8], salt: &[u8]) -> Zeroizing<[u8; 32]> {
    let mut hasher = Sha256::new();
    hasher.update(passphrase);
    hasher.update(salt);
    Zeroizing::new(hasher.finalize().into())
}
