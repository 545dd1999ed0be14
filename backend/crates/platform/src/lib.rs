//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Cryptographic utilities (HMAC-SHA256 sign and verify, Base64, hex, OS randomness)
//! - Passphrase-keyed authenticated encryption in a salted envelope format

pub mod cipher;
pub mod crypto;

pub use crypto::CryptoError;
