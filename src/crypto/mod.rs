//! Cryptographic primitives for PassVault.
//!
//! This module provides:
//! - The `VaultCipher` boundary and its default implementation (`cipher`)
//! - AES-256-GCM encryption and decryption (`encryption`)
//! - Argon2id passphrase-based key derivation (`kdf`)
//! - HKDF-based cipher and HMAC sub-keys (`keys`)

pub mod cipher;
pub mod encryption;
pub mod kdf;
pub mod keys;

pub use cipher::{PassphraseCipher, VaultCipher};
pub use kdf::Argon2Params;
