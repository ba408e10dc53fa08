//! The encryption boundary used by vault sessions.
//!
//! A `VaultCipher` turns plaintext account data into the bytes written
//! to disk and back, keyed only by the master passphrase.  Sessions are
//! generic over it so the primitive can be swapped without touching the
//! lifecycle logic.

use zeroize::Zeroizing;

use crate::errors::{PassVaultError, Result};
use crate::vault::format::{self, VaultHeader, CURRENT_VERSION};
use crate::vault::SecretBuffer;

use super::encryption::{decrypt, encrypt};
use super::kdf::{derive_master_key, generate_salt, Argon2Params};

/// Authenticated encryption keyed by a passphrase.
pub trait VaultCipher {
    /// Encrypt `plaintext`, returning the complete file contents.
    fn seal(&self, plaintext: &[u8], passphrase: &SecretBuffer) -> Result<Vec<u8>>;

    /// Decrypt file contents produced by `seal`.
    ///
    /// Fails with `WrongPassphrase` when authentication fails and with
    /// `CorruptVault` when the bytes are structurally invalid.
    fn open(&self, sealed: &[u8], passphrase: &SecretBuffer) -> Result<Zeroizing<Vec<u8>>>;
}

/// Argon2id + HKDF + AES-256-GCM + HMAC-SHA256 in the PWVT envelope.
///
/// Every `seal` draws a fresh salt and nonce.  `open` uses the Argon2
/// parameters stored in the file, not `params`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassphraseCipher {
    params: Argon2Params,
}

impl PassphraseCipher {
    pub fn new(params: Argon2Params) -> Self {
        Self { params }
    }
}

impl VaultCipher for PassphraseCipher {
    fn seal(&self, plaintext: &[u8], passphrase: &SecretBuffer) -> Result<Vec<u8>> {
        let salt = generate_salt();
        let master_key = derive_master_key(passphrase.as_bytes(), &salt, &self.params)?;

        let cipher_key = master_key.cipher_key()?;
        let body = encrypt(&cipher_key[..], plaintext)?;

        let header = VaultHeader {
            version: CURRENT_VERSION,
            salt: salt.to_vec(),
            argon2_params: self.params,
        };
        let hmac_key = master_key.hmac_key()?;
        format::build_envelope(&header, &body, &hmac_key[..])
    }

    fn open(&self, sealed: &[u8], passphrase: &SecretBuffer) -> Result<Zeroizing<Vec<u8>>> {
        let envelope = format::parse_envelope(sealed)?;

        // The header is not authenticated yet: refuse costs we would not
        // have written ourselves instead of trying to allocate them.
        envelope
            .header
            .argon2_params
            .validate()
            .map_err(|e| PassVaultError::CorruptVault(format!("header: {e}")))?;

        let master_key = derive_master_key(
            passphrase.as_bytes(),
            &envelope.header.salt,
            &envelope.header.argon2_params,
        )?;

        // Authenticate the whole file before decrypting anything.
        let hmac_key = master_key.hmac_key()?;
        format::verify_hmac(&hmac_key[..], &envelope)?;

        let cipher_key = master_key.cipher_key()?;
        decrypt(&cipher_key[..], &envelope.body)
    }
}
