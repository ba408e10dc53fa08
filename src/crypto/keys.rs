//! Sub-key derivation using HKDF-SHA256.
//!
//! One Argon2id master key is split into two independent keys:
//! - the AES-256-GCM key that encrypts the account data, and
//! - the HMAC key that authenticates the whole envelope.

use hkdf::Hkdf;
use sha2::Sha256;
use zeroize::{Zeroize, Zeroizing};

use crate::errors::{PassVaultError, Result};

/// Length of the master key and derived sub-keys (256 bits).
pub const KEY_LEN: usize = 32;

/// A derived sub-key, zeroed on drop.
pub type SubKey = Zeroizing<[u8; KEY_LEN]>;

/// The Argon2id output, zeroed on drop.
#[derive(Zeroize)]
#[zeroize(drop)]
pub struct MasterKey {
    bytes: [u8; KEY_LEN],
}

impl MasterKey {
    pub(crate) fn zeroed() -> Self {
        Self {
            bytes: [0u8; KEY_LEN],
        }
    }

    pub(crate) fn as_mut_bytes(&mut self) -> &mut [u8; KEY_LEN] {
        &mut self.bytes
    }

    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.bytes
    }

    /// Key for encrypting the account data.
    pub fn cipher_key(&self) -> Result<SubKey> {
        hkdf_derive(&self.bytes, b"passvault-cipher-key")
    }

    /// Key for the envelope HMAC.
    pub fn hmac_key(&self) -> Result<SubKey> {
        hkdf_derive(&self.bytes, b"passvault-hmac-key")
    }
}

/// HKDF-SHA256 expand with the given `info`.
///
/// The extract step uses HKDF's default zero salt; the input already
/// came out of Argon2id with a random salt.
fn hkdf_derive(ikm: &[u8], info: &[u8]) -> Result<SubKey> {
    let hk = Hkdf::<Sha256>::new(None, ikm);

    let mut okm = Zeroizing::new([0u8; KEY_LEN]);
    hk.expand(info, &mut okm[..])
        .map_err(|e| PassVaultError::KeyDerivationFailed(format!("HKDF expand failed: {e}")))?;

    Ok(okm)
}
