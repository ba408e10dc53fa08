//! `SecretBuffer` — an owned container for sensitive text.
//!
//! Passwords and the master passphrase live in a `SecretBuffer` for
//! their whole lifetime.  The backing bytes are overwritten with zeros
//! by `release()`, which also runs on drop, so every exit path (including
//! `?` early returns and panics that unwind) wipes the plaintext.
//!
//! The `Debug` impl is redacted and there is deliberately no `Display`
//! or `Clone`: copying a secret has to be spelled out with
//! [`SecretBuffer::duplicate`].

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Sensitive UTF-8 text that is zeroed on release.
pub struct SecretBuffer {
    bytes: Vec<u8>,
}

impl SecretBuffer {
    /// Copy `value` into a new buffer.
    ///
    /// Prefer `SecretBuffer::from(String)` when you already own the
    /// string, which moves it in without leaving a copy behind.
    pub fn new(value: &str) -> Self {
        Self {
            bytes: value.as_bytes().to_vec(),
        }
    }

    /// Borrow the secret as text.
    pub fn expose(&self) -> &str {
        // Only ever filled from `&str` / `String`, and `release` leaves it empty.
        std::str::from_utf8(&self.bytes).unwrap_or_default()
    }

    /// Borrow the secret as raw bytes (e.g. to feed a KDF).
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Number of bytes held (0 after `release`).
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Make an independent copy that is released separately.
    pub fn duplicate(&self) -> Self {
        Self::new(self.expose())
    }

    /// Overwrite the storage with zeros and empty the buffer.
    ///
    /// Idempotent.  The allocation itself is kept until drop, and its
    /// whole capacity (not just the used length) is zeroed.
    pub fn release(&mut self) {
        self.bytes.zeroize();
    }

    #[cfg(test)]
    pub(crate) fn storage(&self) -> (*const u8, usize) {
        (self.bytes.as_ptr(), self.bytes.capacity())
    }
}

impl From<String> for SecretBuffer {
    fn from(value: String) -> Self {
        Self {
            bytes: value.into_bytes(),
        }
    }
}

impl Drop for SecretBuffer {
    fn drop(&mut self) {
        self.release();
    }
}

impl ZeroizeOnDrop for SecretBuffer {}

impl PartialEq for SecretBuffer {
    fn eq(&self, other: &Self) -> bool {
        self.bytes == other.bytes
    }
}

impl Eq for SecretBuffer {}

impl fmt::Debug for SecretBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretBuffer([REDACTED])")
    }
}

impl Serialize for SecretBuffer {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.expose())
    }
}

impl<'de> Deserialize<'de> for SecretBuffer {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        String::deserialize(deserializer).map(SecretBuffer::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expose_returns_the_original_text() {
        let secret = SecretBuffer::new("hunter2-but-longer");
        assert_eq!(secret.expose(), "hunter2-but-longer");
        assert_eq!(secret.len(), 18);
    }

    #[test]
    fn from_string_moves_without_copying() {
        let value = String::from("moved-in");
        let ptr = value.as_ptr();
        let secret = SecretBuffer::from(value);
        assert_eq!(secret.storage().0, ptr);
    }

    #[test]
    fn release_zeroes_the_whole_allocation() {
        let mut secret = SecretBuffer::from(String::from("Aa1!aaaaaaaaaaaaaaaa"));
        let (ptr, capacity) = secret.storage();
        assert!(capacity >= 20);

        secret.release();

        // The allocation is still owned by `secret`, so reading it is sound.
        let backing = unsafe { std::slice::from_raw_parts(ptr, capacity) };
        assert!(backing.iter().all(|&b| b == 0));
        assert!(secret.is_empty());
        assert_eq!(secret.expose(), "");
    }

    #[test]
    fn release_is_idempotent() {
        let mut secret = SecretBuffer::new("twice");
        secret.release();
        secret.release();
        assert!(secret.is_empty());
    }

    #[test]
    fn debug_is_redacted() {
        let secret = SecretBuffer::new("do-not-print-me");
        let rendered = format!("{secret:?}");
        assert!(!rendered.contains("do-not-print-me"));
        assert!(rendered.contains("REDACTED"));
    }

    #[test]
    fn duplicate_is_independent() {
        let original = SecretBuffer::new("shared");
        let mut copy = original.duplicate();
        copy.release();
        assert_eq!(original.expose(), "shared");
    }

    #[test]
    fn serde_round_trips_as_a_plain_string() {
        let secret = SecretBuffer::new("p@ss");
        let json = serde_json::to_string(&secret).unwrap();
        assert_eq!(json, "\"p@ss\"");
        let back: SecretBuffer = serde_json::from_str(&json).unwrap();
        assert_eq!(back, secret);
    }
}
