//! Plaintext serialization of the account map.
//!
//! The decrypted body of a vault is a JSON document:
//!
//! ```text
//! {"version":1,"accounts":{"Github":{"password":"...","username":"me","created_at":"...","updated_at":"..."}}}
//! ```
//!
//! Accounts are written in name order so the output is deterministic.
//! Absent `username`/`url` fields are omitted, and empty strings are
//! normalized to absent in both directions.

use std::collections::BTreeMap;
use std::io::{self, Write};

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::errors::{PassVaultError, Result};

use super::account::{non_blank, AccountRecord};
use super::store::{validate_account_name, AccountStore};

/// Current plaintext schema version.
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Serialize)]
struct DocumentRef<'a> {
    version: u32,
    accounts: &'a BTreeMap<String, AccountRecord>,
}

#[derive(Deserialize)]
struct Document {
    version: u32,
    accounts: BTreeMap<String, AccountRecord>,
}

/// An `io::Write` sink that only counts bytes.
struct ByteCounter(usize);

impl Write for ByteCounter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0 += buf.len();
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn serialization_error(e: serde_json::Error) -> PassVaultError {
    PassVaultError::SerializationError(format!("accounts: {e}"))
}

/// Converts between an `AccountStore` and its plaintext bytes.
pub struct VaultCodec;

impl VaultCodec {
    /// Serialize `store` to plaintext bytes (zeroed when dropped).
    ///
    /// The output is measured first and written into a buffer of exactly
    /// that size, so it never reallocates and leaves no unzeroed copies
    /// of passwords behind in freed memory.
    pub fn encode(store: &AccountStore) -> Result<Zeroizing<Vec<u8>>> {
        let document = DocumentRef {
            version: SCHEMA_VERSION,
            accounts: store.records(),
        };

        let mut counter = ByteCounter(0);
        serde_json::to_writer(&mut counter, &document).map_err(serialization_error)?;

        let mut out = Zeroizing::new(Vec::with_capacity(counter.0));
        serde_json::to_writer(&mut *out, &document).map_err(serialization_error)?;
        Ok(out)
    }

    /// Parse plaintext bytes into an `AccountStore`.
    ///
    /// Empty input yields an empty store.  Anything that is not a valid
    /// account map fails with `CorruptVault`.
    pub fn decode(bytes: &[u8]) -> Result<AccountStore> {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(AccountStore::new());
        }

        let document: Document = serde_json::from_slice(bytes)
            .map_err(|e| PassVaultError::CorruptVault(format!("account data: {e}")))?;

        if document.version != SCHEMA_VERSION {
            return Err(PassVaultError::CorruptVault(format!(
                "unsupported account schema version {}, expected {SCHEMA_VERSION}",
                document.version
            )));
        }

        let mut accounts = document.accounts;
        for (name, record) in accounts.iter_mut() {
            validate_account_name(name)
                .map_err(|e| PassVaultError::CorruptVault(e.to_string()))?;
            if record.password.is_empty() {
                return Err(PassVaultError::CorruptVault(format!(
                    "account '{name}' has an empty password"
                )));
            }
            record.username = non_blank(record.username.take());
            record.url = non_blank(record.url.take());
        }

        Ok(AccountStore::from_records(accounts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vault::account::{NewAccount, PasswordChoice};
    use crate::vault::SecretBuffer;

    const STRONG: &str = "Aa1!aaaaaaaaaaaaaaaa";

    fn sample_store() -> AccountStore {
        let mut store = AccountStore::new();
        store
            .add(
                "Github",
                NewAccount::new(PasswordChoice::UserSupplied(SecretBuffer::new(STRONG)))
                    .username("octocat")
                    .url("https://github.com"),
            )
            .unwrap();
        store
            .add(
                "bank",
                NewAccount::new(PasswordChoice::UserSupplied(SecretBuffer::new(
                    "Zz9#zzzzzzzzzzzzzzzz",
                ))),
            )
            .unwrap();
        store
    }

    #[test]
    fn encode_then_decode_preserves_every_field() {
        let store = sample_store();
        let bytes = VaultCodec::encode(&store).unwrap();
        let decoded = VaultCodec::decode(&bytes).unwrap();

        assert_eq!(decoded.records(), store.records());
        assert_eq!(decoded.get_password("Github").unwrap().expose(), STRONG);
        assert_eq!(decoded.get("bank").unwrap().username, None);
    }

    #[test]
    fn encode_writes_into_an_exactly_sized_buffer() {
        let mut store = AccountStore::new();
        for i in 0..20 {
            store
                .add(
                    &format!("account-{i:02}"),
                    NewAccount::new(PasswordChoice::UserSupplied(SecretBuffer::new(STRONG)))
                        .username(format!("user{i}@example.com"))
                        .url("https://example.com/login"),
                )
                .unwrap();
        }

        let bytes = VaultCodec::encode(&store).unwrap();
        // Equal capacity and length means the buffer was never grown,
        // so no earlier, unzeroed allocation held the passwords.
        assert_eq!(bytes.capacity(), bytes.len());
        assert_eq!(VaultCodec::decode(&bytes).unwrap().len(), 20);
    }

    #[test]
    fn encoding_is_deterministic() {
        let store = sample_store();
        let a = VaultCodec::encode(&store).unwrap();
        let b = VaultCodec::encode(&store).unwrap();
        assert_eq!(*a, *b);
    }

    #[test]
    fn empty_input_decodes_to_empty_store() {
        assert!(VaultCodec::decode(b"").unwrap().is_empty());
        assert!(VaultCodec::decode(b" \n").unwrap().is_empty());
    }

    #[test]
    fn garbage_is_corrupt() {
        let err = VaultCodec::decode(b"not json").unwrap_err();
        assert!(matches!(err, PassVaultError::CorruptVault(_)));
    }

    #[test]
    fn wrong_shape_is_corrupt() {
        let err = VaultCodec::decode(br#"{"version":1,"accounts":["a","b"]}"#).unwrap_err();
        assert!(matches!(err, PassVaultError::CorruptVault(_)));
    }

    #[test]
    fn unknown_schema_version_is_corrupt() {
        let err = VaultCodec::decode(br#"{"version":7,"accounts":{}}"#).unwrap_err();
        assert!(matches!(err, PassVaultError::CorruptVault(_)));
    }

    #[test]
    fn empty_password_is_corrupt() {
        let json = br#"{"version":1,"accounts":{"a":{"password":"","created_at":"2024-01-01T00:00:00Z","updated_at":"2024-01-01T00:00:00Z"}}}"#;
        assert!(matches!(
            VaultCodec::decode(json),
            Err(PassVaultError::CorruptVault(_))
        ));
    }

    #[test]
    fn empty_name_is_corrupt() {
        let json = br#"{"version":1,"accounts":{"":{"password":"x","created_at":"2024-01-01T00:00:00Z","updated_at":"2024-01-01T00:00:00Z"}}}"#;
        assert!(VaultCodec::decode(json).is_err());
    }

    #[test]
    fn empty_optional_strings_are_normalized_to_absent() {
        let json = br#"{"version":1,"accounts":{"a":{"password":"x","username":"","url":"","created_at":"2024-01-01T00:00:00Z","updated_at":"2024-01-01T00:00:00Z"}}}"#;
        let store = VaultCodec::decode(json).unwrap();
        let summary = store.get("a").unwrap();
        assert_eq!(summary.username, None);
        assert_eq!(summary.url, None);

        let encoded = VaultCodec::encode(&store).unwrap();
        let text = std::str::from_utf8(&encoded).unwrap();
        assert!(!text.contains("username"));
    }
}
