//! In-memory account store.
//!
//! `AccountStore` holds the decrypted name -> record map for the length
//! of one session and enforces its invariants: names are unique,
//! non-empty and case-sensitive, and every stored password is non-empty
//! and (when set through this API) passes the strength policy.
//!
//! Passwords are never returned by `get` or `list`; only
//! `get_password` hands one out, as a borrowed `SecretBuffer`.

use std::collections::BTreeMap;

use chrono::Utc;
use tracing::debug;

use crate::errors::{PassVaultError, Result};
use crate::password::PasswordGenerator;

use super::account::{
    non_blank, AccountMetadata, AccountRecord, AccountSummary, AccountUpdate, NewAccount,
    PasswordChoice,
};
use super::secret::SecretBuffer;

/// Maximum account name length in characters.
const MAX_NAME_LEN: usize = 256;

/// Decrypted accounts, keyed by name.
///
/// Dropping the store drops every record, which zeroes every password.
#[derive(Debug, Default)]
pub struct AccountStore {
    /// Sorted map so listing and serialization are deterministic.
    accounts: BTreeMap<String, AccountRecord>,

    /// Generator (and, through it, the strength policy) for new passwords.
    generator: PasswordGenerator,
}

impl AccountStore {
    /// An empty store using the default password rules.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from already-validated records.
    pub(crate) fn from_records(accounts: BTreeMap<String, AccountRecord>) -> Self {
        Self {
            accounts,
            generator: PasswordGenerator::default(),
        }
    }

    /// Use `generator` (and its policy) for subsequent operations.
    pub fn with_generator(mut self, generator: PasswordGenerator) -> Self {
        self.generator = generator;
        self
    }

    // ------------------------------------------------------------------
    // CRUD
    // ------------------------------------------------------------------

    /// Add a new account.  Fails with `DuplicateAccount` if `name` exists.
    pub fn add(&mut self, name: &str, account: NewAccount) -> Result<()> {
        validate_account_name(name)?;
        if self.accounts.contains_key(name) {
            return Err(PassVaultError::DuplicateAccount(name.to_string()));
        }

        let password = self.resolve_password(account.password)?;
        let now = Utc::now();
        let record = AccountRecord {
            password,
            username: non_blank(account.username),
            url: non_blank(account.url),
            created_at: now,
            updated_at: now,
        };

        self.accounts.insert(name.to_string(), record);
        debug!(account = name, "account added");
        Ok(())
    }

    /// Merge `update` into an existing account.
    ///
    /// Omitted or blank fields keep their current value.  A new password
    /// is validated (or generated) before anything is written, so a
    /// `WeakPassword` failure leaves the record untouched.
    ///
    /// Returns whether anything changed.  An update with nothing to apply
    /// leaves the record, including `updated_at`, as it was.
    pub fn update(&mut self, name: &str, update: AccountUpdate) -> Result<bool> {
        if !self.accounts.contains_key(name) {
            return Err(PassVaultError::AccountNotFound(name.to_string()));
        }

        let new_password = match update.password {
            Some(PasswordChoice::UserSupplied(password)) if password.is_empty() => None,
            Some(choice) => Some(self.resolve_password(choice)?),
            None => None,
        };

        let username = non_blank(update.username);
        let url = non_blank(update.url);
        if new_password.is_none() && username.is_none() && url.is_none() {
            debug!(account = name, "nothing to update");
            return Ok(false);
        }

        let record = self
            .accounts
            .get_mut(name)
            .ok_or_else(|| PassVaultError::AccountNotFound(name.to_string()))?;

        if let Some(password) = new_password {
            // The old buffer is zeroed as it is dropped.
            record.password = password;
        }
        if username.is_some() {
            record.username = username;
        }
        if url.is_some() {
            record.url = url;
        }
        record.updated_at = Utc::now();

        debug!(account = name, "account updated");
        Ok(true)
    }

    /// Non-secret fields of one account.  Never includes the password.
    pub fn get(&self, name: &str) -> Result<AccountSummary> {
        let record = self.record(name)?;
        Ok(AccountSummary {
            name: name.to_string(),
            username: record.username.clone(),
            url: record.url.clone(),
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }

    /// Borrow an account's password.
    ///
    /// Callers must only route this to non-interactive sinks (pipes,
    /// files); see `cli::commands::get_password`.
    pub fn get_password(&self, name: &str) -> Result<&SecretBuffer> {
        self.record(name).map(|record| &record.password)
    }

    /// Remove an account.  Fails with `AccountNotFound` if it is absent.
    pub fn delete(&mut self, name: &str) -> Result<()> {
        if self.accounts.remove(name).is_none() {
            return Err(PassVaultError::AccountNotFound(name.to_string()));
        }
        debug!(account = name, "account deleted");
        Ok(())
    }

    /// All accounts, sorted lexicographically (byte order) by name.
    pub fn list(&self) -> Vec<AccountMetadata> {
        self.accounts
            .iter()
            .map(|(name, record)| AccountMetadata {
                name: name.clone(),
                created_at: record.created_at,
                updated_at: record.updated_at,
            })
            .collect()
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.accounts.contains_key(name)
    }

    pub(crate) fn records(&self) -> &BTreeMap<String, AccountRecord> {
        &self.accounts
    }

    // ------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------

    fn record(&self, name: &str) -> Result<&AccountRecord> {
        self.accounts
            .get(name)
            .ok_or_else(|| PassVaultError::AccountNotFound(name.to_string()))
    }

    fn resolve_password(&self, choice: PasswordChoice) -> Result<SecretBuffer> {
        match choice {
            PasswordChoice::Generated => self.generator.generate(),
            PasswordChoice::UserSupplied(password) => {
                self.generator.policy().check(password.expose())?;
                Ok(password)
            }
        }
    }
}

/// Validate that an account name is usable.
///
/// Names are case-sensitive free text: not blank, at most 256
/// characters, and free of control characters.
pub fn validate_account_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(PassVaultError::InvalidAccountName(
            "account name cannot be empty".into(),
        ));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(PassVaultError::InvalidAccountName(format!(
            "account name cannot exceed {MAX_NAME_LEN} characters"
        )));
    }
    if name.chars().any(char::is_control) {
        return Err(PassVaultError::InvalidAccountName(
            "account name cannot contain control characters".into(),
        ));
    }
    Ok(())
}
