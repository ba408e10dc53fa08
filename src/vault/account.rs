//! Account records and the request types used to create or change them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::secret::SecretBuffer;

/// One credential entry stored in the vault.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccountRecord {
    pub password: SecretBuffer,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Where a new password comes from.  Decided by the caller before
/// the store is touched.
#[derive(Debug)]
pub enum PasswordChoice {
    /// Let the store's generator produce one.
    Generated,
    /// Use the given password (must pass the strength policy).
    UserSupplied(SecretBuffer),
}

/// Fields for `AccountStore::add`.
#[derive(Debug)]
pub struct NewAccount {
    pub password: PasswordChoice,
    pub username: Option<String>,
    pub url: Option<String>,
}

impl NewAccount {
    pub fn new(password: PasswordChoice) -> Self {
        Self {
            password,
            username: None,
            url: None,
        }
    }

    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }
}

/// Partial update for `AccountStore::update`.
///
/// `None` and blank values mean "keep the current value".
#[derive(Debug, Default)]
pub struct AccountUpdate {
    pub password: Option<PasswordChoice>,
    pub username: Option<String>,
    pub url: Option<String>,
}

/// The non-secret view of one account returned by `get`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountSummary {
    pub name: String,
    pub username: Option<String>,
    pub url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Listing entry returned by `list`: a name and its timestamps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountMetadata {
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Map blank optional text to `None`.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_blank_drops_empty_and_whitespace() {
        assert_eq!(non_blank(None), None);
        assert_eq!(non_blank(Some(String::new())), None);
        assert_eq!(non_blank(Some("  ".into())), None);
        assert_eq!(non_blank(Some("me".into())), Some("me".into()));
    }

    #[test]
    fn absent_optional_fields_are_omitted_from_json() {
        let now = Utc::now();
        let record = AccountRecord {
            password: SecretBuffer::new("pw"),
            username: None,
            url: Some("https://example.com".into()),
            created_at: now,
            updated_at: now,
        };
        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("username").is_none());
        assert_eq!(json["url"], "https://example.com");
    }
}
