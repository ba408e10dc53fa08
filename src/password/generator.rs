//! Random password generation.
//!
//! Candidates are drawn character by character from a charset of
//! printable, visually unambiguous characters using the thread-local
//! CSPRNG, and re-drawn until one passes the [`StrengthPolicy`].

use rand::Rng;
use tracing::debug;

use crate::errors::{PassVaultError, Result};
use crate::vault::SecretBuffer;

use super::strength::StrengthPolicy;

/// Default charset: no `0/O/o`, `1/l/I`, quotes, backticks, pipes or backslashes.
pub const UNAMBIGUOUS_CHARSET: &str =
    "ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnpqrstuvwxyz23456789!#$%&*+-=?@^_~";

/// Default length of generated passwords.
pub const DEFAULT_LENGTH: usize = 24;

/// Longest password the generator will produce.
pub const MAX_LENGTH: usize = 1024;

/// Default number of candidates drawn before giving up.
pub const DEFAULT_MAX_ATTEMPTS: usize = 1000;

/// Produces passwords that satisfy a [`StrengthPolicy`].
#[derive(Debug, Clone)]
pub struct PasswordGenerator {
    charset: Vec<char>,
    length: usize,
    max_attempts: usize,
    policy: StrengthPolicy,
}

impl Default for PasswordGenerator {
    fn default() -> Self {
        Self {
            charset: UNAMBIGUOUS_CHARSET.chars().collect(),
            length: DEFAULT_LENGTH,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            policy: StrengthPolicy::default(),
        }
    }
}

impl PasswordGenerator {
    pub fn new(policy: StrengthPolicy, length: usize, max_attempts: usize) -> Self {
        Self {
            length,
            max_attempts,
            policy,
            ..Self::default()
        }
    }

    /// Replace the charset.  An empty charset makes every attempt fail.
    pub fn with_charset(mut self, charset: &str) -> Self {
        self.charset = charset.chars().collect();
        self
    }

    /// The policy generated passwords (and user-supplied ones) are held to.
    pub fn policy(&self) -> &StrengthPolicy {
        &self.policy
    }

    pub fn length(&self) -> usize {
        self.length
    }

    /// Draw candidates until one passes the policy.
    ///
    /// Fails with `GenerationExhausted` after `max_attempts` rejected
    /// candidates; rejected candidates are zeroed as they are dropped.
    pub fn generate(&self) -> Result<SecretBuffer> {
        if self.length > MAX_LENGTH {
            return Err(PassVaultError::ConfigError(format!(
                "generated password length must be at most {MAX_LENGTH} (got {})",
                self.length
            )));
        }

        if !self.charset.is_empty() {
            // Sized up front so a candidate never reallocates.
            let max_width = self.charset.iter().map(|c| c.len_utf8()).max().unwrap_or(1);
            let capacity = self.length * max_width;

            let mut rng = rand::rng();
            for attempt in 1..=self.max_attempts {
                let mut candidate = String::with_capacity(capacity);
                for _ in 0..self.length {
                    candidate.push(self.charset[rng.random_range(0..self.charset.len())]);
                }
                let candidate = SecretBuffer::from(candidate);

                if self.policy.evaluate(candidate.expose()).is_pass() {
                    debug!(attempt, length = self.length, "generated password");
                    return Ok(candidate);
                }
            }
        }

        Err(PassVaultError::GenerationExhausted(self.max_attempts))
    }
}
