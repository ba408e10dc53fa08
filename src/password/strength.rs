//! Password strength rules.
//!
//! A password passes when it is at least `min_length` characters long
//! (20 by default) and contains an uppercase letter, a lowercase letter,
//! a digit, and at least one character outside `[A-Za-z0-9]`.

use std::fmt;

use crate::errors::{PassVaultError, Result};

/// The smallest minimum length a policy may be configured with.
pub const DEFAULT_MIN_LENGTH: usize = 20;

/// One rule a candidate failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Weakness {
    TooShort { min_length: usize },
    MissingUppercase,
    MissingLowercase,
    MissingDigit,
    MissingSymbol,
}

impl fmt::Display for Weakness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooShort { min_length } => write!(f, "must be at least {min_length} characters"),
            Self::MissingUppercase => f.write_str("needs an uppercase letter"),
            Self::MissingLowercase => f.write_str("needs a lowercase letter"),
            Self::MissingDigit => f.write_str("needs a digit"),
            Self::MissingSymbol => f.write_str("needs a symbol (anything outside A-Z, a-z, 0-9)"),
        }
    }
}

/// Result of evaluating a candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Strength {
    Pass,
    Fail(Vec<Weakness>),
}

impl Strength {
    pub fn is_pass(&self) -> bool {
        matches!(self, Self::Pass)
    }
}

/// Stateless evaluator of password quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrengthPolicy {
    min_length: usize,
}

impl Default for StrengthPolicy {
    fn default() -> Self {
        Self {
            min_length: DEFAULT_MIN_LENGTH,
        }
    }
}

impl StrengthPolicy {
    /// Build a policy with a stricter minimum length.
    ///
    /// Lengths below [`DEFAULT_MIN_LENGTH`] are rejected.
    pub fn with_min_length(min_length: usize) -> Result<Self> {
        if min_length < DEFAULT_MIN_LENGTH {
            return Err(PassVaultError::ConfigError(format!(
                "min_password_length must be at least {DEFAULT_MIN_LENGTH} (got {min_length})"
            )));
        }
        Ok(Self { min_length })
    }

    pub fn min_length(&self) -> usize {
        self.min_length
    }

    /// Check `candidate` against every rule and report all failures.
    pub fn evaluate(&self, candidate: &str) -> Strength {
        let mut weaknesses = Vec::new();

        if candidate.chars().count() < self.min_length {
            weaknesses.push(Weakness::TooShort {
                min_length: self.min_length,
            });
        }
        if !candidate.chars().any(|c| c.is_ascii_uppercase()) {
            weaknesses.push(Weakness::MissingUppercase);
        }
        if !candidate.chars().any(|c| c.is_ascii_lowercase()) {
            weaknesses.push(Weakness::MissingLowercase);
        }
        if !candidate.chars().any(|c| c.is_ascii_digit()) {
            weaknesses.push(Weakness::MissingDigit);
        }
        if candidate.chars().all(|c| c.is_ascii_alphanumeric()) {
            weaknesses.push(Weakness::MissingSymbol);
        }

        if weaknesses.is_empty() {
            Strength::Pass
        } else {
            Strength::Fail(weaknesses)
        }
    }

    /// Like `evaluate`, but as a `Result` carrying a `WeakPassword` error.
    pub fn check(&self, candidate: &str) -> Result<()> {
        match self.evaluate(candidate) {
            Strength::Pass => Ok(()),
            Strength::Fail(weaknesses) => {
                let reasons: Vec<String> = weaknesses.iter().map(ToString::to_string).collect();
                Err(PassVaultError::WeakPassword(reasons.join("; ")))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = "Aa1!aaaaaaaaaaaaaaaa";

    #[test]
    fn accepts_minimal_satisfying_password() {
        assert_eq!(MINIMAL.len(), 20);
        assert_eq!(StrengthPolicy::default().evaluate(MINIMAL), Strength::Pass);
    }

    #[test]
    fn rejects_empty_string() {
        let result = StrengthPolicy::default().evaluate("");
        assert!(!result.is_pass());
    }

    #[test]
    fn rejects_each_single_rule_violation() {
        let policy = StrengthPolicy::default();
        let cases = [
            ("Aa1!aaaaaaaaaaaaaaa", Weakness::TooShort { min_length: 20 }),
            ("aa1!aaaaaaaaaaaaaaaa", Weakness::MissingUppercase),
            ("AA1!AAAAAAAAAAAAAAAA", Weakness::MissingLowercase),
            ("Aab!aaaaaaaaaaaaaaaa", Weakness::MissingDigit),
            ("Aa1aaaaaaaaaaaaaaaaa", Weakness::MissingSymbol),
        ];
        for (candidate, expected) in cases {
            assert_eq!(
                policy.evaluate(candidate),
                Strength::Fail(vec![expected]),
                "candidate {candidate:?}"
            );
        }
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        // 19 chars, but more than 20 bytes thanks to the multi-byte symbol.
        let candidate = "Aa1€aaaaaaaaaaaaaaa";
        assert!(candidate.len() > 20);
        assert_eq!(
            StrengthPolicy::default().evaluate(candidate),
            Strength::Fail(vec![Weakness::TooShort { min_length: 20 }])
        );
    }

    #[test]
    fn non_ascii_counts_as_symbol() {
        assert!(StrengthPolicy::default()
            .evaluate("Aa1éaaaaaaaaaaaaaaaa")
            .is_pass());
    }

    #[test]
    fn check_reports_reasons_without_the_password() {
        let err = StrengthPolicy::default().check("short").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("at least 20"));
        assert!(!msg.contains("short"));
    }

    #[test]
    fn stricter_min_length_is_honoured() {
        let policy = StrengthPolicy::with_min_length(24).unwrap();
        assert!(!policy.evaluate(MINIMAL).is_pass());
        assert!(policy.evaluate("Aa1!aaaaaaaaaaaaaaaaaaaa").is_pass());
    }

    #[test]
    fn min_length_below_default_is_rejected() {
        assert!(StrengthPolicy::with_min_length(8).is_err());
    }
}
