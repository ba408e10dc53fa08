use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::crypto::kdf::Argon2Params;
use crate::errors::{PassVaultError, Result};
use crate::password::generator::{DEFAULT_LENGTH, DEFAULT_MAX_ATTEMPTS, MAX_LENGTH};
use crate::password::strength::DEFAULT_MIN_LENGTH;
use crate::password::{PasswordGenerator, StrengthPolicy};
use crate::vault::{LockPolicy, SessionOptions};

/// User configuration, loaded from `config.toml`.
///
/// Every field has a sensible default so PassVault works out-of-the-box
/// without any config file at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Vault file location.  A leading `~/` is expanded to the home directory.
    #[serde(default = "default_vault_path")]
    pub vault_path: String,

    /// What to do when another process has the vault open.
    #[serde(default)]
    pub lock_policy: LockPolicy,

    /// Re-encrypt and rewrite the vault after read-only commands too.
    #[serde(default)]
    pub rewrite_on_read: bool,

    /// Length of generated passwords.
    #[serde(default = "default_generated_length")]
    pub generated_length: usize,

    /// Candidates drawn before password generation gives up.
    #[serde(default = "default_generation_attempts")]
    pub generation_attempts: usize,

    /// Minimum password length (cannot go below 20).
    #[serde(default = "default_min_password_length")]
    pub min_password_length: usize,

    /// Argon2 memory cost in KiB (default: 64 MB).
    #[serde(default = "default_argon2_memory_kib")]
    pub argon2_memory_kib: u32,

    /// Argon2 iteration count (default: 3).
    #[serde(default = "default_argon2_iterations")]
    pub argon2_iterations: u32,

    /// Argon2 parallelism degree (default: 4).
    #[serde(default = "default_argon2_parallelism")]
    pub argon2_parallelism: u32,
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_vault_path() -> String {
    "~/.passvault/vault.pvlt".to_string()
}

fn default_generated_length() -> usize {
    DEFAULT_LENGTH
}

fn default_generation_attempts() -> usize {
    DEFAULT_MAX_ATTEMPTS
}

fn default_min_password_length() -> usize {
    DEFAULT_MIN_LENGTH
}

fn default_argon2_memory_kib() -> u32 {
    65_536 // 64 MB
}

fn default_argon2_iterations() -> u32 {
    3
}

fn default_argon2_parallelism() -> u32 {
    4
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for Settings {
    fn default() -> Self {
        Self {
            vault_path: default_vault_path(),
            lock_policy: LockPolicy::default(),
            rewrite_on_read: false,
            generated_length: default_generated_length(),
            generation_attempts: default_generation_attempts(),
            min_password_length: default_min_password_length(),
            argon2_memory_kib: default_argon2_memory_kib(),
            argon2_iterations: default_argon2_iterations(),
            argon2_parallelism: default_argon2_parallelism(),
        }
    }
}

impl Settings {
    /// Load settings from a TOML file.
    ///
    /// If the file does not exist, defaults are returned.
    /// If the file exists but cannot be parsed, an error is returned.
    pub fn load(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(config_path)?;

        let settings: Settings = toml::from_str(&contents).map_err(|e| {
            PassVaultError::ConfigError(format!("Failed to parse {}: {e}", config_path.display()))
        })?;

        Ok(settings)
    }

    /// Default config file: `<config_dir>/passvault/config.toml`.
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("passvault").join("config.toml"))
    }

    /// Resolve `vault_path`, expanding a leading `~/`.
    pub fn vault_path(&self) -> Result<PathBuf> {
        expand_home(&self.vault_path)
    }

    /// Convert the Argon2 settings into crypto-layer params.
    pub fn argon2_params(&self) -> Argon2Params {
        Argon2Params {
            memory_kib: self.argon2_memory_kib,
            iterations: self.argon2_iterations,
            parallelism: self.argon2_parallelism,
        }
    }

    /// Build the password generator (and strength policy) these settings describe.
    ///
    /// `generated_length` must lie between `min_password_length` and
    /// the generator's maximum; otherwise no candidate could ever pass.
    pub fn password_generator(&self) -> Result<PasswordGenerator> {
        let policy = StrengthPolicy::with_min_length(self.min_password_length)?;
        if self.generated_length < self.min_password_length {
            return Err(PassVaultError::ConfigError(format!(
                "generated_length ({}) is below min_password_length ({})",
                self.generated_length, self.min_password_length
            )));
        }
        if self.generated_length > MAX_LENGTH {
            return Err(PassVaultError::ConfigError(format!(
                "generated_length must be at most {MAX_LENGTH} (got {})",
                self.generated_length
            )));
        }
        Ok(PasswordGenerator::new(
            policy,
            self.generated_length,
            self.generation_attempts,
        ))
    }

    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            lock_policy: self.lock_policy,
            rewrite_on_read: self.rewrite_on_read,
        }
    }
}

/// Expand a leading `~/` (or a bare `~`) to the user's home directory.
fn expand_home(path: &str) -> Result<PathBuf> {
    let rest = match path.strip_prefix('~') {
        None => return Ok(PathBuf::from(path)),
        Some(rest) if rest.is_empty() || rest.starts_with('/') => rest.trim_start_matches('/'),
        Some(_) => return Ok(PathBuf::from(path)),
    };

    let home = dirs::home_dir().ok_or_else(|| {
        PassVaultError::ConfigError(format!("cannot expand '{path}': no home directory"))
    })?;
    Ok(if rest.is_empty() { home } else { home.join(rest) })
}

// ── Tests ────────────────────────────────────────────────────────────
