//! CLI module — Clap argument parser, prompts, output helpers, and command implementations.

pub mod commands;
pub mod output;

use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};

use clap::Parser;
use zeroize::Zeroizing;

use crate::config::Settings;
use crate::crypto::PassphraseCipher;
use crate::errors::{PassVaultError, Result};
use crate::vault::{PasswordChoice, SecretBuffer, VaultSession};

/// Minimum length for the master passphrase of a new vault.
const MIN_PASSPHRASE_LEN: usize = 8;

/// Environment variable holding the master passphrase (scripts, CI).
pub const PASSPHRASE_ENV: &str = "PASSVAULT_PASSWORD";

/// PassVault CLI: encrypted password vault.
#[derive(Parser)]
#[command(name = "passvault", about = "Encrypted password vault", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Vault file (default: from config, or ~/.passvault/vault.pvlt)
    #[arg(long, env = "PASSVAULT_VAULT", global = true)]
    pub vault: Option<PathBuf>,

    /// Config file (default: <config dir>/passvault/config.toml)
    #[arg(long, env = "PASSVAULT_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Print debug logs to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Add a new account
    Add {
        /// Account name (e.g. Github)
        name: String,
        #[command(flatten)]
        fields: AccountFields,
    },

    /// Update an existing account (blank fields keep their value)
    Update {
        /// Account name
        name: String,
        #[command(flatten)]
        fields: AccountFields,
    },

    /// List all account names
    List,

    /// Show an account's username and URL
    Get {
        /// Account name
        name: String,
    },

    /// Print an account's password to a pipe or file
    GetPassword {
        /// Account name
        name: String,
    },

    /// Delete an account
    Delete {
        /// Account name
        name: String,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for (bash, zsh, fish, powershell)
        shell: String,
    },
}

/// Optional account fields shared by `add` and `update`.
#[derive(clap::Args)]
pub struct AccountFields {
    /// Username for the account
    #[arg(short, long)]
    pub username: Option<String>,

    /// URL for the account
    #[arg(long)]
    pub url: Option<String>,

    /// Generate a strong password instead of reading one
    #[arg(short, long)]
    pub generate: bool,
}

// ---------------------------------------------------------------------------
// Shared helpers used by multiple commands
// ---------------------------------------------------------------------------

/// Settings and vault location resolved from CLI flags and the config file.
pub struct Context {
    pub settings: Settings,
    pub vault_path: PathBuf,
}

impl Context {
    /// Load settings (`--config`, else the default config path) and
    /// resolve the vault path (`--vault`, else `vault_path` from settings).
    pub fn load(cli: &Cli) -> Result<Self> {
        let settings = match cli.config.clone().or_else(Settings::default_config_path) {
            Some(path) => Settings::load(&path)?,
            None => Settings::default(),
        };
        let vault_path = match &cli.vault {
            Some(path) => path.clone(),
            None => settings.vault_path()?,
        };
        Ok(Self {
            settings,
            vault_path,
        })
    }

    pub fn vault_exists(&self) -> bool {
        self.vault_path.exists()
    }

    /// Build a session for this vault that owns `passphrase`.
    pub fn session(&self, passphrase: SecretBuffer) -> Result<VaultSession> {
        let generator = self.settings.password_generator()?;
        Ok(VaultSession::new(
            &self.vault_path,
            passphrase,
            PassphraseCipher::new(self.settings.argon2_params()),
        )
        .with_options(self.settings.session_options())
        .with_generator(generator))
    }
}

/// Get the master passphrase, trying in order:
/// 1. `PASSVAULT_PASSWORD` env var (scripts)
/// 2. Interactive prompt (confirmed twice when `creating` a new vault)
pub fn prompt_passphrase(vault_path: &Path, creating: bool) -> Result<SecretBuffer> {
    let new_vault = creating && !vault_path.exists();

    if let Ok(pw) = std::env::var(PASSPHRASE_ENV) {
        if !pw.is_empty() {
            if new_vault && pw.chars().count() < MIN_PASSPHRASE_LEN {
                return Err(PassVaultError::CommandFailed(format!(
                    "master passphrase must be at least {MIN_PASSPHRASE_LEN} characters"
                )));
            }
            return Ok(SecretBuffer::from(pw));
        }
    }

    if !io::stdin().is_terminal() {
        return Err(PassVaultError::CommandFailed(format!(
            "no terminal to prompt for the master passphrase — set {PASSPHRASE_ENV}"
        )));
    }

    if !new_vault {
        let pw = dialoguer::Password::new()
            .with_prompt("Master passphrase")
            .interact()
            .map_err(prompt_error)?;
        return Ok(SecretBuffer::from(pw));
    }

    output::info(&format!(
        "No vault at {} yet — choose a master passphrase to create it.",
        vault_path.display()
    ));
    loop {
        let pw = dialoguer::Password::new()
            .with_prompt("New master passphrase")
            .with_confirmation(
                "Confirm master passphrase",
                "Passphrases do not match, try again",
            )
            .interact()
            .map_err(prompt_error)?;
        let pw = SecretBuffer::from(pw);

        if pw.expose().chars().count() < MIN_PASSPHRASE_LEN {
            output::warning(&format!(
                "Passphrase must be at least {MIN_PASSPHRASE_LEN} characters. Try again."
            ));
            continue;
        }
        return Ok(pw);
    }
}

/// Decide where a password comes from.
///
/// - `--generate` ⇒ generated.
/// - Piped stdin ⇒ read it (one trailing newline stripped).  When
///   `updating`, an empty pipe means "keep the current password".
/// - Interactive ⇒ ask whether to generate, else prompt twice (hidden).
///   When `updating`, first ask whether to change it at all.
pub fn read_password_choice(
    name: &str,
    generate: bool,
    updating: bool,
) -> Result<Option<PasswordChoice>> {
    if generate {
        return Ok(Some(PasswordChoice::Generated));
    }

    if !io::stdin().is_terminal() {
        let mut buf = Zeroizing::new(String::new());
        io::stdin().read_to_string(&mut buf)?;
        let value = buf.strip_suffix('\n').unwrap_or(&buf);
        let value = value.strip_suffix('\r').unwrap_or(value);
        if updating && value.is_empty() {
            return Ok(None);
        }
        return Ok(Some(PasswordChoice::UserSupplied(SecretBuffer::new(value))));
    }

    if updating {
        let change = dialoguer::Confirm::new()
            .with_prompt(format!("Change the password for '{name}'?"))
            .default(false)
            .interact()
            .map_err(prompt_error)?;
        if !change {
            return Ok(None);
        }
    }

    let generate = dialoguer::Confirm::new()
        .with_prompt("Generate a strong password?")
        .default(true)
        .interact()
        .map_err(prompt_error)?;
    if generate {
        return Ok(Some(PasswordChoice::Generated));
    }

    let pw = dialoguer::Password::new()
        .with_prompt(format!("Password for '{name}'"))
        .with_confirmation("Confirm password", "Passwords do not match, try again")
        .allow_empty_password(updating)
        .interact()
        .map_err(prompt_error)?;
    Ok(Some(PasswordChoice::UserSupplied(SecretBuffer::from(pw))))
}

/// Use `flag` if given; otherwise prompt when interactive.
///
/// Blank answers become `None` (for updates: keep the current value).
pub fn read_optional_field(flag: Option<String>, prompt: &str) -> Result<Option<String>> {
    if flag.is_some() {
        return Ok(flag);
    }
    if !io::stdin().is_terminal() {
        return Ok(None);
    }

    let value: String = dialoguer::Input::new()
        .with_prompt(prompt)
        .allow_empty(true)
        .interact_text()
        .map_err(prompt_error)?;
    Ok(Some(value).filter(|v| !v.trim().is_empty()))
}

/// Map a dialoguer failure; an interrupted prompt counts as a cancel.
pub(crate) fn prompt_error(e: dialoguer::Error) -> PassVaultError {
    match e {
        dialoguer::Error::IO(io_err) if io_err.kind() == io::ErrorKind::Interrupted => {
            PassVaultError::UserCancelled
        }
        other => PassVaultError::CommandFailed(format!("prompt: {other}")),
    }
}
