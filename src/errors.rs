use std::path::PathBuf;
use thiserror::Error;

/// All errors that can occur in PassVault.
///
/// Messages may name an account but never contain a password,
/// a passphrase, or decrypted vault bytes.
#[derive(Debug, Error)]
pub enum PassVaultError {
    // --- Crypto errors ---
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Wrong master passphrase (or the vault file was tampered with)")]
    WrongPassphrase,

    #[error("Key derivation failed: {0}")]
    KeyDerivationFailed(String),

    // --- Vault errors ---
    #[error("Vault is corrupt: {0}")]
    CorruptVault(String),

    #[error("Vault at {0} is in use by another passvault process")]
    VaultBusy(PathBuf),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    // --- Account errors ---
    #[error("Account '{0}' already exists (use `update` to change it)")]
    DuplicateAccount(String),

    #[error("Account '{0}' not found")]
    AccountNotFound(String),

    #[error("Invalid account name: {0}")]
    InvalidAccountName(String),

    #[error("Password is too weak: {0}")]
    WeakPassword(String),

    #[error("Could not generate a strong password after {0} attempts — check the generator settings")]
    GenerationExhausted(usize),

    // --- Config errors ---
    #[error("Config file error: {0}")]
    ConfigError(String),

    // --- IO errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // --- CLI / session errors ---
    #[error("Command failed: {0}")]
    CommandFailed(String),

    #[error("Refusing to print a password to a terminal — pipe the output instead (e.g. `passvault get-password NAME | xclip`)")]
    InteractiveSink,

    #[error("This vault session has already run an operation")]
    SessionFinished,

    #[error("User cancelled operation")]
    UserCancelled,
}

/// Coarse classification of a [`PassVaultError`].
///
/// This is what a failed session reports and what the CLI maps to
/// its exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    WrongPassphrase,
    CorruptVault,
    DuplicateAccount,
    AccountNotFound,
    WeakPassword,
    GenerationExhausted,
    VaultBusy,
    IoFailure,
    Crypto,
    Usage,
    Cancelled,
}

impl PassVaultError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::WrongPassphrase => ErrorKind::WrongPassphrase,
            Self::CorruptVault(_) | Self::SerializationError(_) => ErrorKind::CorruptVault,
            Self::DuplicateAccount(_) => ErrorKind::DuplicateAccount,
            Self::AccountNotFound(_) => ErrorKind::AccountNotFound,
            Self::WeakPassword(_) => ErrorKind::WeakPassword,
            Self::GenerationExhausted(_) => ErrorKind::GenerationExhausted,
            Self::VaultBusy(_) => ErrorKind::VaultBusy,
            Self::Io(_) => ErrorKind::IoFailure,
            Self::EncryptionFailed(_) | Self::KeyDerivationFailed(_) => ErrorKind::Crypto,
            Self::InvalidAccountName(_)
            | Self::ConfigError(_)
            | Self::CommandFailed(_)
            | Self::InteractiveSink
            | Self::SessionFinished => ErrorKind::Usage,
            Self::UserCancelled => ErrorKind::Cancelled,
        }
    }
}

/// Convenience type alias for PassVault results.
pub type Result<T> = std::result::Result<T, PassVaultError>;
