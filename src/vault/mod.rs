//! Vault module — the encrypted account store and its lifecycle.
//!
//! This module provides:
//! - `SecretBuffer`, the zero-on-release container for secrets (`secret`)
//! - Account records and request types (`account`)
//! - The in-memory `AccountStore` with its CRUD rules (`store`)
//! - Plaintext serialization of the store (`codec`)
//! - Binary envelope, HMAC and atomic file replacement (`format`)
//! - Cross-process exclusive access (`lock`)
//! - `VaultSession`, which ties all of the above together (`session`)

pub mod account;
pub mod codec;
pub mod format;
pub mod lock;
pub mod secret;
pub mod session;
pub mod store;

// Re-export the most commonly used items.
pub use account::{
    AccountMetadata, AccountRecord, AccountSummary, AccountUpdate, NewAccount, PasswordChoice,
};
pub use codec::VaultCodec;
pub use lock::{LockPolicy, VaultLock};
pub use secret::SecretBuffer;
pub use session::{
    Operation, OperationOutput, SessionOptions, SessionOutcome, SessionState, VaultSession,
};
pub use store::AccountStore;
