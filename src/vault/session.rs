//! One decrypt → operate → re-encrypt cycle against a vault file.
//!
//! A `VaultSession` owns the master passphrase for its lifetime and
//! runs exactly one [`Operation`]:
//!
//! ```text
//! Idle → Locked → Decrypted → Mutated | ReadOnly → [Encrypted] → Released
//!                     any step ──→ Failed ──→ Released
//! ```
//!
//! - **Locked**: an exclusive `VaultLock` is held until the end.
//! - **Decrypted**: a missing vault file yields an empty store without
//!   touching the cipher; otherwise the file is opened with the passphrase.
//! - **Mutated / ReadOnly**: the single operation has been applied.
//! - **Encrypted**: only after the store changed (or a read with
//!   `rewrite_on_read`), the store is re-sealed and atomically written.
//! - **Released**: the passphrase is zeroed, the decrypted store has
//!   been dropped (zeroing every password), and the lock is freed.
//!
//! Every path, including errors, ends in `Released`.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::crypto::{PassphraseCipher, VaultCipher};
use crate::errors::{ErrorKind, PassVaultError, Result};
use crate::password::PasswordGenerator;

use super::account::{AccountMetadata, AccountSummary, AccountUpdate, NewAccount, PasswordChoice};
use super::codec::VaultCodec;
use super::format;
use super::lock::{LockPolicy, VaultLock};
use super::secret::SecretBuffer;
use super::store::AccountStore;

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Locked,
    Decrypted,
    Mutated,
    ReadOnly,
    Encrypted,
    Failed(ErrorKind),
    Released,
}

/// How a finished invocation turned out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    /// Completed; carries any non-secret output to show the user.
    Success(Option<String>),
    /// The user backed out before anything was decrypted or written.
    Cancelled,
    Failed(ErrorKind),
}

impl SessionOutcome {
    /// Classify the result of a command.
    pub fn from_result(result: &Result<Option<String>>) -> Self {
        match result {
            Ok(rendered) => Self::Success(rendered.clone()),
            Err(e) if e.kind() == ErrorKind::Cancelled => Self::Cancelled,
            Err(e) => Self::Failed(e.kind()),
        }
    }

    /// Process exit status: 0 on success, 130 when cancelled, 1 otherwise.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Success(_) => 0,
            Self::Cancelled => 130,
            Self::Failed(_) => 1,
        }
    }
}

/// Session behaviour knobs, usually built from `Settings`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionOptions {
    pub lock_policy: LockPolicy,
    /// Re-seal and rewrite an existing vault even after a read-only operation.
    pub rewrite_on_read: bool,
}

/// The one thing a session does.
#[derive(Debug)]
pub enum Operation {
    Add { name: String, account: NewAccount },
    Update { name: String, update: AccountUpdate },
    Get { name: String },
    GetPassword { name: String },
    Delete { name: String },
    List,
}

impl Operation {
    /// Whether this operation may change the store.
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            Self::Add { .. } | Self::Update { .. } | Self::Delete { .. }
        )
    }

    fn label(&self) -> &'static str {
        match self {
            Self::Add { .. } => "add",
            Self::Update { .. } => "update",
            Self::Get { .. } => "get",
            Self::GetPassword { .. } => "get-password",
            Self::Delete { .. } => "delete",
            Self::List => "list",
        }
    }
}

/// What an operation produced.
#[derive(Debug)]
pub enum OperationOutput {
    Added { generated: bool, total: usize },
    /// `changed` is false when the update had nothing to apply.
    Updated { changed: bool },
    Deleted { total: usize },
    Account(AccountSummary),
    /// A copy of the password; zeroed when dropped.
    Password(SecretBuffer),
    Accounts(Vec<AccountMetadata>),
}

/// A single-use vault session.
pub struct VaultSession<C: VaultCipher = PassphraseCipher> {
    path: PathBuf,
    passphrase: SecretBuffer,
    cipher: C,
    options: SessionOptions,
    generator: PasswordGenerator,
    state: SessionState,
    failure: Option<ErrorKind>,
}

impl<C: VaultCipher> VaultSession<C> {
    pub fn new(path: impl Into<PathBuf>, passphrase: SecretBuffer, cipher: C) -> Self {
        Self {
            path: path.into(),
            passphrase,
            cipher,
            options: SessionOptions::default(),
            generator: PasswordGenerator::default(),
            state: SessionState::Idle,
            failure: None,
        }
    }

    pub fn with_options(mut self, options: SessionOptions) -> Self {
        self.options = options;
        self
    }

    /// Generator (and strength policy) used for this session's store.
    pub fn with_generator(mut self, generator: PasswordGenerator) -> Self {
        self.generator = generator;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Why the session failed, if it did.
    pub fn failure(&self) -> Option<ErrorKind> {
        self.failure
    }

    /// Run `operation` through the full lifecycle.
    ///
    /// A session runs at most one operation; later calls fail with
    /// `SessionFinished`.  Whatever happens, the session ends `Released`.
    pub fn execute(&mut self, operation: Operation) -> Result<OperationOutput> {
        if self.state != SessionState::Idle {
            return Err(PassVaultError::SessionFinished);
        }

        debug!(
            operation = operation.label(),
            mutation = operation.is_mutation(),
            path = %self.path.display(),
            "session start"
        );
        let result = self.run(operation);

        if let Err(e) = &result {
            self.failure = Some(e.kind());
            self.enter(SessionState::Failed(e.kind()));
        }
        self.release();
        result
    }

    fn run(&mut self, operation: Operation) -> Result<OperationOutput> {
        format::ensure_parent_dir(&self.path)?;
        let _lock = VaultLock::acquire(&self.path, self.options.lock_policy)?;
        self.enter(SessionState::Locked);

        let (mut store, existed) = self.load()?;
        self.enter(SessionState::Decrypted);

        let (output, mutation) = apply(&mut store, operation)?;
        self.enter(if mutation {
            SessionState::Mutated
        } else {
            SessionState::ReadOnly
        });

        if mutation || (existed && self.options.rewrite_on_read) {
            self.persist(&store)?;
            self.enter(SessionState::Encrypted);
        }

        // `store` drops before `_lock`, so plaintext is gone before unlock.
        Ok(output)
    }

    fn load(&self) -> Result<(AccountStore, bool)> {
        let (store, existed) = match format::read_vault(&self.path)? {
            None => {
                debug!(path = %self.path.display(), "no vault file yet, starting empty");
                (AccountStore::new(), false)
            }
            Some(sealed) => {
                let plaintext = self.cipher.open(&sealed, &self.passphrase)?;
                (VaultCodec::decode(&plaintext)?, true)
            }
        };
        Ok((store.with_generator(self.generator.clone()), existed))
    }

    fn persist(&self, store: &AccountStore) -> Result<()> {
        let plaintext = VaultCodec::encode(store)?;
        let sealed = self.cipher.seal(&plaintext, &self.passphrase)?;
        format::write_vault(&self.path, &sealed)?;
        info!(path = %self.path.display(), accounts = store.len(), "vault saved");
        Ok(())
    }

    fn release(&mut self) {
        self.passphrase.release();
        self.enter(SessionState::Released);
    }

    fn enter(&mut self, next: SessionState) {
        debug!(from = ?self.state, to = ?next, "session state");
        self.state = next;
    }
}

/// Apply one operation to the store.
///
/// Also reports whether the store actually changed, which decides
/// whether the vault is rewritten.
fn apply(store: &mut AccountStore, operation: Operation) -> Result<(OperationOutput, bool)> {
    match operation {
        Operation::Add { name, account } => {
            let generated = matches!(account.password, PasswordChoice::Generated);
            store.add(&name, account)?;
            let total = store.len();
            Ok((OperationOutput::Added { generated, total }, true))
        }
        Operation::Update { name, update } => {
            let changed = store.update(&name, update)?;
            Ok((OperationOutput::Updated { changed }, changed))
        }
        Operation::Get { name } => Ok((OperationOutput::Account(store.get(&name)?), false)),
        Operation::GetPassword { name } => {
            let password = store.get_password(&name)?.duplicate();
            Ok((OperationOutput::Password(password), false))
        }
        Operation::Delete { name } => {
            store.delete(&name)?;
            Ok((OperationOutput::Deleted { total: store.len() }, true))
        }
        Operation::List => Ok((OperationOutput::Accounts(store.list()), false)),
    }
}
