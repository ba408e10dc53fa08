//! Exclusive cross-process access to a vault file.
//!
//! A session takes an `flock(2)` exclusive lock on `<vault>.lock` and
//! holds it until the `VaultLock` is dropped.  The lock file itself is
//! never deleted: removing it while another process waits on it would
//! let two sessions lock two different inodes.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{PassVaultError, Result};

/// What to do when another session holds the lock.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LockPolicy {
    /// Fail immediately with `VaultBusy`.
    #[default]
    Fail,
    /// Block until the other session finishes.
    Wait,
}

/// Guard for an exclusive vault lock.  Unlocks on drop.
#[derive(Debug)]
pub struct VaultLock {
    file: File,
    path: PathBuf,
}

impl VaultLock {
    /// Lock file path for a vault: `<vault>.lock` next to it.
    pub fn lock_path(vault_path: &Path) -> PathBuf {
        let mut name = vault_path.file_name().unwrap_or_default().to_os_string();
        name.push(".lock");
        vault_path.with_file_name(name)
    }

    /// Acquire the exclusive lock for `vault_path`.
    pub fn acquire(vault_path: &Path, policy: LockPolicy) -> Result<Self> {
        let path = Self::lock_path(vault_path);

        let mut options = OpenOptions::new();
        options.read(true).write(true).create(true).truncate(false);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let file = options.open(&path)?;

        lock_exclusive(&file, policy).map_err(|e| {
            if e.kind() == std::io::ErrorKind::WouldBlock {
                PassVaultError::VaultBusy(vault_path.to_path_buf())
            } else {
                PassVaultError::Io(e)
            }
        })?;

        debug!(lock = %path.display(), ?policy, "vault lock acquired");
        Ok(Self { file, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for VaultLock {
    fn drop(&mut self) {
        unlock(&self.file);
        debug!(lock = %self.path.display(), "vault lock released");
    }
}

#[cfg(unix)]
fn lock_exclusive(file: &File, policy: LockPolicy) -> std::io::Result<()> {
    use std::os::unix::io::AsRawFd;

    let operation = match policy {
        LockPolicy::Fail => libc::LOCK_EX | libc::LOCK_NB,
        LockPolicy::Wait => libc::LOCK_EX,
    };

    loop {
        // SAFETY: the descriptor is owned by `file` and stays open for the call.
        let ret = unsafe { libc::flock(file.as_raw_fd(), operation) };
        if ret == 0 {
            return Ok(());
        }
        let err = std::io::Error::last_os_error();
        if err.kind() != std::io::ErrorKind::Interrupted {
            return Err(err);
        }
    }
}

#[cfg(unix)]
fn unlock(file: &File) {
    use std::os::unix::io::AsRawFd;

    // SAFETY: as above.  Closing the descriptor would release it anyway.
    unsafe {
        libc::flock(file.as_raw_fd(), libc::LOCK_UN);
    }
}

#[cfg(not(unix))]
fn lock_exclusive(_file: &File, _policy: LockPolicy) -> std::io::Result<()> {
    tracing::warn!("vault locking is not supported on this platform");
    Ok(())
}

#[cfg(not(unix))]
fn unlock(_file: &File) {}
