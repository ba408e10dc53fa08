//! Binary vault file format, HMAC integrity, and atomic file replacement.
//!
//! A vault file has this layout:
//!
//! ```text
//! [PWVT: 4 bytes][version: 1 byte][header_len: 4 bytes LE][header JSON][body][HMAC-SHA256: 32 bytes]
//! ```
//!
//! - **Magic** (`PWVT`): identifies the file as a PassVault vault.
//! - **Version**: format version (currently `1`).
//! - **Header length**: little-endian u32 telling us where the header
//!   JSON ends and the encrypted body begins.
//! - **Header JSON**: serialized `VaultHeader` (salt + Argon2 params).
//! - **Body**: AES-256-GCM nonce || ciphertext of the account data.
//! - **HMAC-SHA256**: 32-byte tag over header + body bytes.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use tracing::{debug, warn};

use crate::crypto::kdf::Argon2Params;
use crate::errors::{PassVaultError, Result};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Magic bytes at the start of every vault file.
const MAGIC: &[u8; 4] = b"PWVT";

/// Current binary format version.
pub const CURRENT_VERSION: u8 = 1;

/// Size of the HMAC tag appended to the file (SHA-256 = 32 bytes).
const HMAC_LEN: usize = 32;

/// Fixed-size prefix: 4 (magic) + 1 (version) + 4 (header_len).
const PREFIX_LEN: usize = 9;

// ---------------------------------------------------------------------------
// VaultHeader
// ---------------------------------------------------------------------------

/// Metadata stored in clear at the beginning of a vault file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultHeader {
    /// Format version.
    pub version: u8,

    /// The salt used for Argon2id key derivation (base64 in JSON).
    #[serde(serialize_with = "base64_encode", deserialize_with = "base64_decode")]
    pub salt: Vec<u8>,

    /// Argon2 params the master key was derived with.
    pub argon2_params: Argon2Params,
}

/// A parsed (but not yet authenticated) vault file.
///
/// Keeps the raw header bytes so the HMAC is checked over exactly what
/// was on disk, with no re-serialization.
#[derive(Debug)]
pub struct Envelope {
    pub header: VaultHeader,
    pub header_bytes: Vec<u8>,
    pub body: Vec<u8>,
    pub stored_hmac: Vec<u8>,
}

// ---------------------------------------------------------------------------
// Envelope encoding
// ---------------------------------------------------------------------------

/// Assemble the full file contents for `header` + encrypted `body`.
pub fn build_envelope(header: &VaultHeader, body: &[u8], hmac_key: &[u8]) -> Result<Vec<u8>> {
    let header_bytes = serde_json::to_vec(header)
        .map_err(|e| PassVaultError::SerializationError(format!("header: {e}")))?;

    let hmac_tag = compute_hmac(hmac_key, &header_bytes, body)?;

    let header_len = u32::try_from(header_bytes.len()).map_err(|_| {
        PassVaultError::SerializationError(format!(
            "header length {} exceeds u32::MAX",
            header_bytes.len()
        ))
    })?;
    let total = PREFIX_LEN + header_bytes.len() + body.len() + HMAC_LEN;
    let mut buf = Vec::with_capacity(total);

    buf.extend_from_slice(MAGIC); // 4 bytes
    buf.push(CURRENT_VERSION); // 1 byte
    buf.extend_from_slice(&header_len.to_le_bytes()); // 4 bytes LE
    buf.extend_from_slice(&header_bytes); // header JSON
    buf.extend_from_slice(body); // nonce || ciphertext
    buf.extend_from_slice(&hmac_tag); // 32 bytes

    Ok(buf)
}

/// Split raw file contents into their parts.
///
/// Any structural problem is `CorruptVault`.  The caller must verify
/// the HMAC before trusting `body`.
pub fn parse_envelope(data: &[u8]) -> Result<Envelope> {
    if data.len() < PREFIX_LEN + HMAC_LEN {
        return Err(PassVaultError::CorruptVault(
            "file too small to be a valid vault".into(),
        ));
    }

    if &data[0..4] != MAGIC {
        return Err(PassVaultError::CorruptVault(
            "missing PWVT magic bytes".into(),
        ));
    }

    let version = data[4];
    if version != CURRENT_VERSION {
        return Err(PassVaultError::CorruptVault(format!(
            "unsupported version {version}, expected {CURRENT_VERSION}"
        )));
    }

    let header_len_u32 = u32::from_le_bytes(
        data[5..9]
            .try_into()
            .map_err(|_| PassVaultError::CorruptVault("bad header length".into()))?,
    );
    let header_len = usize::try_from(header_len_u32).map_err(|_| {
        PassVaultError::CorruptVault(format!(
            "header length {header_len_u32} exceeds platform address space"
        ))
    })?;

    let header_end = PREFIX_LEN
        .checked_add(header_len)
        .filter(|end| end + HMAC_LEN <= data.len())
        .ok_or_else(|| PassVaultError::CorruptVault("header length exceeds file size".into()))?;

    let header_bytes = data[PREFIX_LEN..header_end].to_vec();
    let body_end = data.len() - HMAC_LEN;
    let body = data[header_end..body_end].to_vec();
    let stored_hmac = data[body_end..].to_vec();

    let header: VaultHeader = serde_json::from_slice(&header_bytes)
        .map_err(|e| PassVaultError::CorruptVault(format!("header JSON: {e}")))?;

    Ok(Envelope {
        header,
        header_bytes,
        body,
        stored_hmac,
    })
}

/// Compute HMAC-SHA256 over header + body bytes.
pub fn compute_hmac(hmac_key: &[u8], header_bytes: &[u8], body: &[u8]) -> Result<Vec<u8>> {
    let mut mac = Hmac::<Sha256>::new_from_slice(hmac_key)
        .map_err(|e| PassVaultError::EncryptionFailed(format!("invalid HMAC key: {e}")))?;

    mac.update(header_bytes);
    mac.update(body);

    Ok(mac.finalize().into_bytes().to_vec())
}

/// Verify the HMAC in constant time.
///
/// The HMAC key comes from the passphrase, so a mismatch almost always
/// means the passphrase is wrong; it is reported as `WrongPassphrase`.
pub fn verify_hmac(hmac_key: &[u8], envelope: &Envelope) -> Result<()> {
    let mut mac = Hmac::<Sha256>::new_from_slice(hmac_key)
        .map_err(|e| PassVaultError::EncryptionFailed(format!("invalid HMAC key: {e}")))?;

    mac.update(&envelope.header_bytes);
    mac.update(&envelope.body);

    mac.verify_slice(&envelope.stored_hmac)
        .map_err(|_| PassVaultError::WrongPassphrase)
}

// ---------------------------------------------------------------------------
// File IO
// ---------------------------------------------------------------------------

/// Read the vault file, or `None` if it does not exist yet.
pub fn read_vault(path: &Path) -> Result<Option<Vec<u8>>> {
    match fs::read(path) {
        Ok(data) => Ok(Some(data)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Path of the temp file used while replacing `path`.
pub fn temp_path(path: &Path) -> PathBuf {
    let parent = path.parent().unwrap_or(Path::new("."));
    parent.join(format!(
        ".{}.tmp",
        path.file_name().unwrap_or_default().to_string_lossy()
    ))
}

/// Create the vault's parent directory (owner-only on Unix) if missing.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) else {
        return Ok(());
    };
    if parent.exists() {
        return Ok(());
    }

    fs::create_dir_all(parent)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(parent, fs::Permissions::from_mode(0o700))?;
    }

    debug!(dir = %parent.display(), "created vault directory");
    Ok(())
}

/// Replace the vault file with `contents` **atomically**.
///
/// 1. Write to `.<name>.tmp` in the same directory, mode 0600.
/// 2. Flush it to disk.
/// 3. Rename it over `path`.
/// 4. Flush the directory entry (best effort).
///
/// Readers see either the old file or the new one, never a mix.  If
/// anything fails before the rename the temp file is removed and the
/// old vault is untouched.
pub fn write_vault(path: &Path, contents: &[u8]) -> Result<()> {
    let tmp_path = temp_path(path);

    if let Err(e) = write_temp_file(&tmp_path, contents) {
        let _ = fs::remove_file(&tmp_path);
        return Err(e.into());
    }

    if let Err(e) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(e.into());
    }

    sync_parent_dir(path);
    debug!(path = %path.display(), bytes = contents.len(), "vault file replaced");
    Ok(())
}

fn write_temp_file(tmp_path: &Path, contents: &[u8]) -> io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(tmp_path)?;

    // `mode` only applies on creation; a stale temp file may be older.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(fs::Permissions::from_mode(0o600))?;
    }

    file.write_all(contents)?;
    file.sync_all()
}

fn sync_parent_dir(path: &Path) {
    #[cfg(unix)]
    {
        let parent = path.parent().filter(|p| !p.as_os_str().is_empty());
        let dir = parent.unwrap_or(Path::new("."));
        if let Err(e) = fs::File::open(dir).and_then(|d| d.sync_all()) {
            warn!(dir = %dir.display(), error = %e, "could not sync vault directory");
        }
    }
    #[cfg(not(unix))]
    let _ = path;
}

// ---------------------------------------------------------------------------
// Serde helpers for base64-encoded Vec<u8> fields
// ---------------------------------------------------------------------------

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

fn base64_encode<S>(data: &[u8], serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(&BASE64.encode(data))
}

fn base64_decode<'de, D>(deserializer: D) -> std::result::Result<Vec<u8>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    BASE64.decode(&s).map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn header() -> VaultHeader {
        VaultHeader {
            version: CURRENT_VERSION,
            salt: vec![1, 2, 3, 4],
            argon2_params: Argon2Params::minimum(),
        }
    }

    #[test]
    fn envelope_parses_back() {
        let key = [5u8; 32];
        let data = build_envelope(&header(), b"body-bytes", &key).unwrap();

        let envelope = parse_envelope(&data).unwrap();
        assert_eq!(envelope.header, header());
        assert_eq!(envelope.body, b"body-bytes");
        verify_hmac(&key, &envelope).unwrap();
    }

    #[test]
    fn wrong_hmac_key_is_wrong_passphrase() {
        let data = build_envelope(&header(), b"body", &[5u8; 32]).unwrap();
        let envelope = parse_envelope(&data).unwrap();
        assert!(matches!(
            verify_hmac(&[6u8; 32], &envelope),
            Err(PassVaultError::WrongPassphrase)
        ));
    }

    #[test]
    fn bad_magic_and_truncation_are_corrupt() {
        let mut data = build_envelope(&header(), b"body", &[5u8; 32]).unwrap();
        assert!(matches!(
            parse_envelope(&data[..10]),
            Err(PassVaultError::CorruptVault(_))
        ));

        data[0] = b'X';
        assert!(matches!(
            parse_envelope(&data),
            Err(PassVaultError::CorruptVault(_))
        ));
    }

    #[test]
    fn oversized_header_length_is_corrupt() {
        let mut data = build_envelope(&header(), b"body", &[5u8; 32]).unwrap();
        data[5..9].copy_from_slice(&u32::MAX.to_le_bytes());
        assert!(matches!(
            parse_envelope(&data),
            Err(PassVaultError::CorruptVault(_))
        ));
    }

    #[test]
    fn read_missing_vault_is_none() {
        let tmp = TempDir::new().unwrap();
        assert!(read_vault(&tmp.path().join("nope.pvlt")).unwrap().is_none());
    }

    #[test]
    fn write_replaces_contents_and_leaves_no_temp_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("vault.pvlt");

        write_vault(&path, b"first").unwrap();
        write_vault(&path, b"second").unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"second");
        assert!(!temp_path(&path).exists());
    }

    #[cfg(unix)]
    #[test]
    fn written_vault_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("vault.pvlt");
        write_vault(&path, b"data").unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn stale_temp_file_is_overwritten() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("vault.pvlt");
        fs::write(temp_path(&path), b"half-written garbage from a crash").unwrap();

        write_vault(&path, b"fresh").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"fresh");
    }

    #[test]
    fn ensure_parent_dir_creates_nested_dirs() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("a").join("b").join("vault.pvlt");
        ensure_parent_dir(&path).unwrap();
        assert!(path.parent().unwrap().is_dir());
    }
}
