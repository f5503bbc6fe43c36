//! Binary vault file format and atomic persistence.
//!
//! A vault file has this layout:
//!
//! ```text
//! [PVDB: 4 bytes][version: 1 byte][salt: 32 bytes][nonce: 12 bytes][ciphertext + 16-byte tag]
//! ```
//!
//! - **Magic** (`PVDB`): identifies the file as a passvault vault.
//! - **Version**: format version (currently `1`).
//! - **Salt**: random Argon2id salt, generated once per vault.
//! - **Nonce**: AES-GCM nonce, fresh on every write.
//! - **Ciphertext**: the AEAD-sealed JSON document, tag appended.
//!
//! Tamper detection lives in the GCM tag, not here: this layer only
//! checks that the envelope is structurally well-formed.

use std::fs;
use std::path::Path;

use crate::crypto::encryption::{NONCE_LEN, TAG_LEN};
use crate::crypto::kdf::SALT_LEN;
use crate::errors::{Result, VaultError};

/// Magic bytes at the start of every vault file.
const MAGIC: &[u8; 4] = b"PVDB";

/// Current binary format version.
pub const CURRENT_VERSION: u8 = 1;

/// Fixed-size prefix: 4 (magic) + 1 (version) + 32 (salt) + 12 (nonce).
const PREFIX_LEN: usize = 4 + 1 + SALT_LEN + NONCE_LEN;

/// The parsed envelope of a vault file, still encrypted.
#[derive(Debug)]
pub struct RawVault {
    pub salt: [u8; SALT_LEN],
    pub nonce: [u8; NONCE_LEN],
    /// Sealed document bytes, GCM tag included.
    pub ciphertext: Vec<u8>,
}

/// Write a vault file to disk **atomically**.
///
/// Writes the full envelope to a temp file in the same directory, then
/// renames it over the target path.  The rename ensures readers never see
/// a half-written file, and the previous vault survives any failure
/// before the rename.
pub fn write_vault(
    path: &Path,
    salt: &[u8; SALT_LEN],
    nonce: &[u8; NONCE_LEN],
    ciphertext: &[u8],
) -> Result<()> {
    let mut buf = Vec::with_capacity(PREFIX_LEN + ciphertext.len());
    buf.extend_from_slice(MAGIC);
    buf.push(CURRENT_VERSION);
    buf.extend_from_slice(salt);
    buf.extend_from_slice(nonce);
    buf.extend_from_slice(ciphertext);

    // Temp file in the same directory so the rename is guaranteed to be
    // atomic on the same filesystem.
    let parent = path.parent().unwrap_or(Path::new("."));
    let tmp_path = parent.join(format!(
        ".{}.tmp",
        path.file_name().unwrap_or_default().to_string_lossy()
    ));

    fs::write(&tmp_path, &buf)?;
    fs::rename(&tmp_path, path)?;

    Ok(())
}

/// Read a vault file from disk and split it into its envelope parts.
///
/// No decryption happens here; the caller derives the key from the salt
/// and opens the ciphertext.
pub fn read_vault(path: &Path) -> Result<RawVault> {
    if !path.exists() {
        return Err(VaultError::VaultNotFound(path.to_path_buf()));
    }

    let data = fs::read(path)?;

    // Minimum size: prefix + an empty sealed document (tag only).
    if data.len() < PREFIX_LEN + TAG_LEN {
        return Err(VaultError::Corrupted(
            "file too small to be a valid vault".into(),
        ));
    }

    if &data[0..4] != MAGIC {
        return Err(VaultError::Corrupted("missing PVDB magic bytes".into()));
    }

    let version = data[4];
    if version != CURRENT_VERSION {
        return Err(VaultError::UnsupportedVersion {
            found: version,
            expected: CURRENT_VERSION,
        });
    }

    let mut salt = [0u8; SALT_LEN];
    salt.copy_from_slice(&data[5..5 + SALT_LEN]);

    let mut nonce = [0u8; NONCE_LEN];
    nonce.copy_from_slice(&data[5 + SALT_LEN..PREFIX_LEN]);

    let ciphertext = data[PREFIX_LEN..].to_vec();

    Ok(RawVault {
        salt,
        nonce,
        ciphertext,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SALT: [u8; SALT_LEN] = [1u8; SALT_LEN];
    const NONCE: [u8; NONCE_LEN] = [2u8; NONCE_LEN];

    #[test]
    fn write_read_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("v.db");
        let ciphertext = vec![9u8; 40];

        write_vault(&path, &SALT, &NONCE, &ciphertext).unwrap();
        let raw = read_vault(&path).unwrap();

        assert_eq!(raw.salt, SALT);
        assert_eq!(raw.nonce, NONCE);
        assert_eq!(raw.ciphertext, ciphertext);
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = TempDir::new().unwrap();
        let err = read_vault(&dir.path().join("absent.db")).unwrap_err();
        assert!(matches!(err, VaultError::VaultNotFound(_)));
    }

    #[test]
    fn rejects_bad_magic() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("v.db");
        write_vault(&path, &SALT, &NONCE, &[0u8; 32]).unwrap();

        let mut data = std::fs::read(&path).unwrap();
        data[0] = b'X';
        std::fs::write(&path, &data).unwrap();

        let err = read_vault(&path).unwrap_err();
        assert!(matches!(err, VaultError::Corrupted(_)));
    }

    #[test]
    fn rejects_unknown_version() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("v.db");
        write_vault(&path, &SALT, &NONCE, &[0u8; 32]).unwrap();

        let mut data = std::fs::read(&path).unwrap();
        data[4] = 99;
        std::fs::write(&path, &data).unwrap();

        let err = read_vault(&path).unwrap_err();
        assert!(matches!(
            err,
            VaultError::UnsupportedVersion {
                found: 99,
                expected: CURRENT_VERSION
            }
        ));
    }

    #[test]
    fn rejects_truncated_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("v.db");
        std::fs::write(&path, b"PVDB\x01short").unwrap();

        let err = read_vault(&path).unwrap_err();
        assert!(matches!(err, VaultError::Corrupted(_)));
    }

    #[test]
    fn overwrite_replaces_previous_content() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("v.db");

        write_vault(&path, &SALT, &NONCE, &[1u8; 32]).unwrap();
        write_vault(&path, &SALT, &NONCE, &[2u8; 32]).unwrap();

        let raw = read_vault(&path).unwrap();
        assert_eq!(raw.ciphertext, vec![2u8; 32]);
    }
}
