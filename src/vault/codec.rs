//! Decrypt-deserialize and serialize-encrypt around the binary format.
//!
//! `load` turns a vault file into a `LoadedVault`: the document tree plus
//! the salt and derived key.  The key is held only so the closing `save`
//! of the same operation does not pay the Argon2 cost twice; it zeroizes
//! on drop and must never outlive the operation.

use std::fmt;
use std::path::Path;

use zeroize::Zeroize;

use crate::crypto::encryption::{open, seal};
use crate::crypto::kdf::{derive_key, generate_salt, KdfParams, SALT_LEN};
use crate::crypto::keys::MasterKey;
use crate::errors::{Result, VaultError};

use super::format::{self, RawVault};
use super::models::Document;

/// A decrypted vault held for the duration of one store operation.
pub struct LoadedVault {
    /// The decrypted document tree.
    pub document: Document,

    /// The vault's per-file salt, reused on save.
    salt: [u8; SALT_LEN],

    /// The derived key (zeroized on drop).
    key: MasterKey,
}

impl Drop for LoadedVault {
    fn drop(&mut self) {
        // The key wipes itself; the decrypted tree needs a hand.
        self.document.zeroize();
    }
}

/// Redacted: a `LoadedVault` holds the derived key and every decrypted
/// credential, none of which belongs in debug output or logs.
impl fmt::Debug for LoadedVault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadedVault").finish_non_exhaustive()
    }
}

/// Create a brand-new vault at `path` containing an empty document.
///
/// Generates a fresh salt, derives the key, and seals the empty document
/// via the atomic-write path.
pub fn init(path: &Path, passphrase: &str, params: &KdfParams) -> Result<()> {
    if path.exists() {
        return Err(VaultError::VaultAlreadyExists(path.to_path_buf()));
    }

    let salt = generate_salt()?;
    let mut key_bytes = derive_key(passphrase.as_bytes(), &salt, params)?;
    let key = MasterKey::new(key_bytes);
    key_bytes.zeroize();

    let vault = LoadedVault {
        document: Document::default(),
        salt,
        key,
    };
    save(path, &vault)
}

/// Read, decrypt, and deserialize the vault at `path`.
pub fn load(path: &Path, passphrase: &str, params: &KdfParams) -> Result<LoadedVault> {
    let raw: RawVault = format::read_vault(path)?;

    let mut key_bytes = derive_key(passphrase.as_bytes(), &raw.salt, params)?;
    let key = MasterKey::new(key_bytes);
    key_bytes.zeroize();

    // Tag check happens here: wrong passphrase and tampering both fail
    // closed before any plaintext exists.
    let mut plaintext = open(key.as_bytes(), &raw.nonce, &raw.ciphertext)?;

    let document: Document = match serde_json::from_slice(&plaintext) {
        Ok(doc) => doc,
        Err(e) => {
            plaintext.zeroize();
            return Err(VaultError::Corrupted(format!("document JSON: {e}")));
        }
    };
    plaintext.zeroize();

    Ok(LoadedVault {
        document,
        salt: raw.salt,
        key,
    })
}

/// Serialize, encrypt, and atomically persist `vault` to `path`.
///
/// Reuses the vault's salt and draws a fresh nonce.  The previous file
/// survives any failure before the final rename.
pub fn save(path: &Path, vault: &LoadedVault) -> Result<()> {
    let mut plaintext = serde_json::to_vec(&vault.document)
        .map_err(|e| VaultError::Serialization(format!("document: {e}")))?;

    let sealed = seal(vault.key.as_bytes(), &plaintext);
    plaintext.zeroize();
    let (nonce, ciphertext) = sealed?;

    format::write_vault(path, &vault.salt, &nonce, &ciphertext)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::kdf::test_params;
    use crate::vault::models::Database;
    use tempfile::TempDir;

    #[test]
    fn init_then_load_yields_empty_document() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("v.db");

        init(&path, "Tr0ub4dor&3", &test_params()).unwrap();
        let vault = load(&path, "Tr0ub4dor&3", &test_params()).unwrap();
        assert!(vault.document.databases.is_empty());
    }

    #[test]
    fn init_refuses_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("v.db");
        std::fs::write(&path, b"anything").unwrap();

        let err = init(&path, "pw", &test_params()).unwrap_err();
        assert!(matches!(err, VaultError::VaultAlreadyExists(_)));
    }

    #[test]
    fn save_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("v.db");
        init(&path, "pw", &test_params()).unwrap();

        let mut vault = load(&path, "pw", &test_params()).unwrap();
        vault.document.databases.push(Database::new("personal"));
        save(&path, &vault).unwrap();

        let reloaded = load(&path, "pw", &test_params()).unwrap();
        assert_eq!(reloaded.document, vault.document);
    }

    #[test]
    fn wrong_passphrase_rejected_and_file_untouched() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("v.db");
        init(&path, "right", &test_params()).unwrap();
        let before = std::fs::read(&path).unwrap();

        let err = load(&path, "wrong", &test_params()).unwrap_err();
        assert!(matches!(err, VaultError::AuthenticationFailed));
        assert_eq!(std::fs::read(&path).unwrap(), before);
    }

    #[test]
    fn tampered_ciphertext_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("v.db");
        init(&path, "pw", &test_params()).unwrap();

        let mut data = std::fs::read(&path).unwrap();
        let last = data.len() - 1;
        data[last] ^= 0x01;
        std::fs::write(&path, &data).unwrap();

        let err = load(&path, "pw", &test_params()).unwrap_err();
        assert!(matches!(err, VaultError::AuthenticationFailed));
    }

    #[test]
    fn authenticated_non_document_payload_is_corrupted() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("v.db");

        // A well-formed envelope whose sealed payload is valid JSON but
        // not a document: decryption authenticates, deserialization must
        // not.
        let salt = [7u8; SALT_LEN];
        let key = derive_key(b"pw", &salt, &test_params()).unwrap();
        let (nonce, ciphertext) = seal(&key, br#"{"not":"a document"}"#).unwrap();
        format::write_vault(&path, &salt, &nonce, &ciphertext).unwrap();

        let err = load(&path, "pw", &test_params()).unwrap_err();
        assert!(matches!(err, VaultError::Corrupted(_)));
    }

    #[test]
    fn debug_output_redacts_vault_contents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("v.db");
        init(&path, "pw", &test_params()).unwrap();

        let vault = load(&path, "pw", &test_params()).unwrap();
        assert_eq!(format!("{vault:?}"), "LoadedVault { .. }");
    }

    #[test]
    fn salt_is_stable_across_saves() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("v.db");
        init(&path, "pw", &test_params()).unwrap();
        let salt_before = format::read_vault(&path).unwrap().salt;

        let vault = load(&path, "pw", &test_params()).unwrap();
        save(&path, &vault).unwrap();

        assert_eq!(format::read_vault(&path).unwrap().salt, salt_before);
    }

    #[test]
    fn nonce_is_fresh_per_save() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("v.db");
        init(&path, "pw", &test_params()).unwrap();
        let nonce_before = format::read_vault(&path).unwrap().nonce;

        let vault = load(&path, "pw", &test_params()).unwrap();
        save(&path, &vault).unwrap();

        assert_ne!(format::read_vault(&path).unwrap().nonce, nonce_before);
    }
}
