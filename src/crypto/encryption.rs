//! AES-256-GCM authenticated encryption.
//!
//! `seal` generates a fresh random 12-byte nonce per call and returns it
//! alongside the ciphertext; the vault envelope stores the nonce in a
//! fixed header slot rather than prepending it to the ciphertext.  The
//! 16-byte authentication tag is appended to the ciphertext by the cipher.

use aes_gcm::aead::{Aead, KeyInit, OsRng};
use aes_gcm::{AeadCore, Aes256Gcm, Nonce};

use crate::errors::{Result, VaultError};

/// Size of the AES-256-GCM nonce in bytes.
pub const NONCE_LEN: usize = 12;

/// Size of the GCM authentication tag appended to the ciphertext.
pub const TAG_LEN: usize = 16;

/// Encrypt `plaintext` with a 32-byte `key`.
///
/// Returns the fresh nonce and the ciphertext (tag appended).  A nonce is
/// never reused under the same key: every call draws a new one from the OS.
pub fn seal(key: &[u8], plaintext: &[u8]) -> Result<([u8; NONCE_LEN], Vec<u8>)> {
    let cipher = Aes256Gcm::new_from_slice(key)
        .map_err(|e| VaultError::EncryptionFailed(format!("invalid key length: {e}")))?;

    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

    let ciphertext = cipher
        .encrypt(&nonce, plaintext)
        .map_err(|e| VaultError::EncryptionFailed(format!("encryption error: {e}")))?;

    Ok((nonce.into(), ciphertext))
}

/// Decrypt data that was produced by `seal`.
///
/// The tag is verified before any plaintext is released.  Any mismatch
/// (wrong passphrase, corrupted file, tampering) fails closed with
/// `AuthenticationFailed` — no partial plaintext, no detail that would
/// distinguish the causes.
pub fn open(key: &[u8], nonce: &[u8; NONCE_LEN], ciphertext: &[u8]) -> Result<Vec<u8>> {
    if ciphertext.len() < TAG_LEN {
        return Err(VaultError::AuthenticationFailed);
    }

    let cipher = Aes256Gcm::new_from_slice(key).map_err(|_| VaultError::AuthenticationFailed)?;

    let plaintext = cipher
        .decrypt(Nonce::from_slice(nonce), ciphertext)
        .map_err(|_| VaultError::AuthenticationFailed)?;

    Ok(plaintext)
}
