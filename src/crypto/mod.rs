//! Cryptographic primitives for passvault.
//!
//! This module provides:
//! - AES-256-GCM sealing and opening (`encryption`)
//! - Argon2id passphrase-based key derivation (`kdf`)
//! - The zeroize-on-drop `MasterKey` wrapper (`keys`)
//! - Strong random password generation (`password`)

pub mod encryption;
pub mod kdf;
pub mod keys;
pub mod password;

// Re-export the most commonly used items so callers can write:
//   use passvault::crypto::{derive_key, seal, open, ...};
pub use encryption::{open, seal};
pub use kdf::{derive_key, generate_salt, KdfParams};
pub use keys::MasterKey;
pub use password::generate_strong_password;
