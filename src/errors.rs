use std::path::PathBuf;
use thiserror::Error;

/// All errors that can occur in passvault.
#[derive(Debug, Error)]
pub enum VaultError {
    // --- Crypto errors ---
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Authentication failed — wrong passphrase or tampered vault")]
    AuthenticationFailed,

    #[error("Key derivation failed: {0}")]
    KeyDerivationFailed(String),

    // --- Vault file errors ---
    #[error("Vault not found at {0}")]
    VaultNotFound(PathBuf),

    #[error("Vault already exists at {0}")]
    VaultAlreadyExists(PathBuf),

    #[error("Corrupted vault: {0}")]
    Corrupted(String),

    #[error("Unsupported vault format version {found} (expected {expected})")]
    UnsupportedVersion { found: u8, expected: u8 },

    // --- Document errors ---
    #[error("Database '{0}' not found")]
    DatabaseNotFound(String),

    #[error("Database '{0}' already exists")]
    DatabaseExists(String),

    #[error("Database '{0}' still contains secret groups — delete them first")]
    DatabaseNotEmpty(String),

    #[error("Secret group '{0}' not found")]
    GroupNotFound(String),

    #[error("Secret group '{0}' already exists")]
    GroupExists(String),

    #[error("Secret {0} not found")]
    SecretNotFound(u32),

    #[error("Invalid input: {0}")]
    Validation(String),

    // --- Config errors ---
    #[error("Config file error: {0}")]
    ConfigError(String),

    // --- IO errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Lock error: {0}")]
    Lock(String),
}

/// Convenience type alias for passvault results.
pub type Result<T> = std::result::Result<T, VaultError>;
