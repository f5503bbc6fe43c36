pub mod config;
pub mod crypto;
pub mod errors;
pub mod vault;

pub use crypto::generate_strong_password;
pub use errors::{Result, VaultError};
pub use vault::{Database, Document, DocumentStore, Secret, SecretGroup};
