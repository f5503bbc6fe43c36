//! Vault module — the encrypted hierarchical document store.
//!
//! This module provides:
//! - `Document`, `Database`, `SecretGroup`, `Secret` types (`models`)
//! - Binary vault envelope and atomic persistence (`format`)
//! - The decrypt/encrypt transform around the format (`codec`)
//! - Advisory per-path locking (`lock`)
//! - The `DocumentStore` operation surface (`store`)

pub mod codec;
pub mod format;
pub mod lock;
pub mod models;
pub mod store;

// Re-export the most commonly used items.
pub use models::{Database, Document, Secret, SecretGroup};
pub use store::DocumentStore;
