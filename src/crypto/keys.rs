//! Zeroize-on-drop wrapper for the derived vault key.
//!
//! The key lives only for the duration of one store operation; wrapping
//! it in `MasterKey` guarantees the bytes are wiped when the operation
//! returns, on every exit path.

use zeroize::Zeroize;

use super::kdf::KEY_LEN;

/// A wrapper around the 32-byte derived key that automatically zeroes
/// its memory when dropped.
#[derive(Zeroize)]
#[zeroize(drop)]
pub struct MasterKey {
    bytes: [u8; KEY_LEN],
}

impl MasterKey {
    /// Create a new `MasterKey` from raw bytes.
    pub fn new(bytes: [u8; KEY_LEN]) -> Self {
        Self { bytes }
    }

    /// Access the raw key bytes (e.g. to pass to the AEAD layer).
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.bytes
    }
}
