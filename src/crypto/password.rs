//! Strong random password generation.
//!
//! Used both for suggested secret passwords and suggested vault
//! passphrases.  Each character is drawn independently from a CSPRNG
//! (`ThreadRng` is ChaCha-based and periodically reseeded from the OS),
//! and `random_range` rejects rather than folds, so the distribution
//! over the charset is unbiased.

use rand::Rng;

/// Length of a generated password when the caller does not configure one.
pub const DEFAULT_LENGTH: usize = 20;

/// Characters a generated password is drawn from: uppercase, lowercase,
/// digits, and symbols.
const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ\
                         abcdefghijklmnopqrstuvwxyz\
                         0123456789\
                         !@#$%^&*()-_=+[]{};:,.<>?";

/// Generate a random password of `length` characters.
pub fn generate_strong_password(length: usize) -> String {
    let mut rng = rand::rng();
    (0..length)
        .map(|_| CHARSET[rng.random_range(0..CHARSET.len())] as char)
        .collect()
}
