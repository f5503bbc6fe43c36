use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::crypto::kdf::KdfParams;
use crate::errors::{Result, VaultError};

/// Caller-side configuration, loaded from `.passvault.toml`.
///
/// Every field has a sensible default so passvault works out-of-the-box
/// without any config file at all.  The KDF work factor lives here rather
/// than in a constant because its cost should scale with hardware over
/// time (and test suites need it bounded).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Argon2 memory cost in KiB (default: 64 MB).
    #[serde(default = "default_kdf_memory_kib")]
    pub kdf_memory_kib: u32,

    /// Argon2 iteration count (default: 3).
    #[serde(default = "default_kdf_iterations")]
    pub kdf_iterations: u32,

    /// Argon2 parallelism degree (default: 4).
    #[serde(default = "default_kdf_parallelism")]
    pub kdf_parallelism: u32,

    /// Length of generated passwords (default: 20).
    #[serde(default = "default_password_length")]
    pub password_length: usize,
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_kdf_memory_kib() -> u32 {
    65_536 // 64 MB
}

fn default_kdf_iterations() -> u32 {
    3
}

fn default_kdf_parallelism() -> u32 {
    4
}

fn default_password_length() -> usize {
    crate::crypto::password::DEFAULT_LENGTH
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for Settings {
    fn default() -> Self {
        Self {
            kdf_memory_kib: default_kdf_memory_kib(),
            kdf_iterations: default_kdf_iterations(),
            kdf_parallelism: default_kdf_parallelism(),
            password_length: default_password_length(),
        }
    }
}

impl Settings {
    /// Name of the config file we look for next to the caller.
    const FILE_NAME: &'static str = ".passvault.toml";

    /// Load settings from `<dir>/.passvault.toml`.
    ///
    /// If the file does not exist, sensible defaults are returned.
    /// If the file exists but cannot be parsed, an error is returned.
    pub fn load(dir: &Path) -> Result<Self> {
        let config_path = dir.join(Self::FILE_NAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)?;

        let settings: Settings = toml::from_str(&contents).map_err(|e| {
            VaultError::ConfigError(format!("failed to parse {}: {e}", config_path.display()))
        })?;

        Ok(settings)
    }

    /// Convert the KDF settings into crypto-layer params.
    pub fn kdf_params(&self) -> KdfParams {
        KdfParams {
            memory_kib: self.kdf_memory_kib,
            iterations: self.kdf_iterations,
            parallelism: self.kdf_parallelism,
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn default_settings_are_sensible() {
        let s = Settings::default();
        assert_eq!(s.kdf_memory_kib, 65_536);
        assert_eq!(s.kdf_iterations, 3);
        assert_eq!(s.kdf_parallelism, 4);
        assert_eq!(s.password_length, 20);
    }

    #[test]
    fn load_returns_defaults_when_no_config_file() {
        let tmp = TempDir::new().unwrap();
        let settings = Settings::load(tmp.path()).unwrap();
        assert_eq!(settings.kdf_memory_kib, 65_536);
    }

    #[test]
    fn load_parses_toml_file() {
        let tmp = TempDir::new().unwrap();
        let config = r#"
kdf_memory_kib = 131072
kdf_iterations = 5
kdf_parallelism = 8
password_length = 32
"#;
        fs::write(tmp.path().join(".passvault.toml"), config).unwrap();

        let settings = Settings::load(tmp.path()).unwrap();
        assert_eq!(settings.kdf_memory_kib, 131_072);
        assert_eq!(settings.kdf_iterations, 5);
        assert_eq!(settings.kdf_parallelism, 8);
        assert_eq!(settings.password_length, 32);
    }

    #[test]
    fn load_uses_defaults_for_missing_fields() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(".passvault.toml"), "kdf_iterations = 5\n").unwrap();

        let settings = Settings::load(tmp.path()).unwrap();
        assert_eq!(settings.kdf_iterations, 5);
        // Rest should be defaults
        assert_eq!(settings.kdf_memory_kib, 65_536);
        assert_eq!(settings.password_length, 20);
    }

    #[test]
    fn load_errors_on_invalid_toml() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(".passvault.toml"), "not valid {{toml").unwrap();

        assert!(Settings::load(tmp.path()).is_err());
    }

    #[test]
    fn kdf_params_mirror_settings() {
        let s = Settings {
            kdf_memory_kib: 16_384,
            kdf_iterations: 2,
            kdf_parallelism: 1,
            ..Settings::default()
        };
        let params = s.kdf_params();
        assert_eq!(params.memory_kib, 16_384);
        assert_eq!(params.iterations, 2);
        assert_eq!(params.parallelism, 1);
    }
}
