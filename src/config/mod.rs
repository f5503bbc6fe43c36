//! Caller-side configuration (`.passvault.toml`).

pub mod settings;

pub use settings::Settings;
