//! Configuration: `config.toml` settings and resolved file locations.

pub mod settings;

pub use settings::{default_key_cache_dir, resolve_home, Settings, VaultPaths, HOME_ENV};
