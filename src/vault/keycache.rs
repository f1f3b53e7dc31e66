//! The cached vault key.
//!
//! While a vault is unlocked its raw 32-byte key sits in a single file on
//! the most volatile medium available (see `config::default_key_cache_dir`),
//! so later invocations can decrypt without the password.  The file is
//! never written alongside the vault envelope.

use std::path::{Path, PathBuf};

use zeroize::Zeroize;

use crate::crypto::VaultKey;
use crate::errors::Result;
use crate::storage::{delete_secure_file, read_secure_file, write_secure_file};

/// Whether a usable key is cached.
#[derive(Debug)]
pub enum KeyState {
    Locked,
    Unlocked(VaultKey),
}

impl KeyState {
    pub fn is_unlocked(&self) -> bool {
        matches!(self, KeyState::Unlocked(_))
    }
}

/// Handle to the cached key file.
#[derive(Debug, Clone)]
pub struct KeyCache {
    path: PathBuf,
}

impl KeyCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the cached key.
    ///
    /// A missing file means `Locked`.  A file of the wrong size cannot be
    /// a key and is also reported as `Locked`.
    pub fn load(&self) -> Result<KeyState> {
        let Some(mut bytes) = read_secure_file(&self.path)? else {
            return Ok(KeyState::Locked);
        };

        let key = VaultKey::from_slice(&bytes);
        bytes.zeroize();

        match key {
            Ok(key) => Ok(KeyState::Unlocked(key)),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "ignoring malformed cached key");
                Ok(KeyState::Locked)
            }
        }
    }

    /// Cache `key`, replacing any previous one.
    pub fn store(&self, key: &VaultKey) -> Result<()> {
        write_secure_file(&self.path, key.as_bytes())
    }

    /// Remove the cached key.  No-op when nothing is cached.
    pub fn clear(&self) -> Result<()> {
        delete_secure_file(&self.path)
    }
}
