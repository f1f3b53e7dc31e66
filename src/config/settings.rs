use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::{LockboxError, Result};

/// Environment variable that relocates the Lockbox home directory.
pub const HOME_ENV: &str = "LOCKBOX_HOME";

/// Directory name under the user's home when `LOCKBOX_HOME` is unset.
const DEFAULT_HOME_DIR: &str = ".lockbox";

/// Longest session a config file may ask for (one year).
const MAX_SESSION_LIFESPAN_SECS: u64 = 365 * 24 * 60 * 60;

/// User-level configuration, loaded from `<home>/config.toml`.
///
/// Every field has a sensible default so Lockbox works out-of-the-box
/// without any config file at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Vault envelope file, relative to the home directory unless absolute.
    #[serde(default = "default_vault_file")]
    pub vault_file: PathBuf,

    /// Session record file, relative to the home directory unless absolute.
    #[serde(default = "default_session_file")]
    pub session_file: PathBuf,

    /// Directory holding the cached key.  Defaults to the most volatile
    /// location the host offers (see `default_key_cache_dir`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_cache_dir: Option<PathBuf>,

    /// How long an unlock session stays active, in seconds (default: 30 min).
    #[serde(default = "default_session_lifespan_secs")]
    pub session_lifespan_secs: u64,

    /// Default length for generated passwords.
    #[serde(default = "default_password_length")]
    pub password_length: usize,
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_vault_file() -> PathBuf {
    PathBuf::from("vault.enc")
}

fn default_session_file() -> PathBuf {
    PathBuf::from("session.json")
}

fn default_session_lifespan_secs() -> u64 {
    30 * 60
}

fn default_password_length() -> usize {
    15
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for Settings {
    fn default() -> Self {
        Self {
            vault_file: default_vault_file(),
            session_file: default_session_file(),
            key_cache_dir: None,
            session_lifespan_secs: default_session_lifespan_secs(),
            password_length: default_password_length(),
        }
    }
}

/// Fully resolved locations of every file Lockbox touches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultPaths {
    /// Encrypted envelope (`salt || nonce || ciphertext`).
    pub vault_file: PathBuf,
    /// Raw cached key, present only while unlocked.
    pub key_cache_file: PathBuf,
    /// JSON session record.
    pub session_file: PathBuf,
    /// Advisory lock serializing read-modify-write sequences.
    pub lock_file: PathBuf,
}

impl VaultPaths {
    /// Put every file inside `dir`.  Handy for tests and throwaway vaults.
    pub fn in_dir(dir: &Path) -> Self {
        let vault_file = dir.join(default_vault_file());
        Self {
            lock_file: lock_file_for(&vault_file),
            key_cache_file: dir.join(key_cache_file_name(&vault_file)),
            session_file: dir.join(default_session_file()),
            vault_file,
        }
    }
}

impl Settings {
    /// Name of the config file we look for in the home directory.
    const FILE_NAME: &'static str = "config.toml";

    /// Load settings from `<home>/config.toml`.
    ///
    /// If the file does not exist, sensible defaults are returned.
    /// If the file exists but cannot be parsed or holds out-of-range
    /// values, an error is returned.
    pub fn load(home: &Path) -> Result<Self> {
        let config_path = home.join(Self::FILE_NAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)?;

        let settings: Settings = toml::from_str(&contents).map_err(|e| {
            LockboxError::ConfigError(format!("Failed to parse {}: {e}", config_path.display()))
        })?;

        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        if self.session_lifespan_secs == 0 || self.session_lifespan_secs > MAX_SESSION_LIFESPAN_SECS
        {
            return Err(LockboxError::ConfigError(format!(
                "session_lifespan_secs must be between 1 and {MAX_SESSION_LIFESPAN_SECS} (got {})",
                self.session_lifespan_secs
            )));
        }
        if self.password_length == 0 {
            return Err(LockboxError::ConfigError(
                "password_length must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Resolve every file path against `home`.
    pub fn paths(&self, home: &Path) -> VaultPaths {
        let vault_file = home.join(&self.vault_file);
        let cache_dir = self
            .key_cache_dir
            .clone()
            .unwrap_or_else(default_key_cache_dir);

        VaultPaths {
            lock_file: lock_file_for(&vault_file),
            key_cache_file: cache_dir.join(key_cache_file_name(&vault_file)),
            session_file: home.join(&self.session_file),
            vault_file,
        }
    }

    /// Session lifespan as a chrono duration.
    pub fn session_lifespan(&self) -> chrono::Duration {
        let secs = i64::try_from(self.session_lifespan_secs).unwrap_or(i64::MAX);
        chrono::Duration::try_seconds(secs).unwrap_or(chrono::Duration::MAX)
    }
}

/// Work out the Lockbox home directory.
///
/// Order: explicit override, `$LOCKBOX_HOME`, `~/.lockbox`.
pub fn resolve_home(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(dir) = explicit {
        return Ok(dir.to_path_buf());
    }

    if let Ok(dir) = std::env::var(HOME_ENV) {
        if !dir.is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }

    dirs::home_dir()
        .map(|home| home.join(DEFAULT_HOME_DIR))
        .ok_or_else(|| {
            LockboxError::ConfigError(format!(
                "cannot determine home directory — set {HOME_ENV}"
            ))
        })
}

/// The most ephemeral directory available for the cached key.
///
/// `/dev/shm` (RAM-backed on Linux) first, then the per-user runtime
/// directory, then the OS temp directory as a last resort.
pub fn default_key_cache_dir() -> PathBuf {
    let shm = Path::new("/dev/shm");
    if shm.is_dir() {
        return shm.to_path_buf();
    }

    dirs::runtime_dir().unwrap_or_else(std::env::temp_dir)
}

/// Cached key file name for one vault.
///
/// Volatile cache directories are shared by every vault a user has (and
/// by every user), so the name carries the uid plus a digest of the
/// absolute vault path: `lockbox-<uid>-<16 hex>.key`.
fn key_cache_file_name(vault_file: &Path) -> String {
    let digest = vault_path_digest(vault_file);

    #[cfg(unix)]
    {
        // SAFETY: getuid has no preconditions and cannot fail.
        let uid = unsafe { libc::getuid() };
        format!("lockbox-{uid}-{digest}.key")
    }

    #[cfg(not(unix))]
    {
        format!("lockbox-{digest}.key")
    }
}

/// First 8 bytes of SHA-256 over the absolute vault path, hex encoded.
///
/// The path is made absolute against the working directory but not
/// canonicalized: the vault file may not exist yet when the name is
/// first needed, and the name must not change once it does.
fn vault_path_digest(vault_file: &Path) -> String {
    use sha2::{Digest, Sha256};

    let absolute = if vault_file.is_absolute() {
        vault_file.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(vault_file))
            .unwrap_or_else(|_| vault_file.to_path_buf())
    };

    let hash = Sha256::digest(absolute.as_os_str().to_string_lossy().as_bytes());
    hash[..8].iter().map(|b| format!("{b:02x}")).collect()
}

fn lock_file_for(vault_file: &Path) -> PathBuf {
    let mut name = vault_file.file_name().unwrap_or_default().to_os_string();
    name.push(".lock");
    vault_file.with_file_name(name)
}

// ── Tests ────────────────────────────────────────────────────────────
