use std::path::PathBuf;
use thiserror::Error;

/// All errors that can occur in Lockbox.
#[derive(Debug, Error)]
pub enum LockboxError {
    // --- Crypto errors ---
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Authentication failed — wrong password or corrupted vault")]
    AuthenticationFailed,

    #[error("Key derivation failed: {0}")]
    KeyDerivationFailed(String),

    // --- Vault state errors ---
    #[error("Vault is locked — run `lockbox unlock` first")]
    VaultLocked,

    #[error("Vault has not been loaded or created in this process")]
    VaultNotLoaded,

    #[error("Vault not found at {0}")]
    VaultNotFound(PathBuf),

    #[error("Vault already exists at {0}")]
    VaultAlreadyExists(PathBuf),

    #[error("Vault at {0} was modified by another process — reload and retry")]
    VaultModified(PathBuf),

    #[error("Invalid vault format: {0}")]
    InvalidVaultFormat(String),

    // --- Record errors ---
    #[error("Credential '{0}' not found")]
    CredentialNotFound(String),

    #[error("Credential '{0}' already exists (use `update` to change it)")]
    CredentialAlreadyExists(String),

    #[error("Alias '{0}' not found")]
    AliasNotFound(String),

    #[error("Alias '{0}' already exists (use `update` to change it)")]
    AliasAlreadyExists(String),

    #[error("Record name cannot be empty")]
    EmptyName,

    // --- Session errors ---
    #[error("No active session — run `lockbox unlock` first")]
    NoActiveSession,

    // --- Config errors ---
    #[error("Config file error: {0}")]
    ConfigError(String),

    // --- IO errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // --- Serialization errors ---
    #[error("Serialization error: {0}")]
    SerializationError(String),

    // --- CLI errors ---
    #[error("Command failed: {0}")]
    CommandFailed(String),

    #[error("Clipboard unavailable: {0}")]
    ClipboardError(String),

    #[error("User cancelled operation")]
    UserCancelled,

    #[error("Password mismatch — passwords do not match")]
    PasswordMismatch,
}

/// Convenience type alias for Lockbox results.
pub type Result<T> = std::result::Result<T, LockboxError>;
