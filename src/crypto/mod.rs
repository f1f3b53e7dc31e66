//! Cryptographic primitives for Lockbox.
//!
//! This module provides:
//! - AES-256-GCM encryption and decryption with explicit nonces (`encryption`)
//! - PBKDF2-HMAC-SHA256 password-based key derivation (`kdf`)
//! - The zeroize-on-drop `VaultKey` wrapper (`keys`)

pub mod encryption;
pub mod kdf;
pub mod keys;

// Re-export the most commonly used items so callers can write:
//   use crate::crypto::{encrypt, decrypt, derive_key, ...};
pub use encryption::{decrypt, encrypt, generate_nonce, NONCE_LEN, TAG_LEN};
pub use kdf::{derive_key, generate_salt, KDF_ITERATIONS, SALT_LEN};
pub use keys::{VaultKey, KEY_LEN};
