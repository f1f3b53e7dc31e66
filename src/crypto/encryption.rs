//! AES-256-GCM authenticated encryption.
//!
//! Unlike a self-describing blob, the vault envelope stores the nonce in
//! its own slot, so both functions take the nonce explicitly.  Callers
//! must draw a fresh nonce with `generate_nonce` for every encryption
//! under the same key.
//!
//! No associated data is bound.  Output is `ciphertext || 16-byte tag`.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use rand::RngCore;

use super::keys::VaultKey;
use crate::errors::{LockboxError, Result};

/// Size of the AES-256-GCM nonce in bytes.
pub const NONCE_LEN: usize = 12;

/// Size of the GCM authentication tag in bytes.
pub const TAG_LEN: usize = 16;

/// Generate a random 12-byte nonce.
pub fn generate_nonce() -> [u8; NONCE_LEN] {
    let mut nonce = [0u8; NONCE_LEN];
    rand::rng().fill_bytes(&mut nonce);
    nonce
}

/// Encrypt `plaintext` under `key` and `nonce`.
pub fn encrypt(key: &VaultKey, nonce: &[u8; NONCE_LEN], plaintext: &[u8]) -> Result<Vec<u8>> {
    let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| LockboxError::EncryptionFailed(format!("invalid key length: {e}")))?;

    cipher
        .encrypt(Nonce::from_slice(nonce), plaintext)
        .map_err(|e| LockboxError::EncryptionFailed(format!("encryption error: {e}")))
}

/// Decrypt and authenticate data produced by `encrypt`.
///
/// Any failure, including a wrong key or a flipped bit, is reported as
/// `AuthenticationFailed`; there is no partial output.
pub fn decrypt(key: &VaultKey, nonce: &[u8; NONCE_LEN], ciphertext: &[u8]) -> Result<Vec<u8>> {
    if ciphertext.len() < TAG_LEN {
        return Err(LockboxError::AuthenticationFailed);
    }

    let cipher =
        Aes256Gcm::new_from_slice(key.as_bytes()).map_err(|_| LockboxError::AuthenticationFailed)?;

    cipher
        .decrypt(Nonce::from_slice(nonce), ciphertext)
        .map_err(|_| LockboxError::AuthenticationFailed)
}
