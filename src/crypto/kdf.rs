//! Password-based key derivation using PBKDF2-HMAC-SHA256.
//!
//! The vault envelope does not record KDF parameters, so they are fixed
//! here.  Changing any of them makes every existing vault unreadable.

use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use sha2::Sha256;
use zeroize::Zeroize;

use super::keys::{VaultKey, KEY_LEN};
use crate::errors::{LockboxError, Result};

/// Length of the salt in bytes (128 bits).
pub const SALT_LEN: usize = 16;

/// Number of PBKDF2 rounds applied to the master password.
pub const KDF_ITERATIONS: u32 = 200_000;

/// Derive the 32-byte vault key from a password and salt.
///
/// The same password + salt always produce the same key.
pub fn derive_key(password: &[u8], salt: &[u8]) -> Result<VaultKey> {
    if salt.len() != SALT_LEN {
        return Err(LockboxError::KeyDerivationFailed(format!(
            "salt must be {SALT_LEN} bytes, got {}",
            salt.len()
        )));
    }

    let mut bytes = [0u8; KEY_LEN];
    pbkdf2_hmac::<Sha256>(password, salt, KDF_ITERATIONS, &mut bytes);

    let key = VaultKey::new(bytes);
    bytes.zeroize();
    Ok(key)
}

/// Generate a cryptographically random 16-byte salt.
pub fn generate_salt() -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    rand::rng().fill_bytes(&mut salt);
    salt
}
