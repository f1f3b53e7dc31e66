//! The symmetric vault key.

use zeroize::Zeroize;

use crate::errors::{LockboxError, Result};

/// Length of the vault key in bytes (256 bits, for AES-256).
pub const KEY_LEN: usize = 32;

/// A wrapper around the 32-byte vault key that automatically zeroes
/// its memory when dropped.
#[derive(Clone, Zeroize)]
#[zeroize(drop)]
pub struct VaultKey {
    bytes: [u8; KEY_LEN],
}

impl VaultKey {
    /// Create a new `VaultKey` from raw bytes.
    pub fn new(bytes: [u8; KEY_LEN]) -> Self {
        Self { bytes }
    }

    /// Rebuild a key from bytes read back from the key cache.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let bytes: [u8; KEY_LEN] = bytes.try_into().map_err(|_| {
            LockboxError::InvalidVaultFormat(format!(
                "cached key must be {KEY_LEN} bytes, got {}",
                bytes.len()
            ))
        })?;
        Ok(Self { bytes })
    }

    /// Access the raw key bytes (e.g. to build a cipher or cache the key).
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.bytes
    }
}

// Never print key material, even in debug output.
impl std::fmt::Debug for VaultKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("VaultKey(..)")
    }
}

impl PartialEq for VaultKey {
    fn eq(&self, other: &Self) -> bool {
        use subtle::ConstantTimeEq;
        self.bytes.ct_eq(&other.bytes).into()
    }
}

impl Eq for VaultKey {}
