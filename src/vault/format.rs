//! Binary vault envelope.
//!
//! A vault file has this layout:
//!
//! ```text
//! [salt: 16 bytes][nonce: 12 bytes][AES-256-GCM ciphertext + 16-byte tag]
//! ```
//!
//! - **Salt**: PBKDF2 salt, fixed for the life of the vault.
//! - **Nonce**: drawn fresh every time the document is re-sealed.
//! - **Ciphertext**: the JSON-serialized `VaultData`, no associated data.

use zeroize::Zeroize;

use super::model::VaultData;
use crate::crypto::{decrypt, encrypt, generate_nonce, VaultKey, NONCE_LEN, SALT_LEN};
use crate::errors::{LockboxError, Result};

/// Fixed-size prefix: 16 (salt) + 12 (nonce).
pub const HEADER_LEN: usize = SALT_LEN + NONCE_LEN;

/// The parsed parts of a vault file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub salt: [u8; SALT_LEN],
    pub nonce: [u8; NONCE_LEN],
    pub ciphertext: Vec<u8>,
}

impl Envelope {
    /// Split raw file bytes into salt, nonce and ciphertext.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < HEADER_LEN {
            return Err(LockboxError::InvalidVaultFormat(format!(
                "file is {} bytes, a vault needs at least {HEADER_LEN}",
                data.len()
            )));
        }

        let (salt, rest) = data.split_at(SALT_LEN);
        let (nonce, ciphertext) = rest.split_at(NONCE_LEN);

        Ok(Self {
            salt: salt
                .try_into()
                .map_err(|_| LockboxError::InvalidVaultFormat("bad salt".into()))?,
            nonce: nonce
                .try_into()
                .map_err(|_| LockboxError::InvalidVaultFormat("bad nonce".into()))?,
            ciphertext: ciphertext.to_vec(),
        })
    }

    /// Concatenate the parts back into the on-disk layout.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(HEADER_LEN + self.ciphertext.len());
        buf.extend_from_slice(&self.salt);
        buf.extend_from_slice(&self.nonce);
        buf.extend_from_slice(&self.ciphertext);
        buf
    }

    /// Encrypt `data` under `key` with a freshly drawn nonce.
    pub fn seal(key: &VaultKey, salt: [u8; SALT_LEN], data: &VaultData) -> Result<Self> {
        Self::seal_with_nonce(key, salt, generate_nonce(), data)
    }

    /// Re-encrypt `data` for this vault, keeping the salt.
    ///
    /// The new nonce is guaranteed to differ from the current one.
    pub fn reseal(&self, key: &VaultKey, data: &VaultData) -> Result<Self> {
        let mut nonce = generate_nonce();
        while nonce == self.nonce {
            nonce = generate_nonce();
        }
        Self::seal_with_nonce(key, self.salt, nonce, data)
    }

    /// Decrypt and decode the vault document.
    pub fn open(&self, key: &VaultKey) -> Result<VaultData> {
        let mut plaintext = decrypt(key, &self.nonce, &self.ciphertext)?;
        let data = VaultData::from_json(&plaintext);
        plaintext.zeroize();
        data
    }

    fn seal_with_nonce(
        key: &VaultKey,
        salt: [u8; SALT_LEN],
        nonce: [u8; NONCE_LEN],
        data: &VaultData,
    ) -> Result<Self> {
        let mut plaintext = data.to_json()?;
        let ciphertext = encrypt(key, &nonce, &plaintext);
        plaintext.zeroize();

        Ok(Self {
            salt,
            nonce,
            ciphertext: ciphertext?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vault::model::Credential;

    fn key() -> VaultKey {
        VaultKey::new([0x42; 32])
    }

    #[test]
    fn layout_is_salt_nonce_ciphertext() {
        let env = Envelope::seal(&key(), [1u8; SALT_LEN], &VaultData::default()).unwrap();
        let bytes = env.to_bytes();

        assert_eq!(&bytes[..SALT_LEN], &[1u8; SALT_LEN]);
        assert_eq!(&bytes[SALT_LEN..HEADER_LEN], &env.nonce);
        assert_eq!(&bytes[HEADER_LEN..], env.ciphertext.as_slice());
        assert_eq!(Envelope::from_bytes(&bytes).unwrap(), env);
    }

    #[test]
    fn short_input_is_invalid_format() {
        let result = Envelope::from_bytes(&[0u8; HEADER_LEN - 1]);
        assert!(matches!(result, Err(LockboxError::InvalidVaultFormat(_))));
    }

    #[test]
    fn header_only_envelope_fails_authentication() {
        let env = Envelope::from_bytes(&[0u8; HEADER_LEN]).unwrap();
        assert!(env.ciphertext.is_empty());
        assert!(matches!(
            env.open(&key()),
            Err(LockboxError::AuthenticationFailed)
        ));
    }

    #[test]
    fn reseal_keeps_salt_and_changes_nonce() {
        let mut data = VaultData::default();
        let env = Envelope::seal(&key(), [9u8; SALT_LEN], &data).unwrap();

        data.credentials
            .insert("mail".into(), Credential::new("mail", "me", "pw"));
        let next = env.reseal(&key(), &data).unwrap();

        assert_eq!(next.salt, env.salt);
        assert_ne!(next.nonce, env.nonce);
        assert_eq!(next.open(&key()).unwrap(), data);
    }

    #[test]
    fn open_with_wrong_key_fails() {
        let env = Envelope::seal(&key(), [0u8; SALT_LEN], &VaultData::default()).unwrap();
        let other = VaultKey::new([0x43; 32]);
        assert!(matches!(
            env.open(&other),
            Err(LockboxError::AuthenticationFailed)
        ));
    }
}
