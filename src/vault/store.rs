//! The vault state machine used by CLI commands.
//!
//! A `Vault` moves through three states:
//!
//! - **Unknown**: nothing loaded yet.
//! - **Sealed**: envelope loaded, no key, CRUD forbidden.
//! - **Unlocked**: key available and `VaultData` decrypted, CRUD allowed.
//!
//! Every mutation re-seals the whole document under the existing salt with
//! a fresh nonce and rewrites the full envelope.  Read-modify-write
//! sequences hold the advisory lock on `VaultPaths::lock_file`, and a
//! persist refuses to overwrite an envelope that changed on disk since
//! this handle last saw it.

use crate::config::VaultPaths;
use crate::crypto::{derive_key, generate_salt, VaultKey};
use crate::errors::{LockboxError, Result};
use crate::storage::{read_secure_file, write_secure_file, FileLock};

use super::format::Envelope;
use super::keycache::{KeyCache, KeyState};
use super::model::{insert_record, remove_record, Alias, Credential, VaultData};
use super::patch::{apply_patch, AliasPatch, CredentialPatch};

/// Observable lifecycle state of a `Vault`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VaultState {
    Unknown,
    Sealed,
    Unlocked,
}

enum Inner {
    Unknown,
    Sealed {
        envelope: Envelope,
    },
    Unlocked {
        envelope: Envelope,
        key: VaultKey,
        data: VaultData,
    },
}

/// The main vault handle.
pub struct Vault {
    paths: VaultPaths,
    cache: KeyCache,
    inner: Inner,
}

impl Vault {
    /// A handle in the `Unknown` state.  Nothing is read until `load`.
    pub fn new(paths: VaultPaths) -> Self {
        let cache = KeyCache::new(paths.key_cache_file.clone());
        Self {
            paths,
            cache,
            inner: Inner::Unknown,
        }
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// True iff the envelope file exists and is non-empty.
    pub fn exists(&self) -> bool {
        std::fs::metadata(&self.paths.vault_file)
            .map(|meta| meta.is_file() && meta.len() > 0)
            .unwrap_or(false)
    }

    /// Create a new, empty vault protected by `password`.
    ///
    /// The key is derived and an encrypt/decrypt round-trip is verified
    /// before anything touches disk.  Any key cached for a previous vault
    /// is removed.  The handle is left `Sealed`: call `unlock` to use it.
    pub fn create(&mut self, password: &str) -> Result<&mut Self> {
        let _guard = FileLock::acquire(&self.paths.lock_file)?;

        if self.exists() {
            return Err(LockboxError::VaultAlreadyExists(
                self.paths.vault_file.clone(),
            ));
        }

        self.install(password)
    }

    /// Replace whatever vault exists with a new, empty one.
    ///
    /// Same checks as `create`.  The old envelope stays in place until the
    /// new one has been sealed and verified, and the swap is a single
    /// atomic rename, so a failure at any step leaves the old vault usable.
    pub fn replace(&mut self, password: &str) -> Result<&mut Self> {
        let _guard = FileLock::acquire(&self.paths.lock_file)?;
        let existed = self.exists();

        self.install(password)?;
        if existed {
            tracing::debug!(path = %self.paths.vault_file.display(), "previous vault replaced");
        }
        Ok(self)
    }

    /// Seal an empty document under `password` and write it.  Caller holds the lock.
    fn install(&mut self, password: &str) -> Result<&mut Self> {
        let salt = generate_salt();
        let key = derive_key(password.as_bytes(), &salt)?;
        let envelope = Envelope::seal(&key, salt, &VaultData::default())?;

        if !envelope.open(&key)?.is_empty() {
            return Err(LockboxError::EncryptionFailed(
                "round-trip check produced a non-empty vault".into(),
            ));
        }

        write_secure_file(&self.paths.vault_file, &envelope.to_bytes())?;
        self.cache.clear()?;

        tracing::debug!(path = %self.paths.vault_file.display(), "vault created");
        self.inner = Inner::Sealed { envelope };
        Ok(self)
    }

    /// Read the envelope from disk.
    ///
    /// With a cached key the document is decrypted and the vault becomes
    /// `Unlocked`.  Without one, `require_key` decides between failing with
    /// `VaultLocked` and staying `Sealed`.
    pub fn load(&mut self, require_key: bool) -> Result<&mut Self> {
        let _guard = FileLock::acquire(&self.paths.lock_file)?;

        let envelope = self.read_envelope()?;

        self.inner = match self.cache.load()? {
            KeyState::Unlocked(key) => match envelope.open(&key) {
                Ok(data) => {
                    tracing::debug!(records = data.len(), "vault loaded with cached key");
                    Inner::Unlocked {
                        envelope,
                        key,
                        data,
                    }
                }
                Err(LockboxError::AuthenticationFailed) if !require_key => {
                    tracing::warn!("cached key does not open this vault; staying sealed");
                    Inner::Sealed { envelope }
                }
                Err(e) => return Err(e),
            },
            KeyState::Locked if require_key => return Err(LockboxError::VaultLocked),
            KeyState::Locked => {
                tracing::debug!("vault loaded sealed");
                Inner::Sealed { envelope }
            }
        };

        Ok(self)
    }

    /// Verify `password` against the loaded envelope and cache its key.
    ///
    /// On a wrong password nothing changes.  Unlocking an already unlocked
    /// vault re-caches the key and leaves the in-memory data alone.
    pub fn unlock(&mut self, password: &str) -> Result<&mut Self> {
        let envelope = match &self.inner {
            Inner::Unknown => return Err(LockboxError::VaultNotLoaded),
            Inner::Sealed { envelope } | Inner::Unlocked { envelope, .. } => envelope,
        };

        let candidate = derive_key(password.as_bytes(), &envelope.salt)?;
        let opened = envelope.open(&candidate)?;

        {
            let _guard = FileLock::acquire(&self.paths.lock_file)?;
            self.cache.store(&candidate)?;
        }

        self.inner = match std::mem::replace(&mut self.inner, Inner::Unknown) {
            Inner::Unlocked { envelope, data, .. } => Inner::Unlocked {
                envelope,
                key: candidate,
                data,
            },
            Inner::Sealed { envelope } => Inner::Unlocked {
                envelope,
                key: candidate,
                data: opened,
            },
            Inner::Unknown => return Err(LockboxError::VaultNotLoaded),
        };

        tracing::debug!("vault unlocked");
        Ok(self)
    }

    /// Delete the cached key.
    ///
    /// Only the cache is affected: this handle keeps whatever it already
    /// holds in memory and the envelope on disk is not touched.  Later
    /// handles will load `Sealed` until the next `unlock`.
    pub fn lock(&mut self) -> Result<()> {
        let _guard = FileLock::acquire(&self.paths.lock_file)?;
        self.cache.clear()?;

        tracing::debug!("cached key removed");
        Ok(())
    }

    /// Remove the envelope and any cached key.
    pub fn destroy(&mut self) -> Result<()> {
        let _guard = FileLock::acquire(&self.paths.lock_file)?;
        self.cache.clear()?;
        crate::storage::delete_secure_file(&self.paths.vault_file)?;
        self.inner = Inner::Unknown;
        tracing::debug!(path = %self.paths.vault_file.display(), "vault destroyed");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Credentials
    // ------------------------------------------------------------------

    /// Add a credential.  Fails if the name is taken.
    pub fn add_credential(&mut self, credential: Credential) -> Result<()> {
        self.mutate(|data| {
            insert_record(
                &mut data.credentials,
                credential,
                LockboxError::CredentialAlreadyExists,
            )
        })
    }

    /// Look up a credential.  A missing name is `Ok(None)`.
    pub fn get_credential(&self, name: &str) -> Result<Option<&Credential>> {
        Ok(self.data()?.credentials.get(name))
    }

    /// All credentials, sorted by name.
    pub fn list_credentials(&self) -> Result<Vec<&Credential>> {
        Ok(self.data()?.credentials.values().collect())
    }

    /// Delete a credential.  Fails if the name is absent.
    pub fn delete_credential(&mut self, name: &str) -> Result<()> {
        self.mutate(|data| {
            remove_record(&mut data.credentials, name, LockboxError::CredentialNotFound).map(drop)
        })
    }

    /// Apply a partial update (optionally renaming) to a credential.
    pub fn update_credential(&mut self, patch: &CredentialPatch) -> Result<()> {
        self.mutate(|data| {
            apply_patch(
                &mut data.credentials,
                patch,
                LockboxError::CredentialNotFound,
                LockboxError::CredentialAlreadyExists,
            )
        })
    }

    // ------------------------------------------------------------------
    // Aliases
    // ------------------------------------------------------------------

    /// Add an alias.  Fails if the name is taken.
    pub fn add_alias(&mut self, alias: Alias) -> Result<()> {
        self.mutate(|data| insert_record(&mut data.aliases, alias, LockboxError::AliasAlreadyExists))
    }

    /// Look up an alias.  A missing name is `Ok(None)`.
    pub fn get_alias(&self, name: &str) -> Result<Option<&Alias>> {
        Ok(self.data()?.aliases.get(name))
    }

    /// All aliases, sorted by name.
    pub fn list_aliases(&self) -> Result<Vec<&Alias>> {
        Ok(self.data()?.aliases.values().collect())
    }

    /// Delete an alias.  Fails if the name is absent.
    pub fn delete_alias(&mut self, name: &str) -> Result<()> {
        self.mutate(|data| {
            remove_record(&mut data.aliases, name, LockboxError::AliasNotFound).map(drop)
        })
    }

    /// Apply a partial update (optionally renaming) to an alias.
    pub fn update_alias(&mut self, patch: &AliasPatch) -> Result<()> {
        self.mutate(|data| {
            apply_patch(
                &mut data.aliases,
                patch,
                LockboxError::AliasNotFound,
                LockboxError::AliasAlreadyExists,
            )
        })
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn state(&self) -> VaultState {
        match self.inner {
            Inner::Unknown => VaultState::Unknown,
            Inner::Sealed { .. } => VaultState::Sealed,
            Inner::Unlocked { .. } => VaultState::Unlocked,
        }
    }

    pub fn paths(&self) -> &VaultPaths {
        &self.paths
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn data(&self) -> Result<&VaultData> {
        match &self.inner {
            Inner::Unlocked { data, .. } => Ok(data),
            _ => Err(LockboxError::VaultLocked),
        }
    }

    fn read_envelope(&self) -> Result<Envelope> {
        match read_secure_file(&self.paths.vault_file)? {
            Some(bytes) if !bytes.is_empty() => Envelope::from_bytes(&bytes),
            _ => Err(LockboxError::VaultNotFound(self.paths.vault_file.clone())),
        }
    }

    /// Apply `change` to a copy of the document, persist it, then commit.
    ///
    /// If `change` or the write fails, the in-memory document is unchanged.
    fn mutate<F>(&mut self, change: F) -> Result<()>
    where
        F: FnOnce(&mut VaultData) -> Result<()>,
    {
        let Inner::Unlocked {
            envelope,
            key,
            data,
        } = &mut self.inner
        else {
            return Err(LockboxError::VaultLocked);
        };

        let mut next = data.clone();
        change(&mut next)?;

        let _guard = FileLock::acquire(&self.paths.lock_file)?;

        let on_disk = read_secure_file(&self.paths.vault_file)?;
        if on_disk.as_deref() != Some(envelope.to_bytes().as_slice()) {
            return Err(LockboxError::VaultModified(self.paths.vault_file.clone()));
        }

        let sealed = envelope.reseal(key, &next)?;
        write_secure_file(&self.paths.vault_file, &sealed.to_bytes())?;

        tracing::debug!(records = next.len(), "vault persisted");
        *envelope = sealed;
        *data = next;
        Ok(())
    }
}
