//! Records stored inside a vault and the decrypted document holding them.
//!
//! Credentials and aliases live in two independent namespaces: the same
//! name may exist in both without conflict.  Names are case-sensitive.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::errors::{LockboxError, Result};

/// A stored login.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub name: String,
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Credential {
    /// A credential with no notes and no tags.
    pub fn new(
        name: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            username: username.into(),
            password: password.into(),
            notes: String::new(),
            tags: Vec::new(),
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }
}

// Keep passwords out of logs and panic messages.
impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("name", &self.name)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("notes", &self.notes)
            .field("tags", &self.tags)
            .finish()
    }
}

/// A saved shell command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alias {
    pub name: String,
    pub command: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Alias {
    /// An alias with no notes and no tags.
    pub fn new(name: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            command: command.into(),
            notes: String::new(),
            tags: Vec::new(),
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }
}

/// Access to the identity of a stored record.
pub trait Record: Clone {
    fn name(&self) -> &str;
    fn set_name(&mut self, name: String);
}

impl Record for Credential {
    fn name(&self) -> &str {
        &self.name
    }

    fn set_name(&mut self, name: String) {
        self.name = name;
    }
}

impl Record for Alias {
    fn name(&self) -> &str {
        &self.name
    }

    fn set_name(&mut self, name: String) {
        self.name = name;
    }
}

/// The decrypted vault document.  Lives only in memory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultData {
    #[serde(default)]
    pub credentials: BTreeMap<String, Credential>,
    #[serde(default)]
    pub aliases: BTreeMap<String, Alias>,
}

impl VaultData {
    /// Decode the plaintext document.
    ///
    /// An empty object `{}` decodes as an empty vault.  Map keys are
    /// authoritative: a record whose embedded name disagrees with its
    /// key is renamed to the key.
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        let mut data: VaultData = serde_json::from_slice(bytes)
            .map_err(|e| LockboxError::InvalidVaultFormat(format!("vault document: {e}")))?;

        for (name, cred) in data.credentials.iter_mut() {
            if cred.name != *name {
                cred.name.clone_from(name);
            }
        }
        for (name, alias) in data.aliases.iter_mut() {
            if alias.name != *name {
                alias.name.clone_from(name);
            }
        }

        Ok(data)
    }

    /// Encode the document for encryption.
    pub fn to_json(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self)
            .map_err(|e| LockboxError::SerializationError(format!("vault document: {e}")))
    }

    /// Total number of records across both namespaces.
    pub fn len(&self) -> usize {
        self.credentials.len() + self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.credentials.is_empty() && self.aliases.is_empty()
    }
}

/// Reject names that are empty or only whitespace.
pub fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(LockboxError::EmptyName);
    }
    Ok(())
}

/// Insert `record`, failing with `conflict(name)` if the name is taken.
pub(crate) fn insert_record<T: Record>(
    map: &mut BTreeMap<String, T>,
    record: T,
    conflict: fn(String) -> LockboxError,
) -> Result<()> {
    validate_name(record.name())?;
    if map.contains_key(record.name()) {
        return Err(conflict(record.name().to_string()));
    }
    map.insert(record.name().to_string(), record);
    Ok(())
}

/// Remove the record called `name`, failing with `not_found(name)` if absent.
pub(crate) fn remove_record<T: Record>(
    map: &mut BTreeMap<String, T>,
    name: &str,
    not_found: fn(String) -> LockboxError,
) -> Result<T> {
    map.remove(name).ok_or_else(|| not_found(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_decodes_as_empty_vault() {
        let data = VaultData::from_json(b"{}").unwrap();
        assert!(data.is_empty());
    }

    #[test]
    fn garbage_is_invalid_format() {
        assert!(matches!(
            VaultData::from_json(b"not json"),
            Err(LockboxError::InvalidVaultFormat(_))
        ));
    }

    #[test]
    fn optional_fields_default_to_empty() {
        let json = br#"{"credentials":{"a":{"name":"a","username":"u","password":"p"}}}"#;
        let data = VaultData::from_json(json).unwrap();
        let cred = &data.credentials["a"];
        assert_eq!(cred.notes, "");
        assert!(cred.tags.is_empty());
        assert!(data.aliases.is_empty());
    }

    #[test]
    fn map_key_wins_over_embedded_name() {
        let json = br#"{"aliases":{"deploy":{"name":"old","command":"make deploy"}}}"#;
        let data = VaultData::from_json(json).unwrap();
        assert_eq!(data.aliases["deploy"].name, "deploy");
    }

    #[test]
    fn debug_output_redacts_password() {
        let cred = Credential::new("bank", "alice", "hunter2");
        let shown = format!("{cred:?}");
        assert!(!shown.contains("hunter2"));
        assert!(shown.contains("alice"));
    }

    #[test]
    fn insert_rejects_blank_names() {
        let mut map = BTreeMap::new();
        let result = insert_record(
            &mut map,
            Alias::new("   ", "ls"),
            LockboxError::AliasAlreadyExists,
        );
        assert!(matches!(result, Err(LockboxError::EmptyName)));
    }

    #[test]
    fn namespaces_are_independent() {
        let mut data = VaultData::default();
        insert_record(
            &mut data.credentials,
            Credential::new("github", "me", "pw"),
            LockboxError::CredentialAlreadyExists,
        )
        .unwrap();
        insert_record(
            &mut data.aliases,
            Alias::new("github", "gh auth status"),
            LockboxError::AliasAlreadyExists,
        )
        .unwrap();
        assert_eq!(data.len(), 2);
    }
}
