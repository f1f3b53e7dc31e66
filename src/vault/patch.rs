//! Partial updates for stored records.
//!
//! A patch names its target and carries one `Option` per mutable field.
//! `None` means "leave as is"; `Some(String::new())` or `Some(vec![])`
//! explicitly clears the field.  Renames go through `new_name` and are
//! applied before the other fields.

use std::collections::BTreeMap;

use super::model::{validate_name, Alias, Credential, Record};
use crate::errors::{LockboxError, Result};

/// A change set that can be merged into a record of type `Target`.
pub trait Patch {
    type Target: Record;

    /// Current name of the record to change.
    fn target(&self) -> &str;

    /// Requested new name, if any.
    fn new_name(&self) -> Option<&str>;

    /// Build the updated record.  Never touches the name.
    fn merge(&self, current: &Self::Target) -> Self::Target;
}

/// Changes to a `Credential`.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct CredentialPatch {
    pub name: String,
    pub new_name: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub notes: Option<String>,
    pub tags: Option<Vec<String>>,
}

impl CredentialPatch {
    /// An empty patch targeting `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn rename(mut self, new_name: impl Into<String>) -> Self {
        self.new_name = Some(new_name.into());
        self
    }

    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = Some(tags.into_iter().map(Into::into).collect());
        self
    }

    /// True when the patch would change nothing.
    pub fn is_empty(&self) -> bool {
        self.new_name.is_none()
            && self.username.is_none()
            && self.password.is_none()
            && self.notes.is_none()
            && self.tags.is_none()
    }
}

impl std::fmt::Debug for CredentialPatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialPatch")
            .field("name", &self.name)
            .field("new_name", &self.new_name)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("notes", &self.notes)
            .field("tags", &self.tags)
            .finish()
    }
}

impl Patch for CredentialPatch {
    type Target = Credential;

    fn target(&self) -> &str {
        &self.name
    }

    fn new_name(&self) -> Option<&str> {
        self.new_name.as_deref()
    }

    fn merge(&self, current: &Credential) -> Credential {
        Credential {
            name: current.name.clone(),
            username: self
                .username
                .clone()
                .unwrap_or_else(|| current.username.clone()),
            password: self
                .password
                .clone()
                .unwrap_or_else(|| current.password.clone()),
            notes: self.notes.clone().unwrap_or_else(|| current.notes.clone()),
            tags: self.tags.clone().unwrap_or_else(|| current.tags.clone()),
        }
    }
}

/// Changes to an `Alias`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasPatch {
    pub name: String,
    pub new_name: Option<String>,
    pub command: Option<String>,
    pub notes: Option<String>,
    pub tags: Option<Vec<String>>,
}

impl AliasPatch {
    /// An empty patch targeting `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn rename(mut self, new_name: impl Into<String>) -> Self {
        self.new_name = Some(new_name.into());
        self
    }

    pub fn command(mut self, command: impl Into<String>) -> Self {
        self.command = Some(command.into());
        self
    }

    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = Some(tags.into_iter().map(Into::into).collect());
        self
    }

    /// True when the patch would change nothing.
    pub fn is_empty(&self) -> bool {
        self.new_name.is_none()
            && self.command.is_none()
            && self.notes.is_none()
            && self.tags.is_none()
    }
}

impl Patch for AliasPatch {
    type Target = Alias;

    fn target(&self) -> &str {
        &self.name
    }

    fn new_name(&self) -> Option<&str> {
        self.new_name.as_deref()
    }

    fn merge(&self, current: &Alias) -> Alias {
        Alias {
            name: current.name.clone(),
            command: self
                .command
                .clone()
                .unwrap_or_else(|| current.command.clone()),
            notes: self.notes.clone().unwrap_or_else(|| current.notes.clone()),
            tags: self.tags.clone().unwrap_or_else(|| current.tags.clone()),
        }
    }
}

/// Apply `patch` to its target inside `map`.
///
/// Either the whole change lands (rename and fields together) or the map
/// is left untouched.
pub(crate) fn apply_patch<P: Patch>(
    map: &mut BTreeMap<String, P::Target>,
    patch: &P,
    not_found: fn(String) -> LockboxError,
    conflict: fn(String) -> LockboxError,
) -> Result<()> {
    let current = map
        .get(patch.target())
        .ok_or_else(|| not_found(patch.target().to_string()))?;

    let mut updated = patch.merge(current);

    match patch.new_name() {
        Some(new_name) if new_name != patch.target() => {
            validate_name(new_name)?;
            if map.contains_key(new_name) {
                return Err(conflict(new_name.to_string()));
            }
            updated.set_name(new_name.to_string());
            map.remove(patch.target());
            map.insert(new_name.to_string(), updated);
        }
        _ => {
            map.insert(patch.target().to_string(), updated);
        }
    }

    Ok(())
}
