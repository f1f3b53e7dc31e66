//! Unlock sessions.
//!
//! A session is a small JSON record saying "the vault was unlocked at
//! time T".  It is written through the secure-file primitive and checked
//! lazily: nothing evicts an expired session, it simply stops counting as
//! active once `now - timestamp` reaches the lifespan.  Reads never
//! refresh the timestamp.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::config::{Settings, VaultPaths};
use crate::errors::{LockboxError, Result};
use crate::storage::{delete_secure_file, read_secure_file, write_secure_file};

/// The persisted session record.
///
/// Serialized as `{"unlocked": true, "timestamp": "<RFC 3339>"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    #[serde(default = "default_unlocked")]
    pub unlocked: bool,
    pub timestamp: DateTime<Utc>,
}

fn default_unlocked() -> bool {
    true
}

impl Session {
    /// Whether this record counts as active at `now` for the given lifespan.
    ///
    /// A timestamp in the future is never active.
    pub fn is_active_at(&self, now: DateTime<Utc>, lifespan: Duration) -> bool {
        let elapsed = now.signed_duration_since(self.timestamp);
        self.unlocked && elapsed >= Duration::zero() && elapsed < lifespan
    }
}

/// Creates, inspects and ends sessions backed by one file.
#[derive(Debug, Clone)]
pub struct SessionManager {
    path: PathBuf,
    lifespan: Duration,
}

impl SessionManager {
    pub fn new(path: impl Into<PathBuf>, lifespan: Duration) -> Self {
        Self {
            path: path.into(),
            lifespan,
        }
    }

    /// Build a manager from loaded settings and resolved paths.
    pub fn from_settings(settings: &Settings, paths: &VaultPaths) -> Self {
        Self::new(paths.session_file.clone(), settings.session_lifespan())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn lifespan(&self) -> Duration {
        self.lifespan
    }

    /// Start (or restart) a session stamped with the current time.
    pub fn create_session(&self) -> Result<Session> {
        let session = Session {
            unlocked: true,
            timestamp: Utc::now(),
        };

        let json = serde_json::to_vec_pretty(&session)
            .map_err(|e| LockboxError::SerializationError(format!("session: {e}")))?;
        write_secure_file(&self.path, &json)?;

        tracing::debug!(path = %self.path.display(), "session started");
        Ok(session)
    }

    /// Remove the session record.  No-op when there is none.
    pub fn end_session(&self) -> Result<()> {
        delete_secure_file(&self.path)?;
        tracing::debug!(path = %self.path.display(), "session ended");
        Ok(())
    }

    /// The stored session, if present and well-formed.
    ///
    /// Unreadable or malformed records are logged and treated as absent.
    pub fn current(&self) -> Option<Session> {
        let bytes = match read_secure_file(&self.path) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "cannot read session file");
                return None;
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(session) => Some(session),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "ignoring malformed session file");
                None
            }
        }
    }

    /// True if a well-formed, unlocked, unexpired session exists now.
    pub fn is_session_active(&self) -> bool {
        self.is_session_active_at(Utc::now())
    }

    /// Same as `is_session_active`, evaluated at `now`.
    pub fn is_session_active_at(&self, now: DateTime<Utc>) -> bool {
        self.current()
            .is_some_and(|session| session.is_active_at(now, self.lifespan))
    }

    /// Fail with `NoActiveSession` unless a session is active.
    pub fn require_active(&self) -> Result<()> {
        if self.is_session_active() {
            Ok(())
        } else {
            Err(LockboxError::NoActiveSession)
        }
    }
}
