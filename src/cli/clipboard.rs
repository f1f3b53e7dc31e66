//! System clipboard access via `arboard`.

use crate::errors::{LockboxError, Result};

/// Put `text` on the system clipboard.
pub fn copy(text: &str) -> Result<()> {
    let mut clipboard =
        arboard::Clipboard::new().map_err(|e| LockboxError::ClipboardError(e.to_string()))?;
    clipboard
        .set_text(text.to_owned())
        .map_err(|e| LockboxError::ClipboardError(e.to_string()))
}

/// Copy `text` and report the outcome; a missing clipboard is only a warning.
///
/// Returns whether the copy succeeded.
pub fn copy_or_warn(text: &str, what: &str) -> bool {
    match copy(text) {
        Ok(()) => {
            super::output::success(&format!("{what} copied to clipboard."));
            true
        }
        Err(e) => {
            tracing::debug!(error = %e, "clipboard unavailable");
            super::output::warning(&format!("Could not copy {what} to clipboard: {e}"));
            false
        }
    }
}
