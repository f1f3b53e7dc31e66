//! Permission-bracketed file access.
//!
//! The vault envelope, the cached key, and the session record all rest
//! on disk as owner-read-only (`0400`).  Every access widens the file to
//! owner-read-write (`0600`) for exactly as long as it needs, then narrows
//! it back.  Writes go through a uniquely named `0600` temp file in the
//! same directory that is narrowed to `0400` before being renamed over the
//! target, so a reader never sees a half-written or group/world-readable
//! file and nobody can squat the temp name in a shared directory.
//!
//! On non-Unix targets the permission steps are no-ops.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::Path;

use tempfile::NamedTempFile;

use crate::errors::Result;

/// Mode while a file is being read or written.
pub const OWNER_READ_WRITE: u32 = 0o600;

/// Mode of every secure file at rest.
pub const OWNER_READ_ONLY: u32 = 0o400;

/// Mode of directories created to hold secure files.
const OWNER_DIR: u32 = 0o700;

/// Read a secure file.
///
/// Returns `Ok(None)` when the file does not exist.  Any other
/// filesystem failure is returned as an error.
pub fn read_secure_file(path: &Path) -> Result<Option<Vec<u8>>> {
    match set_mode(path, OWNER_READ_WRITE) {
        Ok(()) => {}
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    }

    let data = fs::read(path);

    // Restore the rest state before looking at the read result.
    set_mode(path, OWNER_READ_ONLY)?;

    match data {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Write `data` to a secure file, replacing any previous content.
///
/// Creates the parent directory (owner-only) if it is missing.
pub fn write_secure_file(path: &Path, data: &[u8]) -> Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    ensure_dir(parent)?;

    // Created 0600 under a random name; removed on drop if we bail out.
    let mut tmp = NamedTempFile::new_in(parent)?;
    tmp.write_all(data)?;
    tmp.as_file().sync_all()?;
    narrow_open_file(tmp.as_file())?;

    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Delete a secure file.  Deleting a missing file is a no-op.
pub fn delete_secure_file(path: &Path) -> Result<()> {
    match set_mode(path, OWNER_READ_WRITE) {
        Ok(()) => {}
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e.into()),
    }

    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// Create `dir` (and its parents) with owner-only permissions if missing.
pub fn ensure_dir(dir: &Path) -> std::io::Result<()> {
    if dir.as_os_str().is_empty() || dir.exists() {
        return Ok(());
    }

    fs::create_dir_all(dir)?;
    set_mode(dir, OWNER_DIR)
}

#[cfg(unix)]
fn narrow_open_file(file: &fs::File) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    file.set_permissions(fs::Permissions::from_mode(OWNER_READ_ONLY))
}

#[cfg(not(unix))]
fn narrow_open_file(_file: &fs::File) -> std::io::Result<()> {
    Ok(())
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode))
}

#[cfg(not(unix))]
fn set_mode(path: &Path, _mode: u32) -> std::io::Result<()> {
    // Surface NotFound the same way the Unix path does.
    fs::metadata(path).map(|_| ())
}
