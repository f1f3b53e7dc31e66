//! Advisory single-writer lock around vault file sequences.
//!
//! Two `lockbox` processes touching the same vault serialize on an
//! exclusive `flock` over `<vault_file>.lock`.  The lock is released when
//! the guard is dropped (or the process exits).  Non-Unix targets only
//! hold the file open, which gives no exclusion.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use crate::errors::Result;

use super::secure_file::{ensure_dir, OWNER_READ_WRITE};

/// RAII guard for an exclusive advisory lock.
#[derive(Debug)]
pub struct FileLock {
    file: File,
    path: PathBuf,
}

impl FileLock {
    /// Block until the exclusive lock on `path` is held.
    ///
    /// The lock file is created (owner read-write) if it does not exist.
    pub fn acquire(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            ensure_dir(parent)?;
        }

        let mut options = OpenOptions::new();
        options.read(true).write(true).create(true).truncate(false);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(OWNER_READ_WRITE);
        }
        #[cfg(not(unix))]
        let _ = OWNER_READ_WRITE;

        let file = options.open(path)?;
        lock_exclusive(&file)?;

        tracing::trace!(path = %path.display(), "acquired vault lock");
        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }

    /// Path of the lock file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        unlock(&self.file);
        tracing::trace!(path = %self.path.display(), "released vault lock");
    }
}

#[cfg(unix)]
fn lock_exclusive(file: &File) -> std::io::Result<()> {
    use std::os::unix::io::AsRawFd;

    loop {
        // SAFETY: the descriptor is owned by `file` and valid for the call.
        let rc = unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_EX) };
        if rc == 0 {
            return Ok(());
        }
        let err = std::io::Error::last_os_error();
        if err.kind() != std::io::ErrorKind::Interrupted {
            return Err(err);
        }
    }
}

#[cfg(unix)]
fn unlock(file: &File) {
    use std::os::unix::io::AsRawFd;

    // SAFETY: see `lock_exclusive`.  Closing the file would release it anyway.
    unsafe {
        libc::flock(file.as_raw_fd(), libc::LOCK_UN);
    }
}

#[cfg(not(unix))]
fn lock_exclusive(_file: &File) -> std::io::Result<()> {
    Ok(())
}

#[cfg(not(unix))]
fn unlock(_file: &File) {}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn acquire_creates_lock_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("vault.enc.lock");

        let guard = FileLock::acquire(&path).unwrap();
        assert!(path.exists());
        assert_eq!(guard.path(), path);
    }

    #[test]
    fn lock_can_be_reacquired_after_drop() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("vault.enc.lock");

        drop(FileLock::acquire(&path).unwrap());
        drop(FileLock::acquire(&path).unwrap());
    }

    #[cfg(unix)]
    #[test]
    fn second_holder_waits_for_first() {
        use std::sync::mpsc;
        use std::time::Duration;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("vault.enc.lock");

        let first = FileLock::acquire(&path).unwrap();

        let (tx, rx) = mpsc::channel();
        let contender_path = path.clone();
        let handle = std::thread::spawn(move || {
            let _second = FileLock::acquire(&contender_path).unwrap();
            tx.send(()).unwrap();
        });

        // The contender must still be blocked while `first` is held.
        assert!(rx.recv_timeout(Duration::from_millis(200)).is_err());

        drop(first);
        rx.recv_timeout(Duration::from_secs(5)).unwrap();
        handle.join().unwrap();
    }
}
