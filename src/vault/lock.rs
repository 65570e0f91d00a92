//! Advisory session lock for a vault file.
//!
//! While a `RecordStore` is alive it holds an exclusive OS lock on
//! `.<vault name>.lock` next to the vault file, so a second session on
//! the same vault fails fast instead of racing on save.  The kernel drops
//! the lock when the handle closes, including when the process is killed,
//! so a leftover lock file from a dead session is simply taken over.
//!
//! The lock file itself stays on disk and records the last owner's pid.

use std::fs::{self, File, OpenOptions, TryLockError};
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::errors::{LockboxError, Result};

/// Held for the lifetime of an open session; released on drop.
#[derive(Debug)]
pub struct VaultLock {
    path: PathBuf,
    file: File,
}

impl VaultLock {
    /// Acquire the lock for `vault_path`.
    ///
    /// Fails with `VaultLocked` if a live session already holds it.
    pub fn acquire(vault_path: &Path) -> Result<Self> {
        let path = lock_path(vault_path);

        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)?;

        match file.try_lock() {
            Ok(()) => {}
            Err(TryLockError::WouldBlock) => {
                tracing::debug!(lock = %path.display(), "vault lock already held");
                return Err(LockboxError::VaultLocked(vault_path.to_path_buf()));
            }
            Err(TryLockError::Error(e)) => return Err(e.into()),
        }

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&path, fs::Permissions::from_mode(0o600))?;
        }
        file.set_len(0)?;
        file.seek(SeekFrom::Start(0))?;
        writeln!(file, "{}", std::process::id())?;

        tracing::debug!(lock = %path.display(), "vault lock acquired");
        Ok(Self { path, file })
    }

    /// Path of the lock file on disk.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for VaultLock {
    fn drop(&mut self) {
        if self.file.unlock().is_ok() {
            tracing::debug!(lock = %self.path.display(), "vault lock released");
        }
    }
}

/// Lock file path for a vault: `.<file name>.lock` in the same directory.
pub fn lock_path(vault_path: &Path) -> PathBuf {
    let parent = vault_path.parent().unwrap_or(Path::new("."));
    parent.join(format!(
        ".{}.lock",
        vault_path.file_name().unwrap_or_default().to_string_lossy()
    ))
}
