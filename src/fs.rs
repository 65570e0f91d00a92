//! Filesystem utilities for atomic writes.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Path of the sibling temp file used while writing `path`.
///
/// The temp file lives in the same directory so the final rename stays
/// on one filesystem.
pub fn temp_path(path: &Path) -> PathBuf {
    let parent = path.parent().unwrap_or(Path::new("."));
    parent.join(format!(
        ".{}.tmp",
        path.file_name().unwrap_or_default().to_string_lossy()
    ))
}

/// Directory containing `path`, or `.` for a bare file name.
pub fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Write `data` to `path` so readers only ever see the old or the new
/// contents, never a mix.
///
/// 1. Write the bytes to a temp file next to `path` (truncating any
///    leftover from an interrupted write).
/// 2. Flush them to disk with `sync_all`.
/// 3. Rename the temp file over `path` and sync the directory.
///
/// On failure `path` is left as it was.
pub fn write_atomic(path: &Path, data: &[u8]) -> io::Result<()> {
    let tmp_path = temp_path(path);

    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&tmp_path)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&tmp_path, fs::Permissions::from_mode(0o600))?;
    }

    file.write_all(data)?;
    file.sync_all()?;
    drop(file);

    replace_file(&tmp_path, path)
}

/// Move `temp_path` over `destination` in one rename.
///
/// `rename` replaces an existing target on every supported platform, so
/// `destination` is never removed first.  If the rename fails both files
/// are left in place and the error is returned.
pub fn replace_file(temp_path: &Path, destination: &Path) -> io::Result<()> {
    fs::rename(temp_path, destination).map_err(|e| {
        io::Error::new(
            e.kind(),
            format!(
                "could not replace {} with {}: {e}",
                destination.display(),
                temp_path.display()
            ),
        )
    })?;
    sync_dir(&parent_dir(destination))
}

/// Flush a directory entry change (the rename) to disk.
#[cfg(unix)]
fn sync_dir(dir: &Path) -> io::Result<()> {
    fs::File::open(dir)?.sync_all()
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> io::Result<()> {
    Ok(())
}
