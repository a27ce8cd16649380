//! Durable writes of an encoded termination message.
use super::WriteMode;
use crate::errors::{AppendError, AppendResult};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

const TEMP_PREFIX: &str = ".termination-";

/// Replace the content of `path` with exactly `bytes`, synced to storage.
pub(super) fn write_message(path: &Path, bytes: &[u8], mode: WriteMode) -> AppendResult<()> {
    let result = match mode {
        WriteMode::Atomic => replace_atomically(path, bytes),
        WriteMode::Truncate => overwrite_in_place(path, bytes),
    };
    result.map_err(|source| AppendError::Write {
        path: path.to_path_buf(),
        source,
    })
}

fn overwrite_in_place(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}

fn replace_atomically(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let target = match resolve_symlink(path)? {
        Some(target) => target,
        // Dangling link: opening through it creates the target.
        None => return overwrite_in_place(path, bytes),
    };
    replace_with(&target, bytes, |tmp, target| {
        tmp.persist(target).map(|_| ()).map_err(|err| err.error)
    })
}

/// Atomic replace with a pluggable rename step.
///
/// A target that cannot be renamed over (a bind-mounted file) is rewritten in
/// place instead.
fn replace_with<R>(path: &Path, bytes: &[u8], rename: R) -> io::Result<()>
where
    R: FnOnce(NamedTempFile, &Path) -> io::Result<()>,
{
    let dir = parent_dir(path);
    let existing = match fs::metadata(path) {
        Ok(meta) => Some(meta.permissions()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => None,
        Err(err) => return Err(err),
    };

    // Dropping `tmp` on any early return removes the temporary file.
    let mut tmp = tempfile::Builder::new()
        .prefix(TEMP_PREFIX)
        .suffix(".tmp")
        .tempfile_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    if let Some(permissions) = existing.or_else(default_permissions) {
        fs::set_permissions(tmp.path(), permissions)?;
    }
    match rename(tmp, path) {
        Ok(()) => sync_dir(dir),
        Err(err) if is_mount_point(&err) => {
            tracing::debug!(
                path = %path.display(),
                error = %err,
                "cannot rename over target, rewriting in place"
            );
            overwrite_in_place(path, bytes)
        }
        Err(err) => Err(err),
    }
}

/// Follow a symlink at `path` to the file it names.
///
/// Returns `path` itself when it is not a link and `None` when the link dangles.
fn resolve_symlink(path: &Path) -> io::Result<Option<PathBuf>> {
    match fs::symlink_metadata(path) {
        Ok(meta) if meta.file_type().is_symlink() => match fs::canonicalize(path) {
            Ok(target) => Ok(Some(target)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        },
        Ok(_) => Ok(Some(path.to_path_buf())),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(Some(path.to_path_buf())),
        Err(err) => Err(err),
    }
}

#[cfg(unix)]
fn is_mount_point(err: &io::Error) -> bool {
    matches!(err.raw_os_error(), Some(libc::EBUSY) | Some(libc::EXDEV))
}

#[cfg(not(unix))]
fn is_mount_point(_err: &io::Error) -> bool {
    false
}

fn parent_dir(path: &Path) -> &Path {
    path.parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
}

#[cfg(unix)]
fn default_permissions() -> Option<fs::Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Some(fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn default_permissions() -> Option<fs::Permissions> {
    None
}

#[cfg(unix)]
fn sync_dir(dir: &Path) -> io::Result<()> {
    fs::File::open(dir)?.sync_all()
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> io::Result<()> {
    Ok(())
}
