//! Filesystem helpers for the on-disk stores.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

/// Directory a file lives in, treating a bare filename as the current directory.
pub(crate) fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Replace `path` with `contents` so readers see either the old file or the new one.
///
/// The data goes to a temporary file in the same directory, is synced, and is
/// renamed over the destination. On failure the temporary file is removed and
/// `path` is untouched.
pub async fn write_atomic<C>(path: &Path, contents: C) -> io::Result<()>
where
    C: AsRef<[u8]> + Send + 'static,
{
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || {
        let mut file = NamedTempFile::new_in(parent_dir(&path))?;
        file.write_all(contents.as_ref())?;
        file.as_file().sync_all()?;
        file.persist(&path).map_err(|e| e.error)?;
        Ok(())
    })
    .await
    .map_err(io::Error::other)?
}
