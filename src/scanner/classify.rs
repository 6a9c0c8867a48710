//! Path classification: thin wrappers over `lstat`/`stat`.
//!
//! # Platform Support
//!
//! - **Unix**: identity is `(st_dev, st_ino)`, change time is `st_ctime`
//! - **Other**: identity is derived from the path itself, so every path is
//!   its own object and hardlink aliasing is never detected

use std::fs::{self, File, Metadata};
use std::io;
use std::path::Path;
use std::time::SystemTime;

use super::{FileIdentity, FileKind, FileRecord};

/// Take a stat snapshot of `path`.
///
/// With `follow == false` this is `lstat` (a symlink is reported as
/// [`FileKind::Symlink`]); with `follow == true` the link is dereferenced.
///
/// # Errors
///
/// Propagates the I/O error of the underlying stat call.
pub fn classify(path: &Path, follow: bool) -> io::Result<FileRecord> {
    let metadata = if follow {
        fs::metadata(path)
    } else {
        fs::symlink_metadata(path)
    }?;
    Ok(record_from_metadata(path, &metadata))
}

/// Check that a regular file can be opened for reading.
///
/// Directories are checked by listing them, which the indexer does anyway.
///
/// # Errors
///
/// Returns the error from opening the file.
pub fn check_readable(path: &Path) -> io::Result<()> {
    File::open(path).map(drop)
}

/// Build a [`FileRecord`] from already-fetched metadata.
#[must_use]
pub fn record_from_metadata(path: &Path, metadata: &Metadata) -> FileRecord {
    let file_type = metadata.file_type();
    let kind = if file_type.is_symlink() {
        FileKind::Symlink
    } else if file_type.is_dir() {
        FileKind::Directory
    } else if file_type.is_file() {
        FileKind::RegularFile
    } else {
        FileKind::Special
    };

    let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
    let accessed = metadata.accessed().unwrap_or(modified);

    FileRecord {
        path: path.to_path_buf(),
        identity: identity_of(path, metadata),
        kind,
        size: metadata.len(),
        accessed,
        modified,
        changed: change_time(metadata).unwrap_or(modified),
    }
}

#[cfg(unix)]
fn identity_of(_path: &Path, metadata: &Metadata) -> FileIdentity {
    use std::os::unix::fs::MetadataExt;
    FileIdentity::new(metadata.dev(), metadata.ino())
}

#[cfg(not(unix))]
fn identity_of(path: &Path, _metadata: &Metadata) -> FileIdentity {
    use std::hash::{DefaultHasher, Hash, Hasher};
    let mut hasher = DefaultHasher::new();
    path.hash(&mut hasher);
    FileIdentity::new(0, hasher.finish())
}

#[cfg(unix)]
fn change_time(metadata: &Metadata) -> Option<SystemTime> {
    use std::os::unix::fs::MetadataExt;
    use std::time::Duration;

    let nanos = Duration::from_nanos(u64::try_from(metadata.ctime_nsec()).unwrap_or(0));
    let secs = metadata.ctime();
    let base = if secs >= 0 {
        SystemTime::UNIX_EPOCH.checked_add(Duration::from_secs(secs.unsigned_abs()))
    } else {
        SystemTime::UNIX_EPOCH.checked_sub(Duration::from_secs(secs.unsigned_abs()))
    }?;
    base.checked_add(nanos)
}

#[cfg(not(unix))]
fn change_time(metadata: &Metadata) -> Option<SystemTime> {
    metadata.created().ok()
}
