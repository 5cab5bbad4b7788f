//! Advisory flock(2) guarding appends to the audit log.

use anyhow::{Context, Result};
use fs2::FileExt;
use std::ffi::OsString;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

/// An exclusive file lock. Released on drop (closing the file drops the flock).
pub struct FileLock {
    _file: File,
}

impl FileLock {
    /// Acquire an exclusive lock on `path`, blocking until available.
    pub fn exclusive(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)
            .with_context(|| format!("open lock file {}", path.display()))?;
        file.lock_exclusive()
            .with_context(|| format!("acquire lock {}", path.display()))?;
        Ok(Self { _file: file })
    }

    /// Lock file that sits next to `target` (`<target>.lock`).
    pub fn sibling_path(target: &Path) -> PathBuf {
        let mut name = OsString::from(target.as_os_str());
        name.push(".lock");
        PathBuf::from(name)
    }
}
