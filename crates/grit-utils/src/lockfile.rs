use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::error::{LockError, UtilError};
use crate::Result;

const LOCK_SUFFIX: &str = ".lock";

/// RAII guard for atomic file replacement.
///
/// Acquiring creates `<path>.lock` with O_CREAT|O_EXCL; the new contents are
/// written to the lock file and become visible only when [`commit`] renames
/// it over the target. Dropping an uncommitted guard removes the lock file.
///
/// Ref files, `packed-refs`, and the index are all replaced through this
/// guard so that concurrent readers never observe a partial write.
///
/// [`commit`]: LockFile::commit
pub struct LockFile {
    path: PathBuf,
    lock_path: PathBuf,
    file: Option<File>,
    committed: bool,
}

impl LockFile {
    /// Acquire the lock for `path`, failing if another holder exists.
    pub fn acquire(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let lock_path = PathBuf::from(format!("{}{}", path.display(), LOCK_SUFFIX));

        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&lock_path)
            .map_err(|e| {
                if e.kind() == io::ErrorKind::AlreadyExists {
                    UtilError::Lock(LockError::AlreadyLocked {
                        path: lock_path.clone(),
                    })
                } else {
                    UtilError::Lock(LockError::Create {
                        path: lock_path.clone(),
                        source: e,
                    })
                }
            })?;

        Ok(Self {
            path,
            lock_path,
            file: Some(file),
            committed: false,
        })
    }

    /// The target file path (without the `.lock` suffix).
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flush, fsync, and atomically rename the lock file over the target.
    pub fn commit(mut self) -> Result<()> {
        if let Some(ref mut file) = self.file {
            file.flush().map_err(|e| {
                UtilError::Lock(LockError::Commit {
                    path: self.lock_path.clone(),
                    source: e,
                })
            })?;
            file.sync_all().map_err(|e| {
                UtilError::Lock(LockError::Commit {
                    path: self.lock_path.clone(),
                    source: e,
                })
            })?;
        }
        self.file.take();

        fs::rename(&self.lock_path, &self.path).map_err(|e| {
            UtilError::Lock(LockError::Commit {
                path: self.lock_path.clone(),
                source: e,
            })
        })?;

        self.committed = true;
        Ok(())
    }

    /// Discard the lock without touching the target.
    pub fn rollback(mut self) -> Result<()> {
        self.file.take();
        if self.lock_path.exists() {
            fs::remove_file(&self.lock_path)?;
        }
        self.committed = true;
        Ok(())
    }
}

impl Write for LockFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file
            .as_mut()
            .ok_or_else(|| io::Error::other("lock file already closed"))?
            .write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file
            .as_mut()
            .ok_or_else(|| io::Error::other("lock file already closed"))?
            .flush()
    }
}

impl Drop for LockFile {
    fn drop(&mut self) {
        if !self.committed {
            self.file.take();
            let _ = fs::remove_file(&self.lock_path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commit_replaces_target() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("config");
        fs::write(&target, b"old").unwrap();

        let mut lock = LockFile::acquire(&target).unwrap();
        lock.write_all(b"new").unwrap();
        lock.commit().unwrap();

        assert!(!dir.path().join("config.lock").exists());
        assert_eq!(fs::read(&target).unwrap(), b"new");
    }

    #[test]
    fn rollback_keeps_target() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("config");
        fs::write(&target, b"original").unwrap();

        let mut lock = LockFile::acquire(&target).unwrap();
        lock.write_all(b"discarded").unwrap();
        lock.rollback().unwrap();

        assert_eq!(fs::read(&target).unwrap(), b"original");
        assert!(!dir.path().join("config.lock").exists());
    }

    #[test]
    fn drop_removes_lock() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("config");
        fs::write(&target, b"original").unwrap();

        {
            let mut lock = LockFile::acquire(&target).unwrap();
            lock.write_all(b"never committed").unwrap();
        }

        assert!(!dir.path().join("config.lock").exists());
        assert_eq!(fs::read(&target).unwrap(), b"original");
    }

    #[test]
    fn second_holder_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("config");

        let _held = LockFile::acquire(&target).unwrap();
        match LockFile::acquire(&target) {
            Err(UtilError::Lock(LockError::AlreadyLocked { .. })) => {}
            other => panic!("expected AlreadyLocked, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn creates_missing_target() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("fresh");

        let mut lock = LockFile::acquire(&target).unwrap();
        lock.write_all(b"content").unwrap();
        lock.commit().unwrap();

        assert_eq!(fs::read(&target).unwrap(), b"content");
    }
}
