//! Index entries and cached stat metadata.

use grit_hash::ObjectId;
use grit_object::FileMode;

use crate::path::IndexPath;

/// A single staged file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    /// Path relative to the worktree root.
    pub path: IndexPath,
    /// Blob OID of the staged content.
    pub oid: ObjectId,
    /// File mode.
    pub mode: FileMode,
    /// Stat data captured when the entry was staged.
    pub stat: StatData,
}

/// Filesystem stat data cached in the index.
///
/// Enough to decide "unchanged" without rereading the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatData {
    pub ctime_secs: u32,
    pub ctime_nsecs: u32,
    pub mtime_secs: u32,
    pub mtime_nsecs: u32,
    pub dev: u32,
    pub ino: u32,
    pub uid: u32,
    pub gid: u32,
    pub size: u32,
}

impl StatData {
    /// Capture from filesystem metadata.
    #[cfg(unix)]
    pub fn from_metadata(meta: &std::fs::Metadata) -> Self {
        use std::os::unix::fs::MetadataExt;
        Self {
            ctime_secs: meta.ctime() as u32,
            ctime_nsecs: meta.ctime_nsec() as u32,
            mtime_secs: meta.mtime() as u32,
            mtime_nsecs: meta.mtime_nsec() as u32,
            dev: meta.dev() as u32,
            ino: meta.ino() as u32,
            uid: meta.uid(),
            gid: meta.gid(),
            size: meta.len() as u32,
        }
    }

    /// Capture from filesystem metadata (non-Unix fallback).
    #[cfg(not(unix))]
    pub fn from_metadata(meta: &std::fs::Metadata) -> Self {
        use std::time::UNIX_EPOCH;
        let mtime = meta
            .modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .unwrap_or_default();
        Self {
            ctime_secs: mtime.as_secs() as u32,
            ctime_nsecs: mtime.subsec_nanos(),
            mtime_secs: mtime.as_secs() as u32,
            mtime_nsecs: mtime.subsec_nanos(),
            dev: 0,
            ino: 0,
            uid: 0,
            gid: 0,
            size: meta.len() as u32,
        }
    }

    /// Does the cached stat still describe this file?
    ///
    /// A false result only means "cannot short-circuit": the caller falls
    /// back to rehashing. Zero-valued fields on either side are treated as
    /// unknown and skipped, since not every filesystem reports them.
    pub fn matches(&self, meta: &std::fs::Metadata) -> bool {
        let other = Self::from_metadata(meta);

        if self.size != other.size {
            return false;
        }
        if self.mtime_secs != other.mtime_secs || self.mtime_nsecs != other.mtime_nsecs {
            return false;
        }
        if self.ctime_secs != other.ctime_secs || self.ctime_nsecs != other.ctime_nsecs {
            return false;
        }
        if self.ino != 0 && other.ino != 0 && self.ino != other.ino {
            return false;
        }
        if self.dev != 0 && other.dev != 0 && self.dev != other.dev {
            return false;
        }
        if self.uid != 0 && other.uid != 0 && self.uid != other.uid {
            return false;
        }
        if self.gid != 0 && other.gid != 0 && self.gid != other.gid {
            return false;
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_all_zero() {
        let stat = StatData::default();
        assert_eq!(stat.size, 0);
        assert_eq!(stat.mtime_secs, 0);
        assert_eq!(stat.ino, 0);
    }

    #[test]
    fn fresh_stat_matches_itself() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("f");
        std::fs::write(&file, b"content").unwrap();
        let meta = std::fs::metadata(&file).unwrap();

        let stat = StatData::from_metadata(&meta);
        assert!(stat.matches(&meta));
    }

    #[test]
    fn size_change_breaks_match() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("f");
        std::fs::write(&file, b"content").unwrap();
        let stat = StatData::from_metadata(&std::fs::metadata(&file).unwrap());

        std::fs::write(&file, b"longer content").unwrap();
        let meta = std::fs::metadata(&file).unwrap();
        assert!(!stat.matches(&meta));
    }
}
