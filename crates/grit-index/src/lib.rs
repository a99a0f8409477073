//! The staging area: a flat, sorted sequence of `(path, entry)` records.
//!
//! The index feeds two consumers: the tree writer, which folds it into
//! nested tree objects with canonical hashes, and the working-tree differ,
//! which compares it against live files. On disk it is the binary index v2
//! format, rewritten wholesale (through a lock file) on every mutation.

pub mod entry;
pub mod ls_files;
mod path;
mod read;
mod tree;
mod write;

use std::path::Path;

use bstr::BStr;

pub use entry::{IndexEntry, StatData};
pub use ls_files::{ls_files, LsFile, LsFilesOptions};
pub use path::IndexPath;
pub use tree::write_tree;

/// Errors from index operations.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    #[error("invalid index header: {0}")]
    InvalidHeader(String),

    #[error("unsupported index version: {0}")]
    UnsupportedVersion(u32),

    #[error("index checksum mismatch")]
    ChecksumMismatch,

    #[error("invalid index entry at offset {offset}: {reason}")]
    InvalidEntry { offset: usize, reason: String },

    #[error("invalid index path: {0}")]
    InvalidPath(String),

    #[error("unable to lock index at {path}")]
    LockFailed { path: std::path::PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Odb(#[from] grit_odb::OdbError),

    #[error(transparent)]
    Hash(#[from] grit_hash::HashError),
}

/// The in-memory index.
#[derive(Debug, Default)]
pub struct Index {
    /// Entries sorted by path; no two entries share a path.
    entries: Vec<IndexEntry>,
}

impl Index {
    /// An empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the index from a file. A missing file is an empty index.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, IndexError> {
        let file = match std::fs::File::open(path.as_ref()) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::new()),
            Err(e) => return Err(IndexError::Io(e)),
        };
        let data = unsafe { memmap2::Mmap::map(&file)? };
        read::parse_index(&data)
    }

    /// Write the index to a file atomically.
    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<(), IndexError> {
        write::write_index(self, path.as_ref())
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Is the index empty?
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up an entry by path.
    pub fn entry(&self, path: &BStr) -> Option<&IndexEntry> {
        self.entries
            .binary_search_by(|e| e.path.as_bstr().cmp(path))
            .ok()
            .map(|idx| &self.entries[idx])
    }

    /// Add or replace an entry, keeping the sequence sorted and unique.
    pub fn add(&mut self, entry: IndexEntry) {
        match self
            .entries
            .binary_search_by(|e| e.path.cmp(&entry.path))
        {
            Ok(idx) => self.entries[idx] = entry,
            Err(idx) => self.entries.insert(idx, entry),
        }
    }

    /// Remove an entry by path. Returns true if one was removed.
    pub fn remove(&mut self, path: &BStr) -> bool {
        match self
            .entries
            .binary_search_by(|e| e.path.as_bstr().cmp(path))
        {
            Ok(idx) => {
                self.entries.remove(idx);
                true
            }
            Err(_) => false,
        }
    }

    /// Iterate entries in path order.
    pub fn iter(&self) -> impl Iterator<Item = &IndexEntry> {
        self.entries.iter()
    }

    pub(crate) fn from_sorted_entries(entries: Vec<IndexEntry>) -> Self {
        Self { entries }
    }
}
