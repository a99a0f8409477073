//! The index-to-worktree difference engine.
//!
//! `diff_files` compares staged entries against the live filesystem. The
//! cached stat data short-circuits most files; the rest are rehashed, and
//! only a hash mismatch (or a file that cannot be read) produces output.

mod raw;
mod worktree;

pub use raw::format_raw;
pub use worktree::diff_files;

use grit_hash::ObjectId;
use grit_index::IndexPath;
use grit_object::FileMode;

/// Errors from diff operations.
///
/// Per-file I/O failures never surface here: they degrade to "deleted"
/// entries in the output. Only failures to read the index itself abort.
#[derive(Debug, thiserror::Error)]
pub enum DiffError {
    #[error(transparent)]
    Repo(#[from] grit_repo::RepoError),

    #[error(transparent)]
    Index(#[from] grit_index::IndexError),
}

/// One differing file: the index side against the worktree side.
///
/// The worktree side never carries a hash (rehashing is only used to
/// decide whether to report at all); a missing worktree side means the
/// file is gone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashDiff {
    pub path: IndexPath,
    pub index_mode: FileMode,
    pub index_oid: ObjectId,
    /// Mode observed on disk; `None` when the path is deleted (or
    /// unreadable, or replaced by a directory).
    pub worktree_mode: Option<FileMode>,
    pub index_size: u64,
    pub worktree_size: u64,
}

impl HashDiff {
    /// Status letter for raw output: `D` for a vanished worktree side,
    /// `M` otherwise.
    pub fn status(&self) -> char {
        if self.worktree_mode.is_none() {
            'D'
        } else {
            'M'
        }
    }
}
