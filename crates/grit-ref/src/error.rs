use std::path::PathBuf;

/// Error types for reference operations.
#[derive(Debug, thiserror::Error)]
pub enum RefError {
    #[error("invalid ref name: {0}")]
    InvalidName(String),

    #[error("ref not found: {0}")]
    NotFound(String),

    #[error("not a valid branch: {0}")]
    InvalidBranch(String),

    #[error("symbolic ref chain too deep: {0}")]
    SymrefDepth(String),

    #[error("lock file error: {0}")]
    Lock(#[from] grit_utils::LockError),

    #[error("{0}")]
    Util(#[from] grit_utils::UtilError),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("directory-file conflict: cannot create ref '{name}' because '{conflict}' exists")]
    DirectoryConflict { name: String, conflict: String },

    #[error("I/O error on {path}: {source}")]
    IoPath {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Hash(#[from] grit_hash::HashError),
}
