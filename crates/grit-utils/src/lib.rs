//! Shared plumbing for the grit workspace.
//!
//! Provides the lock-file protocol used for every atomic file replacement,
//! plus git-style dates and `Name <email> epoch ±hhmm` identities.

pub mod date;
pub mod error;
pub mod lockfile;
pub mod path;

pub use error::{LockError, UtilError};

pub type Result<T> = std::result::Result<T, UtilError>;
