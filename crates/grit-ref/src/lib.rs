//! The reference store: named pointers into the object graph.
//!
//! Refs are individual files under the git directory: a *direct* ref holds
//! 40 hex characters, a *symbolic* ref holds `ref: <target-name>`. Loose
//! files are the primary storage; a `packed-refs` file is consulted when no
//! loose file exists, and a loose ref always shadows a packed one. All
//! updates go through lock files so concurrent readers never see a torn
//! write.

mod error;
mod loose;
mod name;
pub mod packed;
pub mod reflog;

pub use error::RefError;
pub use name::RefName;
pub use packed::{PackedRef, PackedRefs};
pub use reflog::ReflogEntry;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use grit_hash::ObjectId;

/// Maximum depth when following symbolic ref chains.
pub const MAX_SYMREF_DEPTH: usize = 5;

/// A reference: either direct (points at an object) or symbolic (points at
/// another ref).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reference {
    Direct { name: RefName, target: ObjectId },
    Symbolic { name: RefName, target: RefName },
}

impl Reference {
    /// The ref name.
    pub fn name(&self) -> &RefName {
        match self {
            Reference::Direct { name, .. } => name,
            Reference::Symbolic { name, .. } => name,
        }
    }

    /// Is this a symbolic ref?
    pub fn is_symbolic(&self) -> bool {
        matches!(self, Reference::Symbolic { .. })
    }

    /// The target OID for a direct ref.
    pub fn target_oid(&self) -> Option<ObjectId> {
        match self {
            Reference::Direct { target, .. } => Some(*target),
            Reference::Symbolic { .. } => None,
        }
    }
}

/// Files-backed reference store for one git directory.
pub struct RefStore {
    git_dir: PathBuf,
}

impl RefStore {
    /// Create a ref store over the given git directory.
    pub fn new(git_dir: impl AsRef<Path>) -> Self {
        Self {
            git_dir: git_dir.as_ref().to_path_buf(),
        }
    }

    /// The git directory path.
    pub fn git_dir(&self) -> &Path {
        &self.git_dir
    }

    /// Resolve a name to a `Reference` without following symbolic targets.
    ///
    /// Loose refs win; packed refs fill in when no loose file exists.
    pub fn resolve(&self, name: &RefName) -> Result<Option<Reference>, RefError> {
        match loose::read_loose_ref(&self.git_dir, name)? {
            Some(r) => Ok(Some(r)),
            None => {
                let packed = PackedRefs::load(&self.git_dir)?;
                Ok(packed.find(name).map(|pr| Reference::Direct {
                    name: pr.name.clone(),
                    target: pr.oid,
                }))
            }
        }
    }

    /// Resolve a name to its final OID, following symbolic chains.
    ///
    /// `Ok(None)` means the chain ended at a ref that does not exist; a
    /// dangling symbolic ref is a valid repository state, not an error.
    pub fn resolve_oid(&self, name: &RefName) -> Result<Option<ObjectId>, RefError> {
        self.resolve_oid_inner(name, 0)
    }

    fn resolve_oid_inner(
        &self,
        name: &RefName,
        depth: usize,
    ) -> Result<Option<ObjectId>, RefError> {
        if depth > MAX_SYMREF_DEPTH {
            return Err(RefError::SymrefDepth(name.to_string()));
        }
        match self.resolve(name)? {
            Some(Reference::Direct { target, .. }) => Ok(Some(target)),
            Some(Reference::Symbolic { target, .. }) => {
                self.resolve_oid_inner(&target, depth + 1)
            }
            None => Ok(None),
        }
    }

    /// Read the symbolic target of a ref, without following it.
    pub fn symbolic_target(&self, name: &RefName) -> Result<Option<RefName>, RefError> {
        match loose::read_loose_ref(&self.git_dir, name)? {
            Some(Reference::Symbolic { target, .. }) => Ok(Some(target)),
            _ => Ok(None),
        }
    }

    /// Write a direct ref atomically.
    pub fn write_ref(&self, name: &RefName, oid: &ObjectId) -> Result<(), RefError> {
        loose::write_loose_ref(&self.git_dir, name, oid)
    }

    /// Write a symbolic ref atomically.
    pub fn write_symbolic(&self, name: &RefName, target: &RefName) -> Result<(), RefError> {
        loose::write_symbolic_ref(&self.git_dir, name, target)
    }

    /// Delete a loose ref file.
    pub fn delete_ref(&self, name: &RefName) -> Result<(), RefError> {
        loose::delete_loose_ref(&self.git_dir, name)
    }

    /// Resolve a branch short name (`main`) to its full ref
    /// (`refs/heads/main`), requiring the branch to exist.
    pub fn find_branch(&self, branch_name: &str) -> Result<RefName, RefError> {
        let name = RefName::new(format!("refs/heads/{branch_name}"))
            .map_err(|_| RefError::InvalidBranch(branch_name.to_string()))?;
        if !self.exists(&name)? {
            return Err(RefError::InvalidBranch(branch_name.to_string()));
        }
        Ok(name)
    }

    /// Does a ref exist as a loose file or a packed entry?
    pub fn exists(&self, name: &RefName) -> Result<bool, RefError> {
        if loose::loose_ref_path(&self.git_dir, name).is_file() {
            return Ok(true);
        }
        Ok(PackedRefs::load(&self.git_dir)?.find(name).is_some())
    }

    /// Enumerate refs under an optional prefix, sorted by name.
    ///
    /// Packed entries are merged after loose ones; a loose ref shadows a
    /// packed ref of the same name.
    pub fn iter(&self, prefix: Option<&str>) -> Result<Vec<Reference>, RefError> {
        let loose_refs = loose::enumerate_loose_refs(&self.git_dir, prefix)?;
        let mut seen: HashSet<String> = HashSet::new();
        let mut all_refs: Vec<Reference> = Vec::new();

        for (name, _path) in &loose_refs {
            seen.insert(name.as_str().to_string());
            // A file may vanish between enumerate and read.
            if let Some(r) = loose::read_loose_ref(&self.git_dir, name)? {
                all_refs.push(r);
            }
        }

        let packed = PackedRefs::load(&self.git_dir)?;
        for pr in packed.refs() {
            if seen.contains(pr.name.as_str()) {
                continue;
            }
            if let Some(p) = prefix {
                if !pr.name.as_str().starts_with(p) {
                    continue;
                }
            }
            all_refs.push(Reference::Direct {
                name: pr.name.clone(),
                target: pr.oid,
            });
        }

        all_refs.sort_by(|a, b| a.name().cmp(b.name()));
        Ok(all_refs)
    }

    /// Read the reflog for a ref, newest first.
    pub fn reflog(&self, name: &RefName) -> Result<Vec<ReflogEntry>, RefError> {
        reflog::read_reflog(&self.git_dir, name)
    }

    /// Append a reflog entry for a ref.
    pub fn append_reflog(&self, name: &RefName, entry: &ReflogEntry) -> Result<(), RefError> {
        reflog::append_reflog_entry(&self.git_dir, name, entry)
    }
}
