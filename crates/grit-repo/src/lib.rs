//! Repository discovery and the operations that tie the subsystems
//! together: HEAD resolution, ref display, ref updates with reflogs, and
//! the commit builder.

mod commit;
mod init;
mod show_refs;

pub use commit::signature_from_env;
pub use show_refs::{ShowRefOptions, ShownRef};

use std::path::{Path, PathBuf};

use grit_hash::ObjectId;
use grit_index::Index;
use grit_object::CommitId;
use grit_odb::{ObjectStore, OdbError};
use grit_ref::{RefError, RefName, RefStore, ReflogEntry, MAX_SYMREF_DEPTH};
use grit_utils::date::Signature;

/// Errors from repository-level operations.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error("not a git repository: {0}")]
    NotARepository(PathBuf),

    #[error("this operation must be run in a work tree")]
    BareNoWorkTree,

    #[error("ref '{name}' points at a {actual}, not a commit")]
    NotACommit { name: String, actual: String },

    #[error("fatal: '{0}' - not a valid ref")]
    VerifyFailed(String),

    #[error("empty commit message")]
    EmptyMessage,

    #[error(transparent)]
    Ref(#[from] RefError),

    #[error(transparent)]
    Odb(#[from] OdbError),

    #[error(transparent)]
    Index(#[from] grit_index::IndexError),

    #[error(transparent)]
    Object(#[from] grit_object::ObjectError),

    #[error(transparent)]
    Hash(#[from] grit_hash::HashError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// An open repository.
pub struct Repository {
    git_dir: PathBuf,
    work_tree: Option<PathBuf>,
    odb: ObjectStore,
    refs: RefStore,
    index_path: PathBuf,
}

impl Repository {
    /// Open an existing repository.
    ///
    /// `path` may be the git directory itself or a worktree root holding a
    /// `.git` directory.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, RepoError> {
        let path = path.as_ref();
        if path.join("HEAD").is_file() && path.join("objects").is_dir() {
            Ok(Self::from_git_dir(path.to_path_buf(), None))
        } else if path.join(".git").is_dir() {
            Ok(Self::from_git_dir(
                path.join(".git"),
                Some(path.to_path_buf()),
            ))
        } else {
            Err(RepoError::NotARepository(path.to_path_buf()))
        }
    }

    /// Discover a repository by walking up from `start`.
    pub fn discover(start: impl AsRef<Path>) -> Result<Self, RepoError> {
        let start = start.as_ref();
        let origin = if start.is_absolute() {
            grit_utils::path::normalize(start)
        } else {
            grit_utils::path::normalize(&std::env::current_dir()?.join(start))
        };
        let mut dir: &Path = &origin;
        loop {
            if dir.join(".git").is_dir() {
                return Self::open(dir);
            }
            match dir.parent() {
                Some(parent) => dir = parent,
                None => return Err(RepoError::NotARepository(origin)),
            }
        }
    }

    /// Create a new repository at `path` and open it.
    pub fn init(path: impl AsRef<Path>) -> Result<Self, RepoError> {
        init::init_repository(path.as_ref())?;
        Self::open(path.as_ref())
    }

    fn from_git_dir(git_dir: PathBuf, work_tree: Option<PathBuf>) -> Self {
        let odb = ObjectStore::open(git_dir.join("objects"));
        let refs = RefStore::new(&git_dir);
        let index_path = git_dir.join("index");
        Self {
            git_dir,
            work_tree,
            odb,
            refs,
            index_path,
        }
    }

    /// The git directory.
    pub fn git_dir(&self) -> &Path {
        &self.git_dir
    }

    /// The worktree root, if this repository has one.
    pub fn work_tree(&self) -> Option<&Path> {
        self.work_tree.as_deref()
    }

    /// The worktree root, or an error for bare repositories.
    pub fn require_work_tree(&self) -> Result<&Path, RepoError> {
        self.work_tree.as_deref().ok_or(RepoError::BareNoWorkTree)
    }

    /// The object store.
    pub fn odb(&self) -> &ObjectStore {
        &self.odb
    }

    /// The reference store.
    pub fn refs(&self) -> &RefStore {
        &self.refs
    }

    /// Load the index. A missing index file is an empty index.
    pub fn index(&self) -> Result<Index, RepoError> {
        Ok(Index::load(&self.index_path)?)
    }

    /// Replace the on-disk index.
    pub fn write_index(&self, index: &Index) -> Result<(), RepoError> {
        Ok(index.write_to(&self.index_path)?)
    }

    /// Resolve HEAD to the commit it names.
    ///
    /// `Ok(None)` means "no commit yet": HEAD is a symbolic ref to an
    /// unborn branch, which is the normal state before the first commit.
    /// A HEAD that resolves to a non-commit object is an error.
    pub fn head_commit(&self) -> Result<Option<CommitId>, RepoError> {
        let head = RefName::new("HEAD")?;
        match self.refs.resolve_oid(&head)? {
            None => Ok(None),
            Some(oid) => match self.odb.commit_id(&oid) {
                Ok(id) => Ok(Some(id)),
                Err(OdbError::TypeMismatch { actual, .. }) => Err(RepoError::NotACommit {
                    name: "HEAD".into(),
                    actual: actual.to_string(),
                }),
                Err(e) => Err(e.into()),
            },
        }
    }

    /// Read the symbolic target of a ref without following it.
    pub fn symbolic_ref(&self, name: &RefName) -> Result<Option<RefName>, RepoError> {
        Ok(self.refs.symbolic_target(name)?)
    }

    /// Point a symbolic ref at a new target.
    pub fn set_symbolic_ref(&self, name: &RefName, target: &RefName) -> Result<(), RepoError> {
        Ok(self.refs.write_symbolic(name, target)?)
    }

    /// Update a ref to a new value and record the change in the reflog.
    ///
    /// Symbolic refs are written through: updating `HEAD` while it points
    /// at `refs/heads/master` writes the branch file, and both reflogs
    /// receive the entry.
    pub fn update_ref(
        &self,
        reason: &str,
        name: &RefName,
        new_value: ObjectId,
        committer: &Signature,
    ) -> Result<(), RepoError> {
        // Follow the symbolic chain to the ref file that actually holds
        // the value.
        let mut final_name = name.clone();
        for _ in 0..MAX_SYMREF_DEPTH {
            match self.refs.symbolic_target(&final_name)? {
                Some(target) => final_name = target,
                None => break,
            }
        }

        let old_value = self
            .refs
            .resolve_oid(&final_name)?
            .unwrap_or(ObjectId::NULL);

        self.refs.write_ref(&final_name, &new_value)?;

        let entry = ReflogEntry {
            old_oid: old_value,
            new_oid: new_value,
            identity: committer.clone(),
            message: reason.into(),
        };
        self.refs.append_reflog(&final_name, &entry)?;
        if final_name != *name {
            self.refs.append_reflog(name, &entry)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bstr::BString;
    use grit_object::{Object, ObjectType};
    use grit_utils::date::GitDate;

    fn sig() -> Signature {
        Signature {
            name: BString::from("Test User"),
            email: BString::from("test@example.com"),
            date: GitDate::new(1234567890, 0),
        }
    }

    fn init_repo() -> (tempfile::TempDir, Repository) {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        (dir, repo)
    }

    #[test]
    fn init_creates_symbolic_head() {
        let (_dir, repo) = init_repo();
        let head = RefName::new("HEAD").unwrap();
        assert_eq!(
            repo.symbolic_ref(&head).unwrap().unwrap().as_str(),
            "refs/heads/master"
        );
        assert!(repo.head_commit().unwrap().is_none());
    }

    #[test]
    fn open_accepts_worktree_and_git_dir() {
        let (dir, _repo) = init_repo();
        let from_worktree = Repository::open(dir.path()).unwrap();
        assert!(from_worktree.work_tree().is_some());

        let from_git_dir = Repository::open(dir.path().join(".git")).unwrap();
        assert!(from_git_dir.work_tree().is_none());
    }

    #[test]
    fn discover_walks_up() {
        let (dir, _repo) = init_repo();
        let nested = dir.path().join("a/b/c");
        std::fs::create_dir_all(&nested).unwrap();
        let repo = Repository::discover(&nested).unwrap();
        assert_eq!(repo.git_dir(), dir.path().join(".git"));
    }

    #[test]
    fn discover_outside_any_repo_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            Repository::discover(dir.path()),
            Err(RepoError::NotARepository(_))
        ));
    }

    #[test]
    fn head_commit_rejects_non_commit() {
        let (_dir, repo) = init_repo();
        let (tree_oid, _) = repo.odb().write_raw(ObjectType::Tree, b"").unwrap();
        let master = RefName::new("refs/heads/master").unwrap();
        repo.refs().write_ref(&master, &tree_oid).unwrap();

        assert!(matches!(
            repo.head_commit(),
            Err(RepoError::NotACommit { .. })
        ));
    }

    #[test]
    fn update_ref_writes_through_symbolic_head() {
        let (_dir, repo) = init_repo();

        let commit = grit_object::Commit {
            tree: repo.odb().write_raw(ObjectType::Tree, b"").unwrap().0,
            parents: Vec::new(),
            author: sig(),
            committer: sig(),
            message: BString::from("m\n"),
        };
        let (commit_oid, _) = repo.odb().write(&Object::Commit(commit)).unwrap();

        let head = RefName::new("HEAD").unwrap();
        repo.update_ref("test: update", &head, commit_oid, &sig())
            .unwrap();

        // The branch file holds the value; HEAD is still symbolic.
        let master = RefName::new("refs/heads/master").unwrap();
        assert_eq!(repo.refs().resolve_oid(&master).unwrap(), Some(commit_oid));
        assert!(repo.symbolic_ref(&head).unwrap().is_some());

        // Both reflogs carry the entry.
        let head_log = repo.refs().reflog(&head).unwrap();
        let master_log = repo.refs().reflog(&master).unwrap();
        assert_eq!(head_log.len(), 1);
        assert_eq!(master_log.len(), 1);
        assert!(head_log[0].old_oid.is_null());
        assert_eq!(head_log[0].new_oid, commit_oid);
        assert_eq!(head_log[0].message, "test: update");
    }
}
