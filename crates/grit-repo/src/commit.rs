//! The commit builder.

use bstr::{BString, ByteSlice, ByteVec};
use grit_index::write_tree;
use grit_object::{Commit, CommitId, Object};
use grit_ref::RefName;
use grit_utils::date::{GitDate, Signature};

use crate::{RepoError, Repository};

impl Repository {
    /// Create a commit from the current index and advance HEAD.
    ///
    /// Message fragments arrive in command-line order and are joined with a
    /// blank line between them; the final message always ends in a newline.
    /// The commit has at most one parent: the current HEAD commit, when one
    /// exists.
    pub fn commit(
        &self,
        messages: &[BString],
        author: Signature,
        committer: Signature,
    ) -> Result<CommitId, RepoError> {
        let message = join_messages(messages);
        if message.trim().is_empty() {
            return Err(RepoError::EmptyMessage);
        }

        let parent = self.head_commit()?;

        let index = self.index()?;
        let tree_id = write_tree(&index, self.odb())?;

        let commit = Commit {
            tree: tree_id.as_oid(),
            parents: parent.iter().map(|p| p.as_oid()).collect(),
            author,
            committer: committer.clone(),
            message,
        };

        let (commit_oid, _) = self.odb().write(&Object::Commit(commit.clone()))?;

        let reason = if parent.is_none() {
            format!("commit (initial): {}", commit.summary())
        } else {
            format!("commit: {}", commit.summary())
        };
        let head = RefName::new("HEAD")?;
        self.update_ref(&reason, &head, commit_oid, &committer)?;

        Ok(CommitId::from_verified(commit_oid))
    }
}

/// Join `-m`/`-F` fragments: blank line between fragments, trailing newline.
fn join_messages(messages: &[BString]) -> BString {
    let mut out = BString::new(Vec::new());
    for (i, fragment) in messages.iter().enumerate() {
        if i > 0 {
            out.push_str(b"\n");
        }
        let trimmed = fragment.trim_end_with(|c| c == '\n');
        out.push_str(trimmed);
        out.push_str(b"\n");
    }
    out
}

/// Build a signature from the environment.
///
/// Reads `<prefix>_NAME`, `<prefix>_EMAIL`, and `<prefix>_DATE` (raw
/// `epoch ±zone` form); missing pieces fall back to a fixed identity and
/// the current time.
pub fn signature_from_env(prefix: &str) -> Signature {
    let name = std::env::var(format!("{prefix}_NAME")).unwrap_or_else(|_| "Unknown".into());
    let email =
        std::env::var(format!("{prefix}_EMAIL")).unwrap_or_else(|_| "unknown@localhost".into());
    let date = std::env::var(format!("{prefix}_DATE"))
        .ok()
        .and_then(|d| GitDate::parse_raw(&d).ok())
        .unwrap_or_else(GitDate::now);

    Signature {
        name: BString::from(name),
        email: BString::from(email),
        date,
    }
}
