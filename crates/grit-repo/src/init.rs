use std::fs;
use std::path::Path;

use grit_ref::RefName;

use crate::RepoError;

/// Create the repository skeleton under `<path>/.git`.
///
/// HEAD starts as a symbolic ref to an unborn `refs/heads/master`; the
/// first commit materializes the branch.
pub(crate) fn init_repository(path: &Path) -> Result<(), RepoError> {
    let git_dir = path.join(".git");

    fs::create_dir_all(git_dir.join("objects"))?;
    fs::create_dir_all(git_dir.join("refs/heads"))?;
    fs::create_dir_all(git_dir.join("refs/tags"))?;

    let head_path = git_dir.join("HEAD");
    if !head_path.exists() {
        let refs = grit_ref::RefStore::new(&git_dir);
        let head = RefName::new("HEAD")?;
        let master = RefName::new("refs/heads/master")?;
        refs.write_symbolic(&head, &master)?;
    }

    Ok(())
}
