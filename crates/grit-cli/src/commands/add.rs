use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Args;
use grit_index::{IndexEntry, IndexPath, StatData};
use grit_object::{FileMode, ObjectType};

use super::open_repo;
use crate::Cli;

#[derive(Args)]
pub struct AddArgs {
    /// Files to stage
    #[arg(value_name = "path", required = true)]
    paths: Vec<PathBuf>,
}

pub fn run(args: &AddArgs, cli: &Cli) -> Result<i32> {
    let repo = open_repo(cli)?;
    let work_tree = repo.require_work_tree()?.to_path_buf();
    let mut index = repo.index()?;

    for path in &args.paths {
        let rel = normalize(path, &work_tree)?;
        let fs_path = work_tree.join(rel.as_str());

        let meta = std::fs::symlink_metadata(&fs_path)?;
        let (mode, data) = if meta.is_symlink() {
            let target = std::fs::read_link(&fs_path)?;
            (
                FileMode::Symlink,
                target.into_os_string().into_encoded_bytes(),
            )
        } else if meta.is_file() {
            (mode_for(&meta), std::fs::read(&fs_path)?)
        } else {
            bail!("'{}' is not a file", rel);
        };

        let (oid, _) = repo.odb().write_raw(ObjectType::Blob, &data)?;
        index.add(IndexEntry {
            path: rel,
            oid,
            mode,
            stat: StatData::from_metadata(&meta),
        });
    }

    repo.write_index(&index)?;
    Ok(0)
}

/// Resolve a command-line path to its index key relative to the worktree.
fn normalize(path: &PathBuf, work_tree: &std::path::Path) -> Result<IndexPath> {
    let abs = if path.is_absolute() {
        grit_utils::path::normalize(path)
    } else {
        grit_utils::path::normalize(&std::env::current_dir()?.join(path))
    };
    let rel = abs
        .strip_prefix(grit_utils::path::normalize(work_tree))
        .map_err(|_| anyhow::anyhow!("'{}' is outside the repository", path.display()))?;
    Ok(IndexPath::new(rel.to_string_lossy().as_ref())?)
}

fn mode_for(meta: &std::fs::Metadata) -> FileMode {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if meta.permissions().mode() & 0o111 != 0 {
            return FileMode::Executable;
        }
    }
    FileMode::Regular
}
