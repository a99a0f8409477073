//! Index/worktree listing with composable filters.

use std::path::Path;

use bstr::BStr;
use grit_hash::Hasher;

use crate::entry::IndexEntry;
use crate::path::IndexPath;
use crate::{Index, IndexError};

/// Which files to list. Filters compose by union.
#[derive(Debug, Clone, Copy, Default)]
pub struct LsFilesOptions {
    /// Every tracked entry.
    pub cached: bool,
    /// Tracked entries whose stat or content no longer matches the index.
    pub modified: bool,
    /// Tracked entries whose path is missing from the worktree.
    pub deleted: bool,
    /// Untracked files found in the worktree.
    pub others: bool,
}

/// One listed file: tracked entries carry their index record, untracked
/// files carry none.
#[derive(Debug, Clone)]
pub struct LsFile {
    pub path: IndexPath,
    pub entry: Option<IndexEntry>,
}

/// List files per the given filters, sorted by path.
///
/// An empty `paths` slice means everything; otherwise a file is included
/// when some element equals its path or names an ancestor directory.
pub fn ls_files(
    index: &Index,
    work_tree: &Path,
    opts: LsFilesOptions,
    paths: &[IndexPath],
) -> Result<Vec<LsFile>, IndexError> {
    let mut result: Vec<LsFile> = Vec::new();

    for entry in index.iter() {
        if !matches_paths(&entry.path, paths) {
            continue;
        }

        let selected = opts.cached
            || ((opts.deleted || opts.modified) && {
                let fs_path = work_tree.join(entry.path.as_str());
                match std::fs::symlink_metadata(&fs_path) {
                    Err(_) => opts.deleted,
                    Ok(meta) => opts.modified && is_modified(entry, &fs_path, &meta),
                }
            });

        if selected {
            result.push(LsFile {
                path: entry.path.clone(),
                entry: Some(entry.clone()),
            });
        }
    }

    if opts.others {
        let mut untracked = Vec::new();
        collect_untracked(work_tree, work_tree, index, &mut untracked)?;
        for path in untracked {
            if matches_paths(&path, paths) {
                result.push(LsFile { path, entry: None });
            }
        }
        result.sort_by(|a, b| a.path.cmp(&b.path));
    }

    Ok(result)
}

/// Stat short-circuit, then content rehash.
///
/// A file that cannot be read counts as modified: the listing must not
/// claim it still matches the index.
fn is_modified(entry: &IndexEntry, fs_path: &Path, meta: &std::fs::Metadata) -> bool {
    if meta.is_dir() {
        return true;
    }
    if entry.stat.matches(meta) {
        return false;
    }
    match hash_worktree_file(fs_path, meta) {
        Some(oid) => oid != entry.oid,
        None => true,
    }
}

/// Blob-hash a worktree file; symlinks hash their target path.
///
/// `None` when the file cannot be read, which callers treat as "cannot
/// confirm unchanged".
pub fn hash_worktree_file(
    fs_path: &Path,
    meta: &std::fs::Metadata,
) -> Option<grit_hash::ObjectId> {
    let data = if meta.is_symlink() {
        std::fs::read_link(fs_path)
            .ok()?
            .into_os_string()
            .into_encoded_bytes()
    } else {
        std::fs::read(fs_path).ok()?
    };
    Hasher::hash_object("blob", &data).ok()
}

fn matches_paths(path: &IndexPath, paths: &[IndexPath]) -> bool {
    paths.is_empty() || paths.iter().any(|p| path.is_under(p.as_bstr()))
}

fn collect_untracked(
    root: &Path,
    dir: &Path,
    index: &Index,
    out: &mut Vec<IndexPath>,
) -> Result<(), IndexError> {
    let entries = match std::fs::read_dir(dir) {
        Ok(e) => e,
        Err(_) => return Ok(()),
    };

    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        let name = entry.file_name();

        if name == ".git" {
            continue;
        }

        if path.is_dir() {
            collect_untracked(root, &path, index, out)?;
        } else if let Ok(rel) = path.strip_prefix(root) {
            let rel_str = rel.to_string_lossy();
            if let Ok(index_path) = IndexPath::new(rel_str.as_ref()) {
                if index.entry(BStr::new(index_path.as_bytes())).is_none() {
                    out.push(index_path);
                }
            }
        }
    }

    Ok(())
}
