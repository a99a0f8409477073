use std::fs::Metadata;
use std::path::Path;

use grit_index::{ls_files, IndexEntry, IndexPath, LsFilesOptions};
use grit_object::FileMode;
use grit_repo::Repository;

use crate::{DiffError, HashDiff};

/// Compare the index against the working tree.
///
/// Emits one [`HashDiff`] per file whose content or presence differs from
/// its staged entry, sorted by path. Individual stat or read failures
/// degrade to deletions; they never abort the walk.
pub fn diff_files(repo: &Repository, paths: &[IndexPath]) -> Result<Vec<HashDiff>, DiffError> {
    let work_tree = repo.require_work_tree()?;
    let index = repo.index()?;

    let candidates = ls_files(
        &index,
        work_tree,
        LsFilesOptions {
            cached: true,
            deleted: true,
            modified: true,
            ..Default::default()
        },
        paths,
    )?;

    let mut diffs = Vec::new();

    for candidate in candidates {
        let entry = match candidate.entry {
            Some(e) => e,
            None => continue,
        };
        let fs_path = work_tree.join(entry.path.as_str());

        let meta = match std::fs::symlink_metadata(&fs_path) {
            Ok(meta) => meta,
            Err(_) => {
                // Missing or unreadable: report as gone.
                diffs.push(deleted_diff(&entry));
                continue;
            }
        };

        if meta.is_dir() {
            // The file was replaced by a directory; from the index's point
            // of view the file is gone.
            diffs.push(deleted_diff(&entry));
            continue;
        }

        let worktree_mode = classify_mode(&meta);
        let worktree_size = meta.len();

        if entry.stat.matches(&meta) {
            continue;
        }

        // Stat disagreed: only an actual content change (or unreadable
        // file) is reported.
        match hash_file(&fs_path, &meta) {
            Some(oid) if oid == entry.oid => continue,
            _ => diffs.push(HashDiff {
                path: entry.path.clone(),
                index_mode: entry.mode,
                index_oid: entry.oid,
                worktree_mode: Some(worktree_mode),
                index_size: u64::from(entry.stat.size),
                worktree_size,
            }),
        }
    }

    diffs.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(diffs)
}

fn deleted_diff(entry: &IndexEntry) -> HashDiff {
    HashDiff {
        path: entry.path.clone(),
        index_mode: entry.mode,
        index_oid: entry.oid,
        worktree_mode: None,
        index_size: u64::from(entry.stat.size),
        worktree_size: 0,
    }
}

/// Mode classification from the stat.
///
/// Non-regular, non-symlink files (sockets, fifos, devices) are lumped in
/// with symlinks; the index cannot hold them anyway.
fn classify_mode(meta: &Metadata) -> FileMode {
    if !meta.is_file() {
        return FileMode::Symlink;
    }
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if meta.permissions().mode() & 0o100 != 0 {
            return FileMode::Executable;
        }
    }
    FileMode::Regular
}

fn hash_file(fs_path: &Path, meta: &Metadata) -> Option<grit_hash::ObjectId> {
    grit_index::ls_files::hash_worktree_file(fs_path, meta)
}

#[cfg(test)]
mod tests {
    use super::*;
    use grit_hash::Hasher;
    use grit_index::StatData;

    fn init_repo() -> (tempfile::TempDir, Repository) {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        (dir, repo)
    }

    fn stage(repo: &Repository, rel: &str, content: &[u8]) {
        let work_tree = repo.work_tree().unwrap();
        let fs_path = work_tree.join(rel);
        if let Some(parent) = fs_path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&fs_path, content).unwrap();

        let mut index = repo.index().unwrap();
        let meta = std::fs::symlink_metadata(&fs_path).unwrap();
        index.add(IndexEntry {
            path: IndexPath::new(rel).unwrap(),
            oid: Hasher::hash_object("blob", content).unwrap(),
            mode: FileMode::Regular,
            stat: StatData::from_metadata(&meta),
        });
        repo.write_index(&index).unwrap();
    }

    #[test]
    fn clean_worktree_has_no_diffs() {
        let (_dir, repo) = init_repo();
        stage(&repo, "foo", b"bar\n");
        assert!(diff_files(&repo, &[]).unwrap().is_empty());
    }

    #[test]
    fn content_change_is_reported() {
        let (_dir, repo) = init_repo();
        stage(&repo, "foo", b"bar\n");
        std::fs::write(repo.work_tree().unwrap().join("foo"), b"changed\n").unwrap();

        let diffs = diff_files(&repo, &[]).unwrap();
        assert_eq!(diffs.len(), 1);
        assert_eq!(diffs[0].path.as_str(), "foo");
        assert_eq!(diffs[0].status(), 'M');
        assert_eq!(diffs[0].worktree_mode, Some(FileMode::Regular));
        assert_eq!(diffs[0].worktree_size, 8);
    }

    #[test]
    fn touch_without_change_is_silent() {
        let (_dir, repo) = init_repo();
        stage(&repo, "foo", b"bar\n");
        // Rewriting the same bytes perturbs the stat; the rehash fallback
        // must swallow it.
        std::fs::write(repo.work_tree().unwrap().join("foo"), b"bar\n").unwrap();
        assert!(diff_files(&repo, &[]).unwrap().is_empty());
    }

    #[test]
    fn missing_file_reports_deletion() {
        let (_dir, repo) = init_repo();
        stage(&repo, "foo", b"bar\n");
        std::fs::remove_file(repo.work_tree().unwrap().join("foo")).unwrap();

        let diffs = diff_files(&repo, &[]).unwrap();
        assert_eq!(diffs.len(), 1);
        assert_eq!(diffs[0].status(), 'D');
        assert_eq!(diffs[0].worktree_mode, None);
        assert_eq!(diffs[0].worktree_size, 0);
    }

    #[test]
    fn directory_in_place_of_file_reports_deletion() {
        let (_dir, repo) = init_repo();
        stage(&repo, "foo", b"bar\n");
        let path = repo.work_tree().unwrap().join("foo");
        std::fs::remove_file(&path).unwrap();
        std::fs::create_dir(&path).unwrap();

        let diffs = diff_files(&repo, &[]).unwrap();
        assert_eq!(diffs.len(), 1);
        assert_eq!(diffs[0].status(), 'D');
    }

    #[cfg(unix)]
    #[test]
    fn exec_bit_classifies_worktree_mode() {
        use std::os::unix::fs::PermissionsExt;

        let (_dir, repo) = init_repo();
        stage(&repo, "script", b"#!/bin/sh\n");
        let path = repo.work_tree().unwrap().join("script");
        std::fs::write(&path, b"#!/bin/sh\necho changed\n").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();

        let diffs = diff_files(&repo, &[]).unwrap();
        assert_eq!(diffs.len(), 1);
        assert_eq!(diffs[0].worktree_mode, Some(FileMode::Executable));
    }

    #[test]
    fn output_is_sorted_by_path() {
        let (_dir, repo) = init_repo();
        stage(&repo, "zebra", b"z\n");
        stage(&repo, "alpha", b"a\n");
        let wt = repo.work_tree().unwrap().to_path_buf();
        std::fs::write(wt.join("zebra"), b"zz\n").unwrap();
        std::fs::write(wt.join("alpha"), b"aa\n").unwrap();

        let diffs = diff_files(&repo, &[]).unwrap();
        let paths: Vec<_> = diffs.iter().map(|d| d.path.as_str()).collect();
        assert_eq!(paths, vec!["alpha", "zebra"]);
    }

    #[test]
    fn path_arguments_narrow_the_diff() {
        let (_dir, repo) = init_repo();
        stage(&repo, "src/a", b"a\n");
        stage(&repo, "docs/b", b"b\n");
        let wt = repo.work_tree().unwrap().to_path_buf();
        std::fs::write(wt.join("src/a"), b"aa\n").unwrap();
        std::fs::write(wt.join("docs/b"), b"bb\n").unwrap();

        let diffs = diff_files(&repo, &[IndexPath::new("src").unwrap()]).unwrap();
        let paths: Vec<_> = diffs.iter().map(|d| d.path.as_str()).collect();
        assert_eq!(paths, vec!["src/a"]);
    }
}
