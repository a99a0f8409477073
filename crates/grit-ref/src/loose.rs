use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use bstr::ByteSlice;
use grit_hash::ObjectId;
use grit_utils::lockfile::LockFile;

use crate::error::RefError;
use crate::name::{RefName, SPECIAL_REFS};
use crate::Reference;

/// Read a loose ref file.
///
/// The file holds either a hex OID (direct) or `ref: <target>` (symbolic),
/// both with optional trailing whitespace.
pub(crate) fn read_loose_ref(
    git_dir: &Path,
    name: &RefName,
) -> Result<Option<Reference>, RefError> {
    let path = loose_ref_path(git_dir, name);
    let contents = match fs::read(&path) {
        Ok(data) => data,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(RefError::IoPath {
                path: path.clone(),
                source: e,
            })
        }
    };

    let trimmed = contents.trim();

    if let Some(target_bytes) = trimmed.strip_prefix(b"ref: ") {
        let target_str = std::str::from_utf8(target_bytes.trim())
            .map_err(|_| RefError::Parse("invalid UTF-8 in symbolic ref target".into()))?;
        let target = RefName::new(target_str)?;
        Ok(Some(Reference::Symbolic {
            name: name.clone(),
            target,
        }))
    } else {
        let hex = std::str::from_utf8(trimmed)
            .map_err(|_| RefError::Parse("invalid UTF-8 in ref OID".into()))?;
        let oid = ObjectId::from_hex(hex)?;
        Ok(Some(Reference::Direct {
            name: name.clone(),
            target: oid,
        }))
    }
}

/// Write a loose ref file atomically.
pub(crate) fn write_loose_ref(
    git_dir: &Path,
    name: &RefName,
    oid: &ObjectId,
) -> Result<(), RefError> {
    let path = loose_ref_path(git_dir, name);

    if let Some(parent) = path.parent() {
        check_dir_file_conflict(git_dir, name)?;
        fs::create_dir_all(parent).map_err(|e| RefError::IoPath {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    let mut lock = LockFile::acquire(&path)?;
    let content = format!("{}\n", oid.to_hex());
    lock.write_all(content.as_bytes())
        .map_err(|e| RefError::IoPath {
            path: path.clone(),
            source: e,
        })?;
    lock.commit()?;
    Ok(())
}

/// Write a symbolic ref file atomically.
pub(crate) fn write_symbolic_ref(
    git_dir: &Path,
    name: &RefName,
    target: &RefName,
) -> Result<(), RefError> {
    let path = loose_ref_path(git_dir, name);

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| RefError::IoPath {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    let mut lock = LockFile::acquire(&path)?;
    let content = format!("ref: {}\n", target);
    lock.write_all(content.as_bytes())
        .map_err(|e| RefError::IoPath {
            path: path.clone(),
            source: e,
        })?;
    lock.commit()?;
    Ok(())
}

/// Delete a loose ref file and prune empty parent directories under refs/.
pub(crate) fn delete_loose_ref(git_dir: &Path, name: &RefName) -> Result<(), RefError> {
    let path = loose_ref_path(git_dir, name);
    if path.exists() {
        fs::remove_file(&path).map_err(|e| RefError::IoPath {
            path: path.clone(),
            source: e,
        })?;

        let refs_dir = git_dir.join("refs");
        let mut dir = path.parent().map(|p| p.to_path_buf());
        while let Some(d) = dir {
            if d == refs_dir || d == *git_dir {
                break;
            }
            if d.read_dir().map(|mut e| e.next().is_none()).unwrap_or(false) {
                let _ = fs::remove_dir(&d);
                dir = d.parent().map(|p| p.to_path_buf());
            } else {
                break;
            }
        }
    }
    Ok(())
}

/// Refuse ref names whose path would collide with an existing file or
/// directory (`refs/heads/a` vs `refs/heads/a/b`).
fn check_dir_file_conflict(git_dir: &Path, name: &RefName) -> Result<(), RefError> {
    let ref_path = loose_ref_path(git_dir, name);

    let mut current = git_dir.to_path_buf();
    for component in name.as_str().split('/') {
        current = current.join(component);
        if current == ref_path {
            break;
        }
        if current.is_file() {
            return Err(RefError::DirectoryConflict {
                name: name.to_string(),
                conflict: current
                    .strip_prefix(git_dir)
                    .unwrap_or(&current)
                    .display()
                    .to_string(),
            });
        }
    }

    if ref_path.is_dir() {
        return Err(RefError::DirectoryConflict {
            name: name.to_string(),
            conflict: format!(
                "{} (is a directory)",
                ref_path
                    .strip_prefix(git_dir)
                    .unwrap_or(&ref_path)
                    .display()
            ),
        });
    }

    Ok(())
}

/// Enumerate loose refs under a prefix, sorted by name.
pub(crate) fn enumerate_loose_refs(
    git_dir: &Path,
    prefix: Option<&str>,
) -> Result<Vec<(RefName, PathBuf)>, RefError> {
    let refs_base = git_dir.join("refs");
    let search_dir = match prefix {
        Some(p) => {
            let sub = p.strip_prefix("refs/").unwrap_or(p);
            if sub.is_empty() {
                refs_base.clone()
            } else {
                refs_base.join(sub)
            }
        }
        None => refs_base.clone(),
    };

    let mut result = Vec::new();

    if search_dir.is_dir() {
        collect_loose_refs_recursive(git_dir, &search_dir, prefix, &mut result)?;
    }

    // Special refs live directly in the git dir.
    if prefix.is_none() {
        for special in SPECIAL_REFS {
            let path = git_dir.join(special);
            if path.is_file() {
                if let Ok(name) = RefName::new(*special) {
                    result.push((name, path));
                }
            }
        }
    }

    result.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(result)
}

fn collect_loose_refs_recursive(
    git_dir: &Path,
    dir: &Path,
    prefix: Option<&str>,
    result: &mut Vec<(RefName, PathBuf)>,
) -> Result<(), RefError> {
    let entries = match fs::read_dir(dir) {
        Ok(e) => e,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(e) => {
            return Err(RefError::IoPath {
                path: dir.to_path_buf(),
                source: e,
            })
        }
    };

    for entry in entries {
        let entry = entry.map_err(|e| RefError::IoPath {
            path: dir.to_path_buf(),
            source: e,
        })?;
        let path = entry.path();

        if path.is_dir() {
            collect_loose_refs_recursive(git_dir, &path, prefix, result)?;
        } else if path.is_file() {
            let rel_path = path
                .strip_prefix(git_dir)
                .map_err(|_| RefError::Parse("cannot determine ref name from path".into()))?;
            let name_str = rel_path
                .to_str()
                .ok_or_else(|| RefError::Parse("non-UTF-8 ref path".into()))?;

            if name_str.ends_with(".lock") {
                continue;
            }

            if let Ok(name) = RefName::new(name_str) {
                if let Some(p) = prefix {
                    if !name.as_str().starts_with(p) {
                        continue;
                    }
                }
                result.push((name, path));
            }
        }
    }

    Ok(())
}

/// The filesystem path of a loose ref.
pub(crate) fn loose_ref_path(git_dir: &Path, name: &RefName) -> PathBuf {
    git_dir.join(name.as_str())
}
