use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use bstr::ByteSlice;
use grit_hash::ObjectId;
use grit_utils::lockfile::LockFile;

use crate::error::RefError;
use crate::name::RefName;

/// A single entry in the packed-refs file.
#[derive(Debug, Clone)]
pub struct PackedRef {
    pub name: RefName,
    pub oid: ObjectId,
    /// Peeled commit for annotated tags (`^<hex>` line).
    pub peeled: Option<ObjectId>,
}

/// Parsed packed-refs file.
///
/// Format:
/// ```text
/// # pack-refs with: peeled fully-peeled sorted
/// <hex-oid> <refname>
/// ^<hex-oid>
/// ```
/// The `^` line gives the peeled value of the annotated tag directly above.
#[derive(Debug, Clone)]
pub struct PackedRefs {
    refs: Vec<PackedRef>,
    sorted: bool,
}

fn packed_refs_path(git_dir: &Path) -> PathBuf {
    git_dir.join("packed-refs")
}

impl PackedRefs {
    /// Parse a packed-refs file.
    pub fn parse(data: &[u8]) -> Result<Self, RefError> {
        let mut refs: Vec<PackedRef> = Vec::new();
        let mut sorted = false;

        for line in data.lines() {
            if line.is_empty() {
                continue;
            }

            if line.starts_with(b"#") {
                if line.find(b"sorted").is_some() {
                    sorted = true;
                }
                continue;
            }

            if let Some(peel_bytes) = line.strip_prefix(b"^") {
                let hex = std::str::from_utf8(peel_bytes)
                    .map_err(|_| RefError::Parse("invalid UTF-8 in peeled OID".into()))?;
                let peeled_oid = ObjectId::from_hex(hex)?;
                match refs.last_mut() {
                    Some(last) => last.peeled = Some(peeled_oid),
                    None => {
                        return Err(RefError::Parse(
                            "peel line with no preceding ref".into(),
                        ))
                    }
                }
                continue;
            }

            let space_pos = line
                .find_byte(b' ')
                .ok_or_else(|| RefError::Parse("invalid packed-refs line".into()))?;

            let hex = std::str::from_utf8(&line[..space_pos])
                .map_err(|_| RefError::Parse("invalid UTF-8 in packed-refs OID".into()))?;
            let oid = ObjectId::from_hex(hex)?;

            let name_str = std::str::from_utf8(&line[space_pos + 1..])
                .map_err(|_| RefError::Parse("invalid UTF-8 in packed-refs name".into()))?;
            let name = RefName::new(name_str.trim())?;

            refs.push(PackedRef {
                name,
                oid,
                peeled: None,
            });
        }

        Ok(Self { refs, sorted })
    }

    /// Load packed-refs from disk. A missing file is an empty set.
    pub fn load(git_dir: &Path) -> Result<Self, RefError> {
        let path = packed_refs_path(git_dir);
        let data = match fs::read(&path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self {
                    refs: Vec::new(),
                    sorted: true,
                })
            }
            Err(e) => {
                return Err(RefError::IoPath {
                    path: path.clone(),
                    source: e,
                })
            }
        };
        Self::parse(&data)
    }

    /// Look up a ref by name.
    pub fn find(&self, name: &RefName) -> Option<&PackedRef> {
        if self.sorted {
            self.refs
                .binary_search_by(|pr| pr.name.cmp(name))
                .ok()
                .map(|idx| &self.refs[idx])
        } else {
            self.refs.iter().find(|pr| pr.name == *name)
        }
    }

    /// All packed entries.
    pub fn refs(&self) -> &[PackedRef] {
        &self.refs
    }

    /// Add or replace a ref.
    pub fn upsert(&mut self, name: RefName, oid: ObjectId, peeled: Option<ObjectId>) {
        match self.refs.iter_mut().find(|pr| pr.name == name) {
            Some(existing) => {
                existing.oid = oid;
                existing.peeled = peeled;
            }
            None => {
                self.refs.push(PackedRef { name, oid, peeled });
                self.sorted = false;
            }
        }
    }

    /// Write the packed-refs file atomically.
    pub fn write(&self, git_dir: &Path) -> Result<(), RefError> {
        let path = packed_refs_path(git_dir);
        let mut lock = LockFile::acquire(&path)?;

        let io_err = |e: std::io::Error| RefError::IoPath {
            path: path.clone(),
            source: e,
        };

        lock.write_all(b"# pack-refs with: peeled fully-peeled sorted \n")
            .map_err(io_err)?;

        let mut sorted_refs = self.refs.clone();
        sorted_refs.sort_by(|a, b| a.name.cmp(&b.name));

        for pr in &sorted_refs {
            lock.write_all(format!("{} {}\n", pr.oid.to_hex(), pr.name).as_bytes())
                .map_err(io_err)?;
            if let Some(peeled) = &pr.peeled {
                lock.write_all(format!("^{}\n", peeled.to_hex()).as_bytes())
                    .map_err(io_err)?;
            }
        }

        lock.commit()?;
        Ok(())
    }
}
