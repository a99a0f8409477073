use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use bstr::{BStr, BString, ByteSlice, ByteVec};
use grit_hash::ObjectId;
use grit_utils::date::Signature;

use crate::error::RefError;
use crate::name::RefName;

/// A single reflog entry recording a ref value change.
///
/// Line format: `<old-hex> <new-hex> <identity>\t<message>\n`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReflogEntry {
    pub old_oid: ObjectId,
    pub new_oid: ObjectId,
    pub identity: Signature,
    pub message: BString,
}

impl ReflogEntry {
    /// Parse a reflog entry from a single line.
    pub fn parse(line: &BStr) -> Result<Self, RefError> {
        let line = line.as_bytes();

        // Two 40-char hex OIDs and their separators take 82 bytes.
        if line.len() < 82 {
            return Err(RefError::Parse(format!(
                "reflog line too short: {} bytes",
                line.len()
            )));
        }

        let old_hex = std::str::from_utf8(&line[..40])
            .map_err(|_| RefError::Parse("invalid UTF-8 in old OID".into()))?;
        let old_oid = ObjectId::from_hex(old_hex)?;

        if line[40] != b' ' {
            return Err(RefError::Parse("expected space after old OID".into()));
        }

        let new_hex = std::str::from_utf8(&line[41..81])
            .map_err(|_| RefError::Parse("invalid UTF-8 in new OID".into()))?;
        let new_oid = ObjectId::from_hex(new_hex)?;

        if line[81] != b' ' {
            return Err(RefError::Parse("expected space after new OID".into()));
        }

        let rest = &line[82..];
        let (identity_part, message) = match rest.find_byte(b'\t') {
            Some(tab_pos) => (&rest[..tab_pos], &rest[tab_pos + 1..]),
            None => (rest, &b""[..]),
        };

        let identity = Signature::parse(identity_part.as_bstr())
            .map_err(|e| RefError::Parse(format!("invalid identity in reflog: {e}")))?;

        let message = message.strip_suffix(b"\n").unwrap_or(message);

        Ok(Self {
            old_oid,
            new_oid,
            identity,
            message: BString::from(message),
        })
    }

    /// Serialize to the reflog line format (without trailing newline).
    pub fn to_bytes(&self) -> BString {
        let mut out = BString::new(Vec::with_capacity(128));
        out.push_str(self.old_oid.to_hex().as_bytes());
        out.push(b' ');
        out.push_str(self.new_oid.to_hex().as_bytes());
        out.push(b' ');
        out.push_str(self.identity.to_bytes());
        out.push(b'\t');
        out.push_str(&self.message);
        out
    }
}

/// The reflog file path for a ref.
pub fn reflog_path(git_dir: &Path, name: &RefName) -> PathBuf {
    git_dir.join("logs").join(name.as_str())
}

/// Read all reflog entries for a ref, newest first.
pub fn read_reflog(git_dir: &Path, name: &RefName) -> Result<Vec<ReflogEntry>, RefError> {
    let path = reflog_path(git_dir, name);
    let contents = match fs::read(&path) {
        Ok(data) => data,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => {
            return Err(RefError::IoPath {
                path: path.clone(),
                source: e,
            })
        }
    };

    let mut entries = Vec::new();
    for line in contents.lines() {
        if line.is_empty() {
            continue;
        }
        entries.push(ReflogEntry::parse(line.as_bstr())?);
    }

    // The file is oldest first.
    entries.reverse();
    Ok(entries)
}

/// Append a reflog entry for a ref.
pub fn append_reflog_entry(
    git_dir: &Path,
    name: &RefName,
    entry: &ReflogEntry,
) -> Result<(), RefError> {
    let path = reflog_path(git_dir, name);

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| RefError::IoPath {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    let mut line = entry.to_bytes();
    line.push(b'\n');

    let mut file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|e| RefError::IoPath {
            path: path.clone(),
            source: e,
        })?;

    file.write_all(&line).map_err(|e| RefError::IoPath {
        path: path.clone(),
        source: e,
    })?;

    Ok(())
}
