//! Index file writing (version 2).

use std::io::Write;
use std::path::Path;

use grit_hash::Hasher;
use grit_utils::lockfile::LockFile;

use crate::entry::IndexEntry;
use crate::read::{ondisk_entry_size, INDEX_SIGNATURE};
use crate::{Index, IndexError};

/// Write the index to a file atomically through a lock file.
pub(crate) fn write_index(index: &Index, path: &Path) -> Result<(), IndexError> {
    let mut lock = LockFile::acquire(path).map_err(|_| IndexError::LockFailed {
        path: path.to_path_buf(),
    })?;

    let data = serialize_index(index)?;
    lock.write_all(&data)?;
    lock.commit().map_err(|_| IndexError::LockFailed {
        path: path.to_path_buf(),
    })?;

    Ok(())
}

fn serialize_index(index: &Index) -> Result<Vec<u8>, IndexError> {
    let mut buf = Vec::new();

    buf.extend_from_slice(INDEX_SIGNATURE);
    buf.extend_from_slice(&2u32.to_be_bytes());
    buf.extend_from_slice(&(index.len() as u32).to_be_bytes());

    for entry in index.iter() {
        write_entry(&mut buf, entry);
    }

    let checksum =
        Hasher::digest(&buf).map_err(|_| IndexError::InvalidHeader("checksum failed".into()))?;
    buf.extend_from_slice(checksum.as_bytes());

    Ok(buf)
}

fn write_entry(buf: &mut Vec<u8>, entry: &IndexEntry) {
    let entry_start = buf.len();

    buf.extend_from_slice(&entry.stat.ctime_secs.to_be_bytes());
    buf.extend_from_slice(&entry.stat.ctime_nsecs.to_be_bytes());
    buf.extend_from_slice(&entry.stat.mtime_secs.to_be_bytes());
    buf.extend_from_slice(&entry.stat.mtime_nsecs.to_be_bytes());
    buf.extend_from_slice(&entry.stat.dev.to_be_bytes());
    buf.extend_from_slice(&entry.stat.ino.to_be_bytes());
    buf.extend_from_slice(&entry.mode.raw().to_be_bytes());
    buf.extend_from_slice(&entry.stat.uid.to_be_bytes());
    buf.extend_from_slice(&entry.stat.gid.to_be_bytes());
    buf.extend_from_slice(&entry.stat.size.to_be_bytes());

    buf.extend_from_slice(entry.oid.as_bytes());

    // Flags: stage 0, name length capped at 0xFFF.
    let name_len = entry.path.as_bytes().len();
    let flags: u16 = name_len.min(0xFFF) as u16;
    buf.extend_from_slice(&flags.to_be_bytes());

    buf.extend_from_slice(entry.path.as_bytes());

    let entry_size = ondisk_entry_size(name_len);
    let padding = entry_size - (buf.len() - entry_start);
    buf.resize(buf.len() + padding, 0);
}
