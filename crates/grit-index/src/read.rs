//! Index file parsing (version 2).

use grit_hash::{Hasher, ObjectId};
use grit_object::FileMode;

use crate::entry::{IndexEntry, StatData};
use crate::path::IndexPath;
use crate::{Index, IndexError};

/// Magic bytes at the start of every index file.
pub(crate) const INDEX_SIGNATURE: &[u8; 4] = b"DIRC";

/// Parse an index file from raw bytes.
pub(crate) fn parse_index(data: &[u8]) -> Result<Index, IndexError> {
    if data.len() < 12 + 20 {
        return Err(IndexError::InvalidHeader("index file too short".into()));
    }

    verify_checksum(data)?;

    let sig = &data[..4];
    if sig != INDEX_SIGNATURE {
        return Err(IndexError::InvalidHeader(format!(
            "bad signature: expected DIRC, got {:?}",
            sig
        )));
    }

    let version = read_u32(&data[4..]);
    if version != 2 {
        return Err(IndexError::UnsupportedVersion(version));
    }

    let entry_count = read_u32(&data[8..]) as usize;
    let content_end = data.len() - 20;

    let mut entries = Vec::with_capacity(entry_count);
    let mut cursor = 12;
    for _ in 0..entry_count {
        let (entry, next) = parse_entry(data, cursor, content_end)?;
        entries.push(entry);
        cursor = next;
    }

    // Anything between the entries and the checksum is extension data
    // (cache-tree and friends); this engine neither uses nor preserves it.

    for pair in entries.windows(2) {
        if pair[0].path >= pair[1].path {
            return Err(IndexError::InvalidEntry {
                offset: 0,
                reason: format!(
                    "entries out of order: '{}' before '{}'",
                    pair[0].path, pair[1].path
                ),
            });
        }
    }

    Ok(Index::from_sorted_entries(entries))
}

/// Fixed-width prefix of an on-disk entry:
/// ctime(8) + mtime(8) + dev(4) + ino(4) + mode(4) + uid(4) + gid(4) + size(4).
const ONDISK_FIXED: usize = 40;

/// Total on-disk entry size: the fixed part, OID, flags, and path are padded
/// with NULs to the next 8-byte boundary.
pub(crate) fn ondisk_entry_size(name_len: usize) -> usize {
    (ONDISK_FIXED + 20 + 2 + name_len + 8) & !7
}

fn parse_entry(
    data: &[u8],
    start: usize,
    content_end: usize,
) -> Result<(IndexEntry, usize), IndexError> {
    if start + ONDISK_FIXED + 22 > content_end {
        return Err(IndexError::InvalidEntry {
            offset: start,
            reason: "entry too short".into(),
        });
    }

    let stat = StatData {
        ctime_secs: read_u32(&data[start..]),
        ctime_nsecs: read_u32(&data[start + 4..]),
        mtime_secs: read_u32(&data[start + 8..]),
        mtime_nsecs: read_u32(&data[start + 12..]),
        dev: read_u32(&data[start + 16..]),
        ino: read_u32(&data[start + 20..]),
        uid: read_u32(&data[start + 28..]),
        gid: read_u32(&data[start + 32..]),
        size: read_u32(&data[start + 36..]),
    };
    let mode_raw = read_u32(&data[start + 24..]);
    let mode = FileMode::from_raw(mode_raw).ok_or_else(|| IndexError::InvalidEntry {
        offset: start,
        reason: format!("invalid mode {mode_raw:o}"),
    })?;

    let oid_start = start + ONDISK_FIXED;
    let oid = ObjectId::from_bytes(&data[oid_start..oid_start + 20]).map_err(|_| {
        IndexError::InvalidEntry {
            offset: start,
            reason: "invalid OID".into(),
        }
    })?;

    let flags = read_u16(&data[oid_start + 20..]);
    let stage = (flags >> 12) & 0x03;
    if stage != 0 {
        return Err(IndexError::InvalidEntry {
            offset: start,
            reason: format!("unmerged entry (stage {stage})"),
        });
    }
    if flags & 0x4000 != 0 {
        return Err(IndexError::InvalidEntry {
            offset: start,
            reason: "extended flags in v2 index".into(),
        });
    }

    let path_start = oid_start + 22;
    let nul_pos = data[path_start..content_end]
        .iter()
        .position(|&b| b == 0)
        .ok_or_else(|| IndexError::InvalidEntry {
            offset: start,
            reason: "missing NUL in path".into(),
        })?;
    let path = IndexPath::new(&data[path_start..path_start + nul_pos])?;

    let mut next = start + ondisk_entry_size(nul_pos);
    if next > content_end {
        next = content_end;
    }

    let entry = IndexEntry {
        path,
        oid,
        mode,
        stat,
    };
    Ok((entry, next))
}

fn verify_checksum(data: &[u8]) -> Result<(), IndexError> {
    let content = &data[..data.len() - 20];
    let stored = &data[data.len() - 20..];

    let computed = Hasher::digest(content).map_err(|_| IndexError::ChecksumMismatch)?;
    if computed.as_bytes() != stored {
        return Err(IndexError::ChecksumMismatch);
    }
    Ok(())
}

pub(crate) fn read_u32(data: &[u8]) -> u32 {
    u32::from_be_bytes([data[0], data[1], data[2], data[3]])
}

fn read_u16(data: &[u8]) -> u16 {
    u16::from_be_bytes([data[0], data[1]])
}
