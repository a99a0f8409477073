//! Raw diff output.
//!
//! One line per differing file:
//! `:<old-mode> <new-mode> <old-oid> <new-oid> <status>\t<path>`.
//! The worktree side's hash is never computed into the output, so the new
//! OID column is always zeros, exactly as C git prints unstaged changes.

use grit_hash::ObjectId;

use crate::HashDiff;

/// Format diffs in the raw format, one line per entry.
pub fn format_raw(diffs: &[HashDiff]) -> String {
    let mut out = String::new();
    for diff in diffs {
        let old_mode = format!("{:06o}", diff.index_mode.raw());
        let new_mode = match diff.worktree_mode {
            Some(mode) => format!("{:06o}", mode.raw()),
            None => "000000".to_string(),
        };

        out.push_str(&format!(
            ":{} {} {} {} {}\t{}\n",
            old_mode,
            new_mode,
            diff.index_oid.to_hex(),
            ObjectId::NULL.to_hex(),
            diff.status(),
            diff.path,
        ));
    }
    out
}
