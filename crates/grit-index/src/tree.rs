//! The tree writer: folds the sorted index into nested tree objects.
//!
//! Hashes produced here must be bit-exact with the reference
//! implementation, which is why entries are re-sorted per tree with the
//! trailing-`/` rule after the path partition.

use bstr::BString;
use grit_object::{FileMode, ObjectType, Tree, TreeEntry, TreeId};
use grit_odb::ObjectStore;

use crate::{Index, IndexEntry, IndexError};

/// Write the tree hierarchy for the index, returning the root tree id.
///
/// An empty index still writes a tree: the `"tree 0\0"` framing hashes to
/// `4b825dc642cb6eb9a060e54bf8d69288fbee4904`. Trees that already exist in
/// the store are counted as written.
pub fn write_tree(index: &Index, store: &ObjectStore) -> Result<TreeId, IndexError> {
    let entries: Vec<&IndexEntry> = index.iter().collect();
    build_tree(&entries, b"", store)
}

/// Recursively build tree objects from sorted index entries.
///
/// `entries` holds every index entry under `prefix`, still in index
/// (byte-lexicographic) order; each recursion level peels off one path
/// component.
fn build_tree(
    entries: &[&IndexEntry],
    prefix: &[u8],
    store: &ObjectStore,
) -> Result<TreeId, IndexError> {
    let mut tree = Tree::new();
    let mut i = 0;

    while i < entries.len() {
        let entry = entries[i];
        let path = &entry.path.as_bytes()[prefix.len()..];

        if let Some(slash_pos) = path.iter().position(|&b| b == b'/') {
            // First component names a subtree: gather its span and recurse.
            let dir_name = &path[..slash_pos];
            let subtree_end = entries[i..]
                .iter()
                .position(|e| {
                    let p = &e.path.as_bytes()[prefix.len()..];
                    !p.starts_with(dir_name) || (p.len() > slash_pos && p[slash_pos] != b'/')
                })
                .map(|pos| i + pos)
                .unwrap_or(entries.len());

            let mut sub_prefix = prefix.to_vec();
            sub_prefix.extend_from_slice(dir_name);
            sub_prefix.push(b'/');

            let subtree_id = build_tree(&entries[i..subtree_end], &sub_prefix, store)?;

            tree.entries.push(TreeEntry {
                mode: FileMode::Tree,
                name: BString::from(dir_name),
                oid: subtree_id.as_oid(),
            });

            i = subtree_end;
        } else {
            tree.entries.push(TreeEntry {
                mode: entry.mode,
                name: BString::from(path),
                oid: entry.oid,
            });
            i += 1;
        }
    }

    // serialize_content sorts with the canonical comparison.
    let (oid, _already_existed) = store.write_raw(ObjectType::Tree, &tree.serialize_content())?;
    Ok(TreeId::from_verified(oid))
}
