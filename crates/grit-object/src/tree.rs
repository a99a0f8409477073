use std::cmp::Ordering;

use bstr::{BStr, BString, ByteSlice};
use grit_hash::ObjectId;

use crate::ObjectError;

/// File mode for tree and index entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileMode {
    /// Regular file (100644)
    Regular,
    /// Executable file (100755)
    Executable,
    /// Symbolic link (120000)
    Symlink,
    /// Submodule link (160000)
    Gitlink,
    /// Subdirectory (040000)
    Tree,
}

impl FileMode {
    /// Parse from octal ASCII bytes (e.g. `b"100644"`).
    pub fn from_bytes(s: &[u8]) -> Result<Self, ObjectError> {
        let raw = parse_octal(s)
            .ok_or_else(|| ObjectError::InvalidFileMode(String::from_utf8_lossy(s).into()))?;
        Self::from_raw(raw)
            .ok_or_else(|| ObjectError::InvalidFileMode(String::from_utf8_lossy(s).into()))
    }

    /// Create from the raw numeric value.
    pub fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            0o100644 => Some(Self::Regular),
            0o100755 => Some(Self::Executable),
            0o120000 => Some(Self::Symlink),
            0o160000 => Some(Self::Gitlink),
            0o040000 => Some(Self::Tree),
            _ => None,
        }
    }

    /// The raw numeric value.
    pub fn raw(&self) -> u32 {
        match self {
            Self::Regular => 0o100644,
            Self::Executable => 0o100755,
            Self::Symlink => 0o120000,
            Self::Gitlink => 0o160000,
            Self::Tree => 0o40000,
        }
    }

    /// Octal ASCII as written in tree objects (no leading zero for trees).
    pub fn as_bytes(&self) -> BString {
        BString::from(format!("{:o}", self.raw()))
    }

    /// Is this a tree (directory) entry?
    pub fn is_tree(&self) -> bool {
        matches!(self, Self::Tree)
    }

    /// Is this a blob (file) entry?
    pub fn is_blob(&self) -> bool {
        matches!(self, Self::Regular | Self::Executable)
    }

    /// Is this a symlink?
    pub fn is_symlink(&self) -> bool {
        matches!(self, Self::Symlink)
    }
}

/// Parse an octal ASCII string to u32.
fn parse_octal(s: &[u8]) -> Option<u32> {
    if s.is_empty() {
        return None;
    }
    let mut val: u32 = 0;
    for &b in s {
        if !(b'0'..=b'7').contains(&b) {
            return None;
        }
        val = val.checked_mul(8)?.checked_add(u32::from(b - b'0'))?;
    }
    Some(val)
}

/// A single entry in a tree object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    pub mode: FileMode,
    pub name: BString,
    pub oid: ObjectId,
}

impl TreeEntry {
    /// Compare entries using the canonical tree sorting rules.
    ///
    /// Subtree names compare as if they carried a trailing `/`: a file `foo`
    /// sorts before a subtree `foo`, and a subtree `foo` sorts after a file
    /// `foo.c` because `/` (0x2f) is greater than `.` (0x2e).
    pub fn cmp_entries(a: &TreeEntry, b: &TreeEntry) -> Ordering {
        base_name_compare(
            a.name.as_ref(),
            a.mode.is_tree(),
            b.name.as_ref(),
            b.mode.is_tree(),
        )
    }
}

impl PartialOrd for TreeEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TreeEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        Self::cmp_entries(self, other)
    }
}

/// Tree entry name comparison.
///
/// After the common prefix, a directory name contributes an implicit `/`
/// where a file name contributes NUL. Everything else is byte-wise.
fn base_name_compare(name1: &[u8], is_dir1: bool, name2: &[u8], is_dir2: bool) -> Ordering {
    let min_len = name1.len().min(name2.len());
    let cmp = name1[..min_len].cmp(&name2[..min_len]);
    if cmp != Ordering::Equal {
        return cmp;
    }
    let c1 = if name1.len() > min_len {
        name1[min_len]
    } else if is_dir1 {
        b'/'
    } else {
        0
    };
    let c2 = if name2.len() > min_len {
        name2[min_len]
    } else if is_dir2 {
        b'/'
    } else {
        0
    };
    c1.cmp(&c2)
}

/// A tree object: a directory listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tree {
    pub entries: Vec<TreeEntry>,
}

impl Tree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse tree content from the binary format.
    ///
    /// Each entry is `<mode-ascii> <name>\0<20 oid bytes>`, no separators.
    pub fn parse(content: &[u8]) -> Result<Self, ObjectError> {
        let mut entries = Vec::new();
        let mut pos = 0;

        while pos < content.len() {
            let space_pos = content[pos..]
                .iter()
                .position(|&b| b == b' ')
                .ok_or_else(|| ObjectError::InvalidTreeEntry {
                    offset: pos,
                    reason: "missing space after mode".into(),
                })?
                + pos;

            let mode = FileMode::from_bytes(&content[pos..space_pos]).map_err(|_| {
                ObjectError::InvalidTreeEntry {
                    offset: pos,
                    reason: "invalid mode".into(),
                }
            })?;

            let name_start = space_pos + 1;
            let null_pos = content[name_start..]
                .iter()
                .position(|&b| b == 0)
                .ok_or_else(|| ObjectError::InvalidTreeEntry {
                    offset: name_start,
                    reason: "missing null after name".into(),
                })?
                + name_start;

            let name = BString::from(&content[name_start..null_pos]);

            let oid_start = null_pos + 1;
            if oid_start + 20 > content.len() {
                return Err(ObjectError::InvalidTreeEntry {
                    offset: oid_start,
                    reason: "truncated OID".into(),
                });
            }
            let oid = ObjectId::from_bytes(&content[oid_start..oid_start + 20])?;

            entries.push(TreeEntry { mode, name, oid });
            pos = oid_start + 20;
        }

        Ok(Self { entries })
    }

    /// Serialize tree content to the binary format, in canonical sort order.
    pub fn serialize_content(&self) -> Vec<u8> {
        let mut sorted = self.entries.clone();
        sorted.sort();

        let mut out = Vec::new();
        for entry in &sorted {
            out.extend_from_slice(&entry.mode.as_bytes());
            out.push(b' ');
            out.extend_from_slice(&entry.name);
            out.push(0);
            out.extend_from_slice(entry.oid.as_bytes());
        }
        out
    }

    /// Sort entries into canonical order.
    pub fn sort(&mut self) {
        self.entries.sort();
    }

    /// Look up an entry by name.
    pub fn find(&self, name: &BStr) -> Option<&TreeEntry> {
        self.entries.iter().find(|e| e.name.as_bstr() == name)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the tree is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(mode: FileMode, name: &str) -> TreeEntry {
        TreeEntry {
            mode,
            name: BString::from(name),
            oid: ObjectId::NULL,
        }
    }

    #[test]
    fn mode_from_bytes() {
        assert_eq!(FileMode::from_bytes(b"100644").unwrap(), FileMode::Regular);
        assert_eq!(
            FileMode::from_bytes(b"100755").unwrap(),
            FileMode::Executable
        );
        assert_eq!(FileMode::from_bytes(b"120000").unwrap(), FileMode::Symlink);
        assert_eq!(FileMode::from_bytes(b"160000").unwrap(), FileMode::Gitlink);
        assert_eq!(FileMode::from_bytes(b"40000").unwrap(), FileMode::Tree);
        assert!(FileMode::from_bytes(b"100645").is_err());
        assert!(FileMode::from_bytes(b"12q000").is_err());
    }

    #[test]
    fn mode_octal_roundtrip() {
        for mode in [
            FileMode::Regular,
            FileMode::Executable,
            FileMode::Symlink,
            FileMode::Gitlink,
            FileMode::Tree,
        ] {
            assert_eq!(FileMode::from_bytes(&mode.as_bytes()).unwrap(), mode);
        }
        // Trees drop the leading zero on disk.
        assert_eq!(FileMode::Tree.as_bytes(), "40000");
    }

    #[test]
    fn file_sorts_before_same_named_subtree() {
        let file = entry(FileMode::Regular, "foo");
        let dir = entry(FileMode::Tree, "foo");
        assert_eq!(TreeEntry::cmp_entries(&file, &dir), Ordering::Less);
    }

    #[test]
    fn subtree_sorts_after_dotted_file() {
        // "foo/" > "foo.c" because '/' > '.'.
        let dir = entry(FileMode::Tree, "foo");
        let file = entry(FileMode::Regular, "foo.c");
        assert_eq!(TreeEntry::cmp_entries(&dir, &file), Ordering::Greater);
    }

    #[test]
    fn unrelated_names_stay_lexicographic() {
        let bar = entry(FileMode::Regular, "bar");
        let baz = entry(FileMode::Tree, "baz");
        assert_eq!(TreeEntry::cmp_entries(&bar, &baz), Ordering::Less);
    }

    #[test]
    fn parse_empty_tree() {
        assert!(Tree::parse(b"").unwrap().is_empty());
    }

    #[test]
    fn parse_single_entry() {
        let oid = ObjectId::from_hex("5716ca5987cbf97d6bb54920bea6adde242d87e6").unwrap();
        let mut data = Vec::new();
        data.extend_from_slice(b"100644 hello.txt\0");
        data.extend_from_slice(oid.as_bytes());

        let tree = Tree::parse(&data).unwrap();
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.entries[0].mode, FileMode::Regular);
        assert_eq!(tree.entries[0].name, "hello.txt");
        assert_eq!(tree.entries[0].oid, oid);
    }

    #[test]
    fn serialize_sorts_entries() {
        let tree = Tree {
            entries: vec![
                entry(FileMode::Regular, "b.txt"),
                entry(FileMode::Tree, "a-dir"),
            ],
        };
        let parsed = Tree::parse(&tree.serialize_content()).unwrap();
        assert_eq!(parsed.entries[0].name, "a-dir");
        assert_eq!(parsed.entries[1].name, "b.txt");
    }

    #[test]
    fn find_by_name() {
        let tree = Tree {
            entries: vec![
                entry(FileMode::Regular, "README.md"),
                entry(FileMode::Tree, "src"),
            ],
        };
        assert!(tree.find(BStr::new("src")).is_some());
        assert!(tree.find(BStr::new("missing")).is_none());
    }

    #[test]
    fn truncated_oid_rejected() {
        let mut data = Vec::new();
        data.extend_from_slice(b"100644 f\0");
        data.extend_from_slice(&[0u8; 10]);
        assert!(matches!(
            Tree::parse(&data),
            Err(ObjectError::InvalidTreeEntry { .. })
        ));
    }
}
