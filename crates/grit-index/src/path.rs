use std::fmt;

use bstr::{BStr, BString, ByteSlice};

use crate::IndexError;

/// A validated index path: the canonical key for staged files.
///
/// Non-empty, NUL-free, slash-separated, with no leading or trailing slash
/// and no `.`, `..`, or empty components. Ordering is byte-lexicographic on
/// the raw path.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IndexPath(BString);

impl IndexPath {
    /// Create and validate an index path.
    pub fn new(path: impl Into<BString>) -> Result<Self, IndexError> {
        let path = path.into();
        validate_index_path(&path)?;
        Ok(Self(path))
    }

    /// The raw path bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// The raw path as a byte string.
    pub fn as_bstr(&self) -> &BStr {
        self.0.as_bstr()
    }

    /// As a string slice; index paths are treated as UTF-8 for display and
    /// filesystem joins.
    pub fn as_str(&self) -> &str {
        std::str::from_utf8(&self.0).unwrap_or("<invalid-utf8>")
    }

    /// Does this path sit at or below `prefix`?
    ///
    /// True when the paths are equal or `prefix` names an ancestor
    /// directory (`foo` covers `foo/bar` but not `foobar`).
    pub fn is_under(&self, prefix: &BStr) -> bool {
        if self.0.as_bstr() == prefix {
            return true;
        }
        self.0.len() > prefix.len()
            && self.0.starts_with(prefix)
            && self.0[prefix.len()] == b'/'
    }
}

impl fmt::Display for IndexPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn validate_index_path(path: &[u8]) -> Result<(), IndexError> {
    let path_str = || String::from_utf8_lossy(path).into_owned();

    if path.is_empty() {
        return Err(IndexError::InvalidPath("path is empty".into()));
    }
    if path.contains(&0) {
        return Err(IndexError::InvalidPath(format!(
            "'{}': contains NUL byte",
            path_str()
        )));
    }
    if path.starts_with(b"/") {
        return Err(IndexError::InvalidPath(format!(
            "'{}': absolute paths are not index keys",
            path_str()
        )));
    }
    if path.ends_with(b"/") {
        return Err(IndexError::InvalidPath(format!(
            "'{}': trailing slash",
            path_str()
        )));
    }
    for component in path.split_str(b"/") {
        match component {
            b"" => {
                return Err(IndexError::InvalidPath(format!(
                    "'{}': empty path component",
                    path_str()
                )))
            }
            b"." | b".." => {
                return Err(IndexError::InvalidPath(format!(
                    "'{}': '.' and '..' components are not allowed",
                    path_str()
                )))
            }
            _ => {}
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_paths() {
        assert!(IndexPath::new("foo").is_ok());
        assert!(IndexPath::new("foo/bar").is_ok());
        assert!(IndexPath::new("a/b/c.txt").is_ok());
        assert!(IndexPath::new(".hidden").is_ok());
    }

    #[test]
    fn rejects_malformed_paths() {
        for bad in ["", "/abs", "trail/", "a//b", ".", "..", "a/./b", "a/../b"] {
            assert!(IndexPath::new(bad).is_err(), "accepted {bad:?}");
        }
        assert!(IndexPath::new(BString::from(b"nul\0byte".to_vec())).is_err());
    }

    #[test]
    fn ordering_is_byte_lexicographic() {
        let a = IndexPath::new("bar").unwrap();
        let b = IndexPath::new("bar/baz").unwrap();
        let c = IndexPath::new("foo").unwrap();
        assert!(a < b);
        assert!(b < c);
    }

    #[test]
    fn is_under_respects_component_boundaries() {
        let p = IndexPath::new("foo/bar").unwrap();
        assert!(p.is_under(BStr::new("foo")));
        assert!(p.is_under(BStr::new("foo/bar")));
        assert!(!p.is_under(BStr::new("fo")));
        assert!(!p.is_under(BStr::new("foo/b")));

        let q = IndexPath::new("foobar").unwrap();
        assert!(!q.is_under(BStr::new("foo")));
    }
}
