use std::fmt;

use bstr::{BStr, BString, ByteSlice};

use crate::error::RefError;

/// A validated reference name.
///
/// Enforces the `git-check-ref-format(1)` rules this engine relies on:
/// - no NUL bytes, control characters, space, or `~^:?*[\`
/// - no `..`, `//`, or `@{`; not the single character `@`
/// - no leading or trailing `/`, no trailing `.`
/// - no component starting with `.` or ending with `.lock`
///
/// `HEAD` and the other ALLCAPS special refs are valid without a slash.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RefName(BString);

/// Characters forbidden anywhere in a ref name.
const FORBIDDEN_CHARS: &[u8] = b" ~^:?*[\\";

/// Special ref names that are valid without a `/` and live directly in the
/// git dir.
pub const SPECIAL_REFS: &[&str] = &["HEAD", "MERGE_HEAD", "ORIG_HEAD", "FETCH_HEAD"];

impl RefName {
    /// Create and validate a ref name.
    pub fn new(name: impl Into<BString>) -> Result<Self, RefError> {
        let name = name.into();
        validate_ref_name(&name)?;
        Ok(Self(name))
    }

    /// Create without validation, for names derived from validated input.
    pub(crate) fn new_unchecked(name: impl Into<BString>) -> Self {
        Self(name.into())
    }

    /// Does this ref match a query pattern?
    ///
    /// A ref `R` matches `P` iff `R == P` or `R` ends with `"/" + P`.
    /// Deliberately narrower than globbing.
    pub fn matches(&self, pattern: &str) -> bool {
        let name = self.0.as_bstr();
        if name == pattern.as_bytes().as_bstr() {
            return true;
        }
        name.len() > pattern.len()
            && name.ends_with(pattern.as_bytes())
            && name[name.len() - pattern.len() - 1] == b'/'
    }

    /// The short name (e.g. `main` from `refs/heads/main`).
    pub fn short_name(&self) -> &BStr {
        let s = self.0.as_bstr();
        if let Some(rest) = s.strip_prefix(b"refs/heads/") {
            rest.as_bstr()
        } else if let Some(rest) = s.strip_prefix(b"refs/tags/") {
            rest.as_bstr()
        } else if let Some(rest) = s.strip_prefix(b"refs/remotes/") {
            rest.as_bstr()
        } else {
            s
        }
    }

    /// Is this under `refs/heads/`?
    pub fn is_branch(&self) -> bool {
        self.0.starts_with(b"refs/heads/")
    }

    /// Is this under `refs/tags/`?
    pub fn is_tag(&self) -> bool {
        self.0.starts_with(b"refs/tags/")
    }

    /// The raw bytes of this ref name.
    pub fn as_bstr(&self) -> &BStr {
        self.0.as_bstr()
    }

    /// As a string slice (validated names are always ASCII in practice).
    pub fn as_str(&self) -> &str {
        std::str::from_utf8(&self.0).unwrap_or("<invalid-utf8>")
    }
}

impl AsRef<BStr> for RefName {
    fn as_ref(&self) -> &BStr {
        self.0.as_bstr()
    }
}

impl fmt::Display for RefName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn validate_ref_name(name: &[u8]) -> Result<(), RefError> {
    let name_str = || String::from_utf8_lossy(name).into_owned();

    if name.is_empty() {
        return Err(RefError::InvalidName("ref name is empty".into()));
    }
    if name.contains(&0) {
        return Err(RefError::InvalidName(format!(
            "'{}': contains NUL byte",
            name_str()
        )));
    }
    if name == b"@" {
        return Err(RefError::InvalidName("'@' is not a valid ref name".into()));
    }

    for (i, &b) in name.iter().enumerate() {
        if b < 0x20 || b == 0x7f {
            return Err(RefError::InvalidName(format!(
                "'{}': contains control character at position {}",
                name_str(),
                i
            )));
        }
        if FORBIDDEN_CHARS.contains(&b) {
            return Err(RefError::InvalidName(format!(
                "'{}': contains forbidden character '{}' at position {}",
                name_str(),
                b as char,
                i
            )));
        }
    }

    if name.starts_with(b"/") || name.ends_with(b"/") {
        return Err(RefError::InvalidName(format!(
            "'{}': begins or ends with '/'",
            name_str()
        )));
    }
    if name.ends_with(b".") {
        return Err(RefError::InvalidName(format!(
            "'{}': ends with '.'",
            name_str()
        )));
    }
    if name.find(b"..").is_some() {
        return Err(RefError::InvalidName(format!(
            "'{}': contains '..'",
            name_str()
        )));
    }
    if name.find(b"//").is_some() {
        return Err(RefError::InvalidName(format!(
            "'{}': contains '//'",
            name_str()
        )));
    }
    if name.find(b"@{").is_some() {
        return Err(RefError::InvalidName(format!(
            "'{}': contains '@{{'",
            name_str()
        )));
    }

    for component in name.split_str(b"/") {
        if component.starts_with(b".") {
            return Err(RefError::InvalidName(format!(
                "'{}': component starts with '.'",
                name_str()
            )));
        }
        if component.ends_with(b".lock") {
            return Err(RefError::InvalidName(format!(
                "'{}': component ends with '.lock'",
                name_str()
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_ordinary_refs() {
        assert!(RefName::new("refs/heads/main").is_ok());
        assert!(RefName::new("refs/tags/v1.0").is_ok());
        assert!(RefName::new("refs/heads/feature/sub-branch").is_ok());
        assert!(RefName::new("HEAD").is_ok());
    }

    #[test]
    fn rejects_forbidden_shapes() {
        for bad in [
            "",
            "@",
            "refs/heads/a..b",
            "refs/heads/a b",
            "refs/heads/a~b",
            "refs/heads/a^b",
            "refs/heads/a:b",
            "refs/heads/a?b",
            "refs/heads/a*b",
            "refs/heads/a[b",
            "refs/heads/a\\b",
            "/refs/heads/a",
            "refs/heads/a/",
            "refs/heads/a.",
            "refs/heads/a.lock",
            "refs/heads/.hidden",
            "refs//heads/a",
            "refs/heads/a@{0}",
        ] {
            assert!(RefName::new(bad).is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn rejects_control_bytes() {
        assert!(RefName::new(BString::from(b"refs/heads/\x01bad".to_vec())).is_err());
        assert!(RefName::new(BString::from(b"refs/heads/a\0b".to_vec())).is_err());
    }

    #[test]
    fn pattern_matching_is_exact_or_suffix() {
        let r = RefName::new("refs/heads/main").unwrap();
        assert!(r.matches("refs/heads/main"));
        assert!(r.matches("heads/main"));
        assert!(r.matches("main"));
        // Not a component boundary:
        assert!(!r.matches("ain"));
        assert!(!r.matches("s/main"));
        // Not a prefix match:
        assert!(!r.matches("refs/heads"));
        assert!(!r.matches("refs"));
    }

    #[test]
    fn pattern_longer_than_name_never_matches() {
        let r = RefName::new("refs/heads/a").unwrap();
        assert!(!r.matches("refs/heads/a/b"));
    }

    #[test]
    fn short_names() {
        assert_eq!(
            RefName::new("refs/heads/main").unwrap().short_name(),
            "main"
        );
        assert_eq!(RefName::new("refs/tags/v1.0").unwrap().short_name(), "v1.0");
        assert_eq!(
            RefName::new("refs/remotes/origin/main")
                .unwrap()
                .short_name(),
            "origin/main"
        );
        assert_eq!(RefName::new("HEAD").unwrap().short_name(), "HEAD");
    }

    #[test]
    fn namespace_predicates() {
        assert!(RefName::new("refs/heads/main").unwrap().is_branch());
        assert!(!RefName::new("refs/heads/main").unwrap().is_tag());
        assert!(RefName::new("refs/tags/v1.0").unwrap().is_tag());
    }

    #[test]
    fn ordering_is_lexicographic() {
        let a = RefName::new("refs/heads/alpha").unwrap();
        let b = RefName::new("refs/heads/beta").unwrap();
        assert!(a < b);
    }
}
