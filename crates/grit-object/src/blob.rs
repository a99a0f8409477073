use bstr::BString;

/// A blob object: raw file content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    pub data: BString,
}

impl Blob {
    /// Wrap raw content bytes.
    pub fn from_bytes(data: &[u8]) -> Self {
        Self {
            data: BString::from(data),
        }
    }

    /// Content length in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the blob is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
