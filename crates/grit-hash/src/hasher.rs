use std::io::Read;

use digest::Digest;

use crate::{HashError, ObjectId};

/// Streaming SHA-1 computation with collision detection.
///
/// Data is fed incrementally with [`update`](Hasher::update) or through the
/// [`std::io::Write`] implementation, then finalised into an [`ObjectId`].
pub struct Hasher {
    inner: Box<sha1_checked::Sha1>,
}

impl Hasher {
    /// Create a new hasher.
    pub fn new() -> Self {
        Self {
            inner: Box::new(sha1_checked::Sha1::new()),
        }
    }

    /// Feed data into the hasher.
    pub fn update(&mut self, data: &[u8]) {
        self.inner.update(data);
    }

    /// Finalize and return the ObjectId.
    ///
    /// Returns an error if collision detection fires.
    pub fn finalize(self) -> Result<ObjectId, HashError> {
        let result = self.inner.try_finalize();
        if result.has_collision() {
            return Err(HashError::Sha1Collision);
        }
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(result.hash().as_slice());
        ObjectId::from_bytes(&bytes)
    }

    /// Hash data in one call, without object framing.
    pub fn digest(data: &[u8]) -> Result<ObjectId, HashError> {
        let mut h = Self::new();
        h.update(data);
        h.finalize()
    }

    /// Hash a framed object: `"<kind> <len>\0<content>"`.
    pub fn hash_object(kind: &str, data: &[u8]) -> Result<ObjectId, HashError> {
        let header = format!("{} {}\0", kind, data.len());
        let mut h = Self::new();
        h.update(header.as_bytes());
        h.update(data);
        h.finalize()
    }

    /// Hash a framed object from a stream of known length.
    ///
    /// The declared `len` goes into the header, so the caller must know the
    /// content size up front (a file's stat size). Returns the ObjectId and
    /// the number of bytes consumed from the reader.
    pub fn hash_reader(
        kind: &str,
        len: u64,
        reader: &mut dyn Read,
    ) -> Result<(ObjectId, u64), HashError> {
        let header = format!("{} {}\0", kind, len);
        let mut h = Self::new();
        h.update(header.as_bytes());

        let mut buf = [0u8; 8192];
        let mut copied = 0u64;
        loop {
            let n = reader.read(&mut buf)?;
            if n == 0 {
                break;
            }
            h.update(&buf[..n]);
            copied += n as u64;
        }

        Ok((h.finalize()?, copied))
    }

    /// Hash a file on disk as a framed object without loading it whole.
    ///
    /// The stat size supplies the header length, so a file that changes
    /// size mid-hash produces an id that matches neither version.
    pub fn hash_file(
        kind: &str,
        path: impl AsRef<std::path::Path>,
    ) -> Result<(ObjectId, u64), HashError> {
        let mut file = std::fs::File::open(path.as_ref())?;
        let len = file.metadata()?.len();
        Self::hash_reader(kind, len, &mut file)
    }
}

impl Default for Hasher {
    fn default() -> Self {
        Self::new()
    }
}

impl std::io::Write for Hasher {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.update(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Well-known object hashes, checkable with `git hash-object`.
    const EMPTY_BLOB: &str = "e69de29bb2d1d6434b8b29ae775ad8c2e48c5391";
    const BAR_BLOB: &str = "5716ca5987cbf97d6bb54920bea6adde242d87e6";

    #[test]
    fn empty_blob() {
        let oid = Hasher::hash_object("blob", b"").unwrap();
        assert_eq!(oid.to_hex(), EMPTY_BLOB);
    }

    #[test]
    fn blob_content() {
        let oid = Hasher::hash_object("blob", b"bar\n").unwrap();
        assert_eq!(oid.to_hex(), BAR_BLOB);
    }

    #[test]
    fn empty_tree() {
        let oid = Hasher::hash_object("tree", b"").unwrap();
        assert_eq!(oid.to_hex(), "4b825dc642cb6eb9a060e54bf8d69288fbee4904");
    }

    #[test]
    fn incremental_matches_one_shot() {
        let mut h = Hasher::new();
        h.update(b"blob 4\0");
        h.update(b"ba");
        h.update(b"r\n");
        assert_eq!(h.finalize().unwrap().to_hex(), BAR_BLOB);
    }

    #[test]
    fn reader_matches_in_memory() {
        let data = b"bar\n";
        let (oid, n) = Hasher::hash_reader("blob", data.len() as u64, &mut &data[..]).unwrap();
        assert_eq!(oid.to_hex(), BAR_BLOB);
        assert_eq!(n, 4);
    }

    #[test]
    fn file_matches_in_memory() {
        let dir = std::env::temp_dir();
        let path = dir.join(format!("grit-hash-file-{}", std::process::id()));
        std::fs::write(&path, b"bar\n").unwrap();
        let (oid, n) = Hasher::hash_file("blob", &path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(oid.to_hex(), BAR_BLOB);
        assert_eq!(n, 4);
    }

    #[test]
    fn write_impl_feeds_hasher() {
        use std::io::Write;
        let mut h = Hasher::new();
        h.write_all(b"blob 0\0").unwrap();
        assert_eq!(h.finalize().unwrap().to_hex(), EMPTY_BLOB);
    }
}
