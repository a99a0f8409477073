use std::fs;
use std::io::{Read, Write};
use std::path::Path;

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use grit_hash::{Hasher, ObjectId};
use grit_object::{header, Object, ObjectType};

use crate::{ObjectStore, OdbError};

impl ObjectStore {
    /// Check whether an object exists.
    pub fn contains(&self, oid: &ObjectId) -> bool {
        self.object_path(oid).is_file()
    }

    /// Write an object. Returns the id and whether it already existed.
    pub fn write(&self, obj: &Object) -> Result<(ObjectId, bool), OdbError> {
        self.write_raw(obj.object_type(), &obj.serialize_content())
    }

    /// Write raw content with a known kind. Returns `(oid, already_existed)`.
    ///
    /// An existing object is success: the store is content-addressed, so the
    /// bytes on disk are already the bytes being written.
    pub fn write_raw(
        &self,
        obj_type: ObjectType,
        content: &[u8],
    ) -> Result<(ObjectId, bool), OdbError> {
        let hdr = header::write_header(obj_type, content.len());

        let oid = {
            let mut hasher = Hasher::new();
            hasher.update(&hdr);
            hasher.update(content);
            hasher.finalize()?
        };

        if self.contains(&oid) {
            return Ok((oid, true));
        }

        let final_path = self.object_path(&oid);
        if let Some(parent) = final_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let tmp_path = self.write_to_temp(&hdr, content)?;
        finalize_object(&tmp_path, &final_path)?;

        Ok((oid, false))
    }

    /// Read an object by id. `Ok(None)` when absent, `Err` when corrupt.
    pub fn read(&self, oid: &ObjectId) -> Result<Option<Object>, OdbError> {
        match self.read_raw(oid)? {
            Some((obj_type, content)) => {
                Ok(Some(Object::parse_content(obj_type, &content)?))
            }
            None => Ok(None),
        }
    }

    /// Read an object's kind and content bytes without parsing.
    pub fn read_raw(&self, oid: &ObjectId) -> Result<Option<(ObjectType, Vec<u8>)>, OdbError> {
        let path = self.object_path(oid);
        let compressed = match fs::read(&path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(OdbError::Io(e)),
        };

        let decompressed = decompress_all(&compressed, oid)?;
        let (obj_type, content_size, header_len) = header::parse_header(&decompressed)?;
        let content = &decompressed[header_len..];
        if content.len() != content_size {
            return Err(OdbError::Corrupt {
                oid: oid.to_hex(),
                reason: format!(
                    "size mismatch: header says {}, payload is {}",
                    content_size,
                    content.len()
                ),
            });
        }
        Ok(Some((obj_type, content.to_vec())))
    }

    /// Read just the kind and size without decompressing the full content.
    pub fn read_header(&self, oid: &ObjectId) -> Result<Option<(ObjectType, usize)>, OdbError> {
        let path = self.object_path(oid);
        let compressed = match fs::read(&path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(OdbError::Io(e)),
        };

        // Headers fit well inside 64 bytes.
        let mut decoder = ZlibDecoder::new(&compressed[..]);
        let mut buf = [0u8; 64];
        let mut filled = 0;

        loop {
            if filled >= buf.len() {
                return Err(OdbError::Corrupt {
                    oid: oid.to_hex(),
                    reason: "header exceeds 64 bytes".into(),
                });
            }
            let n = decoder
                .read(&mut buf[filled..])
                .map_err(|e| OdbError::Decompress {
                    oid: oid.to_hex(),
                    source: e,
                })?;
            if n == 0 {
                return Err(OdbError::Corrupt {
                    oid: oid.to_hex(),
                    reason: "unexpected EOF before header null terminator".into(),
                });
            }
            filled += n;
            if buf[..filled].contains(&0) {
                break;
            }
        }

        let (obj_type, content_size, _) = header::parse_header(&buf[..filled])?;
        Ok(Some((obj_type, content_size)))
    }

    /// Compress header + content into a temp file beside the final location.
    fn write_to_temp(&self, hdr: &[u8], content: &[u8]) -> Result<std::path::PathBuf, OdbError> {
        let tmp_path = self.objects_dir().join(format!(
            "tmp_obj_{}",
            std::process::id()
                ^ std::time::SystemTime::now()
                    .duration_since(std::time::UNIX_EPOCH)
                    .unwrap_or_default()
                    .subsec_nanos()
        ));

        let file = fs::File::create(&tmp_path)?;
        let mut encoder = ZlibEncoder::new(file, self.compression);
        encoder.write_all(hdr)?;
        encoder.write_all(content)?;
        encoder.finish()?;

        // Objects are immutable; 0444 matches C git.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&tmp_path, fs::Permissions::from_mode(0o444))?;
        }

        Ok(tmp_path)
    }
}

/// Atomically move a temp file to its final destination.
///
/// Losing the rename race to another writer is success: the content under a
/// given id is identical by construction.
fn finalize_object(tmp: &Path, final_path: &Path) -> Result<(), OdbError> {
    match fs::rename(tmp, final_path) {
        Ok(()) => Ok(()),
        Err(_) if final_path.exists() => {
            let _ = fs::remove_file(tmp);
            Ok(())
        }
        Err(e) => {
            let _ = fs::remove_file(tmp);
            Err(OdbError::Io(e))
        }
    }
}

/// Zlib-decompress the full contents of a loose object file.
fn decompress_all(compressed: &[u8], oid: &ObjectId) -> Result<Vec<u8>, OdbError> {
    let mut decoder = ZlibDecoder::new(compressed);
    let mut decompressed = Vec::new();
    decoder
        .read_to_end(&mut decompressed)
        .map_err(|e| OdbError::Decompress {
            oid: oid.to_hex(),
            source: e,
        })?;
    Ok(decompressed)
}
