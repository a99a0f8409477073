//! The object store: loose, zlib-compressed, content-addressed objects.
//!
//! Each object lives at `objects/xx/yyyy...` where `xx` is the first hex
//! byte of its id. The file content is zlib-compressed
//! `"<kind> <size>\0<payload>"`. Objects are immutable; writing existing
//! content is a success that reports `already_existed`.

mod loose;

use std::path::{Path, PathBuf};

use grit_hash::{HashError, ObjectId};
use grit_object::{BlobId, CommitId, Object, ObjectError, ObjectType, TagId, TreeId};

/// Errors from object store operations.
#[derive(Debug, thiserror::Error)]
pub enum OdbError {
    #[error("object not found: {0}")]
    NotFound(ObjectId),

    #[error("object {oid} is a {actual}, not a {expected}")]
    TypeMismatch {
        oid: ObjectId,
        expected: ObjectType,
        actual: ObjectType,
    },

    #[error("corrupt object {oid}: {reason}")]
    Corrupt { oid: String, reason: String },

    #[error("decompression error for {oid}: {source}")]
    Decompress {
        oid: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Object(#[from] ObjectError),

    #[error(transparent)]
    Hash(#[from] HashError),
}

/// Interface to the object directory.
pub struct ObjectStore {
    objects_dir: PathBuf,
    compression: flate2::Compression,
}

impl ObjectStore {
    /// Open the object store at the given objects directory.
    pub fn open(objects_dir: impl AsRef<Path>) -> Self {
        Self {
            objects_dir: objects_dir.as_ref().to_path_buf(),
            compression: flate2::Compression::default(),
        }
    }

    /// The objects directory path.
    pub fn objects_dir(&self) -> &Path {
        &self.objects_dir
    }

    /// The file path for a given object id.
    pub fn object_path(&self, oid: &ObjectId) -> PathBuf {
        self.objects_dir.join(oid.loose_path())
    }

    /// The stored kind of an object, or `None` when absent.
    pub fn type_of(&self, oid: &ObjectId) -> Result<Option<ObjectType>, OdbError> {
        Ok(self.read_header(oid)?.map(|(obj_type, _)| obj_type))
    }

    /// Promote to a commit id, verifying the stored kind.
    pub fn commit_id(&self, oid: &ObjectId) -> Result<CommitId, OdbError> {
        self.verify_type(oid, ObjectType::Commit)?;
        Ok(CommitId::from_verified(*oid))
    }

    /// Promote to a tree id, verifying the stored kind.
    pub fn tree_id(&self, oid: &ObjectId) -> Result<TreeId, OdbError> {
        self.verify_type(oid, ObjectType::Tree)?;
        Ok(TreeId::from_verified(*oid))
    }

    /// Promote to a blob id, verifying the stored kind.
    pub fn blob_id(&self, oid: &ObjectId) -> Result<BlobId, OdbError> {
        self.verify_type(oid, ObjectType::Blob)?;
        Ok(BlobId::from_verified(*oid))
    }

    /// Promote to a tag id, verifying the stored kind.
    pub fn tag_id(&self, oid: &ObjectId) -> Result<TagId, OdbError> {
        self.verify_type(oid, ObjectType::Tag)?;
        Ok(TagId::from_verified(*oid))
    }

    /// Dereference a tag chain to the commit it ultimately names.
    ///
    /// Returns `None` when `oid` is not a tag, or when the chain ends at
    /// something other than a commit.
    pub fn peel_tag(&self, oid: &ObjectId) -> Result<Option<CommitId>, OdbError> {
        let mut current = *oid;
        let mut peeled_any = false;
        loop {
            match self.read(&current)? {
                Some(Object::Tag(tag)) => {
                    current = tag.target;
                    peeled_any = true;
                }
                Some(Object::Commit(_)) if peeled_any => {
                    return Ok(Some(CommitId::from_verified(current)));
                }
                _ => return Ok(None),
            }
        }
    }

    fn verify_type(&self, oid: &ObjectId, expected: ObjectType) -> Result<(), OdbError> {
        match self.type_of(oid)? {
            Some(actual) if actual == expected => Ok(()),
            Some(actual) => Err(OdbError::TypeMismatch {
                oid: *oid,
                expected,
                actual,
            }),
            None => Err(OdbError::NotFound(*oid)),
        }
    }
}
