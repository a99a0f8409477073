//! Typed object-id wrappers.
//!
//! A bare [`ObjectId`] says nothing about what it names. These newtypes tag
//! an id with the kind its holder has verified it to be; promotion from a
//! bare id happens through the object store, which checks the stored kind.

use std::fmt;

use grit_hash::ObjectId;

use crate::ObjectType;

macro_rules! typed_id {
    ($(#[$doc:meta])* $name:ident, $obj_type:expr) => {
        $(#[$doc])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(ObjectId);

        impl $name {
            /// Wrap an id the caller has already verified.
            ///
            /// Use the object store's promotion methods when the kind is
            /// not known from context.
            pub fn from_verified(oid: ObjectId) -> Self {
                Self(oid)
            }

            /// The underlying object id.
            pub fn as_oid(&self) -> ObjectId {
                self.0
            }

            /// The kind this id is verified to name.
            pub fn object_type() -> ObjectType {
                $obj_type
            }

            /// The 40-character lowercase hex representation.
            pub fn to_hex(&self) -> String {
                self.0.to_hex()
            }
        }

        impl From<$name> for ObjectId {
            fn from(id: $name) -> ObjectId {
                id.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), &self.0.to_hex()[..8])
            }
        }
    };
}

typed_id!(
    /// An id verified to name a commit.
    CommitId,
    ObjectType::Commit
);
typed_id!(
    /// An id verified to name a tree.
    TreeId,
    ObjectType::Tree
);
typed_id!(
    /// An id verified to name a blob.
    BlobId,
    ObjectType::Blob
);
typed_id!(
    /// An id verified to name a tag.
    TagId,
    ObjectType::Tag
);
