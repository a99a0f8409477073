//! Object identity for grit.
//!
//! Provides the 20-byte `ObjectId`, hex encoding/decoding, and the streaming
//! `Hasher` that computes object IDs with the `"<kind> <len>\0"` framing.

mod error;
pub mod hasher;
pub mod hex;
mod oid;

pub use error::HashError;
pub use hasher::Hasher;
pub use oid::ObjectId;
