//! Strict XML object tree.
//!
//! [`parse`] runs a specification-compliant parser over the whole text and
//! either returns an owned [`ObjectTree`] whose nodes know their character
//! ranges, or fails with a [`RawParseError`]. There is no recovery here; the
//! fault-tolerant view lives in `quire-syntax`.

mod error;
mod parse;
mod tree;


pub use error::RawParseError;
pub use parse::parse;
pub use tree::{ObjectAttribute, ObjectId, ObjectKind, ObjectNode, ObjectTree, ProcessingInstructionRecord};
