use quire_primitives::{CharIdx, CharLen};
use thiserror::Error;

/// Errors from committing an edit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
	#[error("transaction expects a document of {expected} chars, found {actual}")]
	LengthMismatch { expected: CharLen, actual: CharLen },
	#[error("range {from}..{to} is outside a document of {len} chars")]
	OutOfBounds { from: CharIdx, to: CharIdx, len: CharLen },
}

pub type Result<T> = std::result::Result<T, EditError>;
