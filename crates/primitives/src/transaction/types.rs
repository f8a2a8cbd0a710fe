use crate::range::{CharIdx, CharLen};

/// Owned replacement text.
pub type Tendril = String;

/// One edit requested against a document: `[start, end)` becomes
/// `replacement`, or is removed when `replacement` is `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
	pub start: CharIdx,
	pub end: CharIdx,
	pub replacement: Option<Tendril>,
}

impl Change {
	pub fn replace(start: CharIdx, end: CharIdx, text: impl Into<Tendril>) -> Self {
		Self {
			start,
			end,
			replacement: Some(text.into()),
		}
	}

	pub fn insert(pos: CharIdx, text: impl Into<Tendril>) -> Self {
		Self::replace(pos, pos, text)
	}

	pub fn delete(start: CharIdx, end: CharIdx) -> Self {
		Self {
			start,
			end,
			replacement: None,
		}
	}
}

/// One contiguous edit as stored in a [`ChangeSet`](super::ChangeSet):
/// pre-change range `from..to` replaced by `text`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeRef<'a> {
	pub from: CharIdx,
	pub to: CharIdx,
	pub text: &'a str,
}

/// Which side of an insertion a position sticks to when it sits exactly at
/// the insertion point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bias {
	/// Stay before the inserted text.
	Left,
	/// Move past the inserted text.
	Right,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum Operation {
	/// Keep the next N source characters.
	Retain(CharLen),
	/// Drop the next N source characters.
	Delete(CharLen),
	Insert(Tendril),
}

impl Operation {
	/// Characters this operation contributes to the output.
	pub(super) fn output_len(&self) -> CharLen {
		match self {
			Operation::Retain(n) => *n,
			Operation::Delete(_) => 0,
			Operation::Insert(text) => text.chars().count(),
		}
	}
}

/// Splits `text` after its first `n` characters.
pub(super) fn split_chars(text: &str, n: CharLen) -> (&str, &str) {
	let byte = text.char_indices().nth(n).map_or(text.len(), |(i, _)| i);
	text.split_at(byte)
}
