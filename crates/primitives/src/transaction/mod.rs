//! Change sets and the transactions that carry them through the commit pipeline.

mod changeset;
mod types;


pub use changeset::{ChangeIter, ChangeSet};
pub use types::{Bias, Change, ChangeRef, Tendril};

use crate::range::CharIdx;
use crate::{Rope, RopeSlice};

bitflags::bitflags! {
	/// Markers carried by a transaction through the commit pipeline.
	#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
	pub struct TxFlags: u8 {
		/// Synthesized by the tag mirror. Edit filters skip transactions
		/// carrying this flag so a recomposed batch is never mirrored twice.
		const TAG_MIRROR = 1 << 0;
	}
}

/// One atomic batch of changes plus its pipeline markers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transaction {
	changes: ChangeSet,
	flags: TxFlags,
}

impl Transaction {
	/// Creates a transaction from sorted, non-overlapping changes against `doc`.
	pub fn change<I>(doc: RopeSlice, changes: I) -> Self
	where
		I: IntoIterator<Item = Change>,
	{
		Self::from(ChangeSet::from_changes(doc.len_chars(), changes))
	}

	/// Inserts `text` at `pos`.
	pub fn insert(doc: RopeSlice, pos: CharIdx, text: impl Into<Tendril>) -> Self {
		Self::change(doc, [Change::insert(pos, text)])
	}

	/// Replaces `[from, to)` with `text`.
	pub fn replace(doc: RopeSlice, from: CharIdx, to: CharIdx, text: impl Into<Tendril>) -> Self {
		Self::change(doc, [Change::replace(from, to, text)])
	}

	/// Deletes `[from, to)`.
	pub fn delete(doc: RopeSlice, from: CharIdx, to: CharIdx) -> Self {
		Self::change(doc, [Change::delete(from, to)])
	}

	/// Returns the underlying changeset.
	pub fn changes(&self) -> &ChangeSet {
		&self.changes
	}

	/// Returns the pipeline markers.
	pub fn flags(&self) -> TxFlags {
		self.flags
	}

	/// Returns true if all of `flags` are set.
	pub fn has_flags(&self, flags: TxFlags) -> bool {
		self.flags.contains(flags)
	}

	/// Adds pipeline markers.
	#[must_use]
	pub fn with_flags(mut self, flags: TxFlags) -> Self {
		self.flags |= flags;
		self
	}

	/// Applies the transaction to `doc`.
	pub fn apply(&self, doc: &mut Rope) {
		self.changes.apply(doc);
	}

	/// Maps a pre-change position into post-change coordinates.
	pub fn map_pos(&self, pos: CharIdx, bias: Bias) -> CharIdx {
		self.changes.map_pos(pos, bias)
	}

	/// Composes `self` then `other` into one transaction. Markers are unioned.
	pub fn compose(self, other: Transaction) -> Self {
		Self {
			changes: self.changes.compose(other.changes),
			flags: self.flags | other.flags,
		}
	}
}

impl From<ChangeSet> for Transaction {
	fn from(changes: ChangeSet) -> Self {
		Self {
			changes,
			flags: TxFlags::empty(),
		}
	}
}
