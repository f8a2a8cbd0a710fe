use std::mem;

use super::types::{Bias, Change, ChangeRef, Operation, Tendril, split_chars};
use crate::Rope;
use crate::range::{CharIdx, CharLen};

/// A batch of edits to a document of known length, stored as a run of
/// retain/delete/insert operations that covers the whole source.
///
/// Runs are kept canonical: no empty operations, no two adjacent operations
/// of the same kind, and an insertion always precedes a deletion at the same
/// point.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ChangeSet {
	ops: Vec<Operation>,
	len: CharLen,
	len_after: CharLen,
}

impl ChangeSet {
	/// Builds a changeset from sorted, non-overlapping changes against a
	/// document of `len` characters.
	///
	/// Changes that overlap a previous one are clamped to start after it.
	pub fn from_changes<I>(len: CharLen, changes: I) -> Self
	where
		I: IntoIterator<Item = Change>,
	{
		let mut cs = Self::default();
		let mut cursor = 0;
		for change in changes {
			let start = change.start.clamp(cursor, len);
			let end = change.end.clamp(start, len);
			cs.push(Operation::Retain(start - cursor));
			if let Some(text) = change.replacement {
				cs.push(Operation::Insert(text));
			}
			cs.push(Operation::Delete(end - start));
			cursor = end;
		}
		cs.push(Operation::Retain(len - cursor));
		cs
	}

	/// Length of the document this changeset applies to.
	pub fn len(&self) -> CharLen {
		self.len
	}

	/// Length of the document it produces.
	pub fn len_after(&self) -> CharLen {
		self.len_after
	}

	/// True when applying the changeset changes nothing.
	pub fn is_empty(&self) -> bool {
		self.ops.iter().all(|op| matches!(op, Operation::Retain(_)))
	}

	/// Iterates over contiguous edits in pre-change coordinates.
	pub fn iter_changes(&self) -> ChangeIter<'_> {
		ChangeIter { ops: &self.ops, pos: 0 }
	}

	fn push(&mut self, op: Operation) {
		match op {
			Operation::Retain(0) | Operation::Delete(0) => {}
			Operation::Insert(text) if text.is_empty() => {}
			Operation::Retain(n) => {
				self.len += n;
				self.len_after += n;
				match self.ops.last_mut() {
					Some(Operation::Retain(last)) => *last += n,
					_ => self.ops.push(Operation::Retain(n)),
				}
			}
			Operation::Delete(n) => {
				self.len += n;
				match self.ops.last_mut() {
					Some(Operation::Delete(last)) => *last += n,
					_ => self.ops.push(Operation::Delete(n)),
				}
			}
			Operation::Insert(text) => {
				self.len_after += text.chars().count();
				self.push_insert(text);
			}
		}
	}

	fn push_insert(&mut self, text: Tendril) {
		match self.ops.as_mut_slice() {
			[.., Operation::Insert(prev)] | [.., Operation::Insert(prev), Operation::Delete(_)] => {
				prev.push_str(&text);
			}
			[.., last @ Operation::Delete(_)] => {
				let delete = mem::replace(last, Operation::Insert(text));
				self.ops.push(delete);
			}
			_ => self.ops.push(Operation::Insert(text)),
		}
	}

	/// Applies the changeset to `doc` in place.
	pub fn apply(&self, doc: &mut Rope) {
		debug_assert_eq!(doc.len_chars(), self.len, "changeset applied to a document of the wrong length");

		let mut pos = 0;
		for op in &self.ops {
			match op {
				Operation::Retain(n) => pos += n,
				Operation::Delete(n) => doc.remove(pos..pos + n),
				Operation::Insert(text) => {
					doc.insert(pos, text);
					pos += text.chars().count();
				}
			}
		}
	}

	/// Maps a pre-change position into post-change coordinates. Positions
	/// inside a deleted range collapse to where the range was.
	pub fn map_pos(&self, pos: CharIdx, bias: Bias) -> CharIdx {
		let mut old = 0;
		let mut new = 0;
		for op in &self.ops {
			match op {
				Operation::Retain(n) => {
					if pos < old + n {
						return new + (pos - old);
					}
					old += n;
					new += n;
				}
				Operation::Delete(n) => {
					if pos < old + n {
						return new;
					}
					old += n;
				}
				Operation::Insert(text) => {
					if pos == old && bias == Bias::Left {
						return new;
					}
					new += text.chars().count();
				}
			}
		}
		new + pos.saturating_sub(old)
	}

	/// Composes `self` then `other` into one changeset over `self`'s source.
	///
	/// `other` is walked once; each of its retains and deletes consumes the
	/// matching stretch of `self`'s output.
	pub fn compose(self, other: ChangeSet) -> ChangeSet {
		debug_assert_eq!(self.len_after, other.len, "composed changesets disagree on length");

		let mut first = Pieces::new(self.ops);
		let mut out = ChangeSet::default();
		for op in other.ops {
			let (mut remaining, keep) = match op {
				Operation::Insert(text) => {
					out.push(Operation::Insert(text));
					continue;
				}
				Operation::Retain(n) => (n, true),
				Operation::Delete(n) => (n, false),
			};
			while remaining > 0 {
				let Some(piece) = first.take(remaining) else {
					break;
				};
				remaining -= piece.output_len();
				match piece {
					Operation::Delete(n) => out.push(Operation::Delete(n)),
					Operation::Retain(n) if keep => out.push(Operation::Retain(n)),
					Operation::Retain(n) => out.push(Operation::Delete(n)),
					// Inserted by `self`, deleted again by `other`.
					Operation::Insert(_) if !keep => {}
					insert => out.push(insert),
				}
			}
		}
		for rest in first.drain() {
			debug_assert!(matches!(rest, Operation::Delete(_)));
			out.push(rest);
		}
		out
	}
}

/// Hands out a changeset's operations cut to fit a requested output length.
struct Pieces {
	ops: std::vec::IntoIter<Operation>,
	head: Option<Operation>,
}

impl Pieces {
	fn new(ops: Vec<Operation>) -> Self {
		Self {
			ops: ops.into_iter(),
			head: None,
		}
	}

	/// The next operation producing at most `max` output characters.
	/// Deletions produce none and are returned whole.
	fn take(&mut self, max: CharLen) -> Option<Operation> {
		let op = self.head.take().or_else(|| self.ops.next())?;
		match op {
			Operation::Retain(n) if n > max => {
				self.head = Some(Operation::Retain(n - max));
				Some(Operation::Retain(max))
			}
			Operation::Insert(text) if text.chars().count() > max => {
				let (now, later) = split_chars(&text, max);
				self.head = Some(Operation::Insert(later.to_owned()));
				Some(Operation::Insert(now.to_owned()))
			}
			op => Some(op),
		}
	}

	fn drain(self) -> impl Iterator<Item = Operation> {
		self.head.into_iter().chain(self.ops)
	}
}

/// Iterator over the contiguous edits of a [`ChangeSet`]. An insertion
/// directly followed by a deletion is reported as one replacement.
pub struct ChangeIter<'a> {
	ops: &'a [Operation],
	pos: CharIdx,
}

impl<'a> Iterator for ChangeIter<'a> {
	type Item = ChangeRef<'a>;

	fn next(&mut self) -> Option<Self::Item> {
		loop {
			let (op, rest) = self.ops.split_first()?;
			self.ops = rest;
			let from = self.pos;
			match op {
				Operation::Retain(n) => self.pos += n,
				Operation::Delete(n) => {
					self.pos += n;
					return Some(ChangeRef {
						from,
						to: self.pos,
						text: "",
					});
				}
				Operation::Insert(text) => {
					if let [Operation::Delete(n), rest @ ..] = self.ops {
						self.pos += n;
						self.ops = rest;
					}
					return Some(ChangeRef {
						from,
						to: self.pos,
						text,
					});
				}
			}
		}
	}
}
