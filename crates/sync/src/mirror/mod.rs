//! Paired tag renaming at edit time.
//!
//! When an edit changes the name in a start tag, the matching end tag gets the
//! same name (and vice versa) through a companion transaction committed with
//! the edit. The mirror runs synchronously against the pre-edit parse tree,
//! which is stale the moment the edit lands, and never suspends.
//!
//! Every uncertain case resolves to [`MirrorOutcome::Unchanged`]: a missed
//! mirror is harmless, a wrong one corrupts the document.

use quire_primitives::{Bias, Change, Transaction, TxFlags};
use quire_syntax::{ParseTree, SyntaxToken, enclosing_tag};
use tracing::{debug, trace};

use crate::EditFilter;

/// Result of inspecting one transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MirrorOutcome {
	/// Commit the transaction as is.
	Unchanged,
	/// Commit the transaction followed by this companion, which applies to the
	/// text the original produces and carries [`TxFlags::TAG_MIRROR`].
	Companion(Transaction),
}

impl MirrorOutcome {
	pub fn into_companion(self) -> Option<Transaction> {
		match self {
			MirrorOutcome::Unchanged => None,
			MirrorOutcome::Companion(tx) => Some(tx),
		}
	}
}

/// Keeps start and end tag names identical as either is edited.
#[derive(Debug, Clone, Copy, Default)]
pub struct TagMirror;

impl TagMirror {
	pub fn new() -> Self {
		Self
	}

	/// Inspects `tx` against `tree`, the parse of the text `tx` applies to.
	pub fn mirror(&self, tree: &ParseTree, tx: &Transaction) -> MirrorOutcome {
		if tx.has_flags(TxFlags::TAG_MIRROR) {
			trace!("mirror.skip.sentinel");
			return MirrorOutcome::Unchanged;
		}
		if tx.changes().len() != tree.len_chars() {
			debug!(
				tx_len = tx.changes().len(),
				tree_len = tree.len_chars(),
				"mirror.skip.stale_tree"
			);
			return MirrorOutcome::Unchanged;
		}

		let mut after = tree.text().clone();
		tx.apply(&mut after);

		let mut companions: Vec<Change> = Vec::new();
		for change in tx.changes().iter_changes() {
			let Some(edited) = tree.tag_name_token(change.from) else {
				continue;
			};
			let range = tree.token_range(&edited);
			if change.from < range.start || change.to > range.end {
				trace!(from = change.from, to = change.to, "mirror.skip.spans_markup");
				continue;
			}
			let Some(counterpart) = counterpart_of(&edited) else {
				continue;
			};

			let start = tx.map_pos(range.start, Bias::Left);
			let end = tx.map_pos(range.end, Bias::Right).max(start);
			let candidate = after.slice(start..end).to_string();
			if !is_plain_name(&candidate) {
				trace!(candidate, "mirror.skip.unsafe_name");
				continue;
			}

			let range = tree.token_range(&counterpart);
			let target_start = tx.map_pos(range.start, Bias::Left);
			let target_end = tx.map_pos(range.end, Bias::Right).max(target_start);
			if after.slice(target_start..target_end) == candidate.as_str() {
				continue;
			}
			if companions.iter().any(|c| c.start == target_start) {
				continue;
			}
			companions.push(Change::replace(target_start, target_end, candidate));
		}

		if companions.is_empty() {
			return MirrorOutcome::Unchanged;
		}
		companions.sort_by_key(|change| change.start);
		debug!(count = companions.len(), "mirror.companion");
		MirrorOutcome::Companion(Transaction::change(after.slice(..), companions).with_flags(TxFlags::TAG_MIRROR))
	}
}

impl EditFilter for TagMirror {
	fn name(&self) -> &'static str {
		"tag_mirror"
	}

	fn filter(&self, tree: &ParseTree, tx: &Transaction) -> Option<Transaction> {
		self.mirror(tree, tx).into_companion()
	}
}

/// The tag-name token paired with `token`, found among the direct children
/// of the shared element. Empty tags have none.
///
/// Both tags must be terminated, and no child of the element may have been
/// closed implicitly: an end tag that closed unfinished children may belong
/// to one of them once the edit lands.
fn counterpart_of(token: &SyntaxToken) -> Option<SyntaxToken> {
	let tag = enclosing_tag(token)?;
	if !tag.is_terminated() {
		trace!("mirror.skip.unterminated");
		return None;
	}
	let opposite = tag.kind().counterpart()?;
	let element = tag.element()?;
	if element.child_elements().any(|child| !child.is_closed()) {
		trace!("mirror.skip.implicit_close");
		return None;
	}
	let other = element.tag(opposite)?;
	if !other.is_terminated() {
		trace!("mirror.skip.unterminated");
		return None;
	}
	other.name_token()
}

/// Rejects names that an edit spilling into surrounding markup would produce.
fn is_plain_name(candidate: &str) -> bool {
	!candidate.trim().is_empty()
		&& !candidate.contains(['<', '>', '/'])
		&& !candidate.contains(char::is_whitespace)
}
