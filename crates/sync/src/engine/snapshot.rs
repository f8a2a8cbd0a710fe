use std::collections::BTreeMap;
use std::sync::Arc;

use quire_dom::{ObjectId, ObjectTree, ProcessingInstructionRecord};
use quire_primitives::CharIdx;
use rustc_hash::FxHashMap;

use crate::diagnostics::Diagnostic;
use crate::linker::LinkMap;

/// Where the engine is in its edit/resync cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncPhase {
	/// Nothing pending.
	#[default]
	Idle,
	/// An edit arrived; waiting for the debounce period to elapse.
	Debouncing,
	/// A resync pass is in flight.
	Resyncing,
}

/// Immutable view of the derived document state, published on every pass
/// that reaches a verdict.
///
/// `diagnostics` is non-empty whenever `is_well_formed` is false, except for
/// the neutral state of an empty document.
#[derive(Debug, Clone, Default)]
pub struct SyncSnapshot {
	pub is_well_formed: bool,
	pub diagnostics: Vec<Diagnostic>,
	/// Incremented on every successful sync, never on failure.
	pub sync_version: u64,
	pub object_tree: Option<Arc<ObjectTree>>,
	pub links: LinkMap,
	pub processing_instructions: Vec<ProcessingInstructionRecord>,
}

impl SyncSnapshot {
	pub(super) fn failed(sync_version: u64, diagnostics: Vec<Diagnostic>) -> Self {
		Self {
			is_well_formed: false,
			diagnostics,
			sync_version,
			..Self::default()
		}
	}

	pub fn object_tree(&self) -> Option<&ObjectTree> {
		self.object_tree.as_deref()
	}

	/// Parse-tree element offset to object-tree element.
	pub fn forward(&self) -> &BTreeMap<CharIdx, ObjectId> {
		self.links.forward()
	}

	/// Object-tree element to parse-tree element offset.
	pub fn backward(&self) -> &FxHashMap<ObjectId, CharIdx> {
		self.links.backward()
	}
}
