//! Document: the text, its live parse tree, and the commit pipeline.
//!
//! # Commit pipeline
//!
//! 1. Each filter inspects the batch so far against the pre-edit tree and may
//!    return a companion, which is composed onto the batch.
//! 2. If anything was composed, the filters run once more on the final batch.
//!    Synthesized companions carry a sentinel flag, so a well-behaved filter
//!    declines; anything it returns now is logged and dropped.
//! 3. The batch is applied, the text reparsed and the new tree published.
//! 4. The attached engine, if any, is told about the edit.

mod host;

#[cfg(test)]
mod tests;

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use quire_primitives::{CharIdx, Rope, Transaction};
use quire_syntax::ParseTree;
use quire_sync::{EditFilter, SyncConfig, SyncEngine, SyncHandle, TagMirror};
use tokio::sync::watch;
use tracing::{debug, trace, warn};

pub use self::host::DocumentHost;
use crate::error::{EditError, Result};

static NEXT_DOCUMENT_ID: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DocumentId(pub u64);

impl DocumentId {
	pub fn next() -> Self {
		Self(NEXT_DOCUMENT_ID.fetch_add(1, Ordering::Relaxed))
	}
}

/// State the sync engine reads concurrently with edits.
struct Shared {
	content: RwLock<Rope>,
	tree: watch::Sender<ParseTree>,
}

/// Outcome of a successful commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommitResult {
	pub version_before: u64,
	pub version_after: u64,
	/// A filter contributed a companion to the batch.
	pub filtered: bool,
}

pub struct Document {
	id: DocumentId,
	shared: Arc<Shared>,
	filters: Vec<Box<dyn EditFilter>>,
	engine: Option<SyncHandle>,
	/// Incremented on every commit.
	version: u64,
}

impl Document {
	/// Creates a document with no edit filters installed.
	pub fn new(content: &str) -> Self {
		let rope = Rope::from(content);
		let (tree, _) = watch::channel(ParseTree::from_rope(&rope));
		Self {
			id: DocumentId::next(),
			shared: Arc::new(Shared {
				content: RwLock::new(rope),
				tree,
			}),
			filters: Vec::new(),
			engine: None,
			version: 0,
		}
	}

	/// Creates a document with the filters `config` enables.
	pub fn with_config(content: &str, config: &SyncConfig) -> Self {
		let mut doc = Self::new(content);
		if config.mirror_tags {
			doc.add_filter(TagMirror::new());
		}
		doc
	}

	/// Appends a filter. Filters run in installation order.
	pub fn add_filter(&mut self, filter: impl EditFilter + 'static) {
		debug!(doc = self.id.0, filter = filter.name(), "editor.filter.install");
		self.filters.push(Box::new(filter));
	}

	pub fn id(&self) -> DocumentId {
		self.id
	}

	pub fn version(&self) -> u64 {
		self.version
	}

	/// A snapshot of the text. Ropes share structure, so this is cheap.
	pub fn content(&self) -> Rope {
		self.shared.content.read().clone()
	}

	pub fn text(&self) -> String {
		self.shared.content.read().to_string()
	}

	pub fn len_chars(&self) -> usize {
		self.shared.content.read().len_chars()
	}

	/// The parse tree of the current text.
	pub fn parse_tree(&self) -> ParseTree {
		self.shared.tree.borrow().clone()
	}

	/// Inserts `text` at `pos`.
	pub fn insert(&mut self, pos: CharIdx, text: &str) -> Result<CommitResult> {
		self.replace(pos, pos, text)
	}

	/// Replaces `[from, to)` with `text`.
	pub fn replace(&mut self, from: CharIdx, to: CharIdx, text: &str) -> Result<CommitResult> {
		let content = self.content();
		let len = content.len_chars();
		if from > to || to > len {
			return Err(EditError::OutOfBounds { from, to, len });
		}
		self.commit(Transaction::replace(content.slice(..), from, to, text))
	}

	/// Runs the filters over `tx`, then applies the batch atomically.
	pub fn commit(&mut self, tx: Transaction) -> Result<CommitResult> {
		let tree = self.parse_tree();
		let actual = tree.len_chars();
		if tx.changes().len() != actual {
			return Err(EditError::LengthMismatch {
				expected: tx.changes().len(),
				actual,
			});
		}

		let (batch, filtered) = self.run_filters(&tree, tx);

		let next = {
			let mut content = self.shared.content.write();
			batch.apply(&mut content);
			ParseTree::from_rope(&content)
		};
		let len = next.len_chars();
		self.shared.tree.send_replace(next);

		let version_before = self.version;
		self.version += 1;
		debug!(doc = self.id.0, version = self.version, len, filtered, "editor.commit");

		if let Some(engine) = &self.engine {
			engine.on_edit();
		}
		Ok(CommitResult {
			version_before,
			version_after: self.version,
			filtered,
		})
	}

	fn run_filters(&self, tree: &ParseTree, tx: Transaction) -> (Transaction, bool) {
		let mut batch = tx;
		let mut filtered = false;
		for filter in &self.filters {
			if let Some(companion) = filter.filter(tree, &batch) {
				trace!(filter = filter.name(), "editor.filter.companion");
				batch = batch.compose(companion);
				filtered = true;
			}
		}

		if filtered {
			for filter in &self.filters {
				if filter.filter(tree, &batch).is_some() {
					warn!(filter = filter.name(), "editor.filter.reentrant");
				}
			}
		}
		(batch, filtered)
	}

	/// Starts a sync engine over this document and requests an initial
	/// sync. Any previously attached engine is shut down first.
	pub fn attach(&mut self, config: SyncConfig) -> SyncHandle {
		self.detach();
		let handle = SyncEngine::spawn(Arc::new(self.host()), config);
		handle.request_immediate_sync();
		self.engine = Some(handle.clone());
		handle
	}

	pub fn engine(&self) -> Option<&SyncHandle> {
		self.engine.as_ref()
	}

	/// Shuts down the attached engine, if any.
	pub fn detach(&mut self) {
		if let Some(engine) = self.engine.take() {
			engine.shutdown();
		}
	}

	/// The read side handed to a sync engine.
	pub fn host(&self) -> DocumentHost {
		DocumentHost::new(self.shared.clone())
	}
}

impl Drop for Document {
	fn drop(&mut self) {
		self.detach();
	}
}

impl std::fmt::Debug for Document {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Document")
			.field("id", &self.id)
			.field("version", &self.version)
			.field("filters", &self.filters.iter().map(|filter| filter.name()).collect::<Vec<_>>())
			.field("attached", &self.engine.is_some())
			.finish()
	}
}
