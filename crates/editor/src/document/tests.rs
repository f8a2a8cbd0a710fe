use std::sync::atomic::AtomicUsize;

use pretty_assertions::assert_eq;

use super::*;

/// Counts calls and never contributes a companion.
#[derive(Clone, Default)]
struct Counting(Arc<AtomicUsize>);

impl EditFilter for Counting {
	fn name(&self) -> &'static str {
		"counting"
	}

	fn filter(&self, _tree: &ParseTree, _tx: &Transaction) -> Option<Transaction> {
		self.0.fetch_add(1, Ordering::SeqCst);
		None
	}
}

/// Appends a comment after every batch, even its own.
struct Stubborn;

impl EditFilter for Stubborn {
	fn name(&self) -> &'static str {
		"stubborn"
	}

	fn filter(&self, tree: &ParseTree, tx: &Transaction) -> Option<Transaction> {
		let mut after = tree.text().clone();
		tx.apply(&mut after);
		let end = after.len_chars();
		Some(Transaction::insert(after.slice(..), end, "<!---->"))
	}
}

#[test]
fn ids_are_unique() {
	assert_ne!(Document::new("").id(), Document::new("").id());
}

#[test]
fn commit_increments_version_once() {
	let mut doc = Document::new("<a/>");
	let result = doc.insert(2, "b").unwrap();
	assert_eq!(
		result,
		CommitResult {
			version_before: 0,
			version_after: 1,
			filtered: false,
		}
	);
	assert_eq!(doc.text(), "<ab/>");
	assert_eq!(doc.version(), 1);
}

#[test]
fn commit_reparses() {
	let mut doc = Document::new("<a>x</a>");
	doc.replace(3, 4, "<b/>").unwrap();
	let tree = doc.parse_tree();
	assert_eq!(tree.len_chars(), doc.len_chars());
	let root = tree.first_element().unwrap();
	assert_eq!(root.child_elements().count(), 1);
}

#[test]
fn commit_rejects_transaction_for_other_text() {
	let mut doc = Document::new("<a/>");
	let other = Rope::from("<longer/>");
	let tx = Transaction::insert(other.slice(..), 0, "x");
	assert_eq!(
		doc.commit(tx),
		Err(EditError::LengthMismatch {
			expected: 9,
			actual: 4,
		})
	);
	assert_eq!(doc.text(), "<a/>");
	assert_eq!(doc.version(), 0);
}

#[test]
fn replace_rejects_out_of_bounds() {
	let mut doc = Document::new("<a/>");
	assert_eq!(
		doc.replace(2, 9, "x"),
		Err(EditError::OutOfBounds { from: 2, to: 9, len: 4 })
	);
	assert!(doc.replace(3, 2, "x").is_err());
}

#[test]
fn mirror_installed_by_config() {
	let mut doc = Document::with_config("<tag>text</tag>", &SyncConfig::default());
	let result = doc.insert(4, "x").unwrap();
	assert!(result.filtered);
	assert_eq!(doc.text(), "<tagx>text</tagx>");
}

#[test]
fn mirror_disabled_by_config() {
	let config = SyncConfig {
		mirror_tags: false,
		..SyncConfig::default()
	};
	let mut doc = Document::with_config("<tag>text</tag>", &config);
	let result = doc.insert(4, "x").unwrap();
	assert!(!result.filtered);
	assert_eq!(doc.text(), "<tagx>text</tag>");
}

#[test]
fn filters_rerun_only_after_a_companion() {
	let calls = Counting::default();
	let mut doc = Document::with_config("<tag>text</tag>", &SyncConfig::default());
	doc.add_filter(calls.clone());

	doc.insert(6, "y").unwrap();
	assert_eq!(calls.0.load(Ordering::SeqCst), 1);

	doc.insert(4, "x").unwrap();
	assert_eq!(calls.0.load(Ordering::SeqCst), 3);
	assert_eq!(doc.text(), "<tagx>tyext</tagx>");
}

#[test]
fn reentrant_companion_is_dropped() {
	let mut doc = Document::new("<a/>");
	doc.add_filter(Stubborn);
	doc.insert(4, " ").unwrap();
	assert_eq!(doc.text(), "<a/> <!---->");
}
