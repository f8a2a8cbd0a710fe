use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use quire_primitives::CharLen;
use quire_syntax::ParseTree;
use tokio::sync::Notify;

use crate::diagnostics::Severity;

use super::*;

#[derive(Default)]
struct FakeHost {
	text: Mutex<String>,
	/// Parse this instead of the buffer text, to force the trees apart.
	tree_text: Mutex<Option<String>>,
	/// Sleep out the whole wait and report a timeout.
	stall: AtomicBool,
	/// Block tree requests until `release` is notified.
	hold: AtomicBool,
	release: Notify,
	tree_requests: AtomicUsize,
}

impl FakeHost {
	fn new(text: &str) -> Arc<Self> {
		let host = Self::default();
		host.set_text(text);
		Arc::new(host)
	}

	fn set_text(&self, text: &str) {
		*self.text.lock().unwrap() = text.to_string();
	}

	fn tree_requests(&self) -> usize {
		self.tree_requests.load(Ordering::SeqCst)
	}
}

#[async_trait]
impl SyncHost for FakeHost {
	fn text(&self) -> String {
		self.text.lock().unwrap().clone()
	}

	async fn parse_tree(&self, len: CharLen, timeout: Duration) -> Option<ParseTree> {
		self.tree_requests.fetch_add(1, Ordering::SeqCst);
		if self.stall.load(Ordering::SeqCst) {
			tokio::time::sleep(timeout).await;
			return None;
		}
		if self.hold.load(Ordering::SeqCst) {
			self.release.notified().await;
		}
		let text = self.tree_text.lock().unwrap().clone().unwrap_or_else(|| self.text());
		let tree = ParseTree::parse(&text);
		(tree.len_chars() == len).then_some(tree)
	}
}

/// Lets the engine task drain everything that is ready without moving the
/// paused clock.
async fn settle() {
	for _ in 0..32 {
		tokio::task::yield_now().await;
	}
}

async fn advance_ms(ms: u64) {
	tokio::time::advance(Duration::from_millis(ms)).await;
	settle().await;
}

fn spawn(host: &Arc<FakeHost>) -> SyncHandle {
	SyncEngine::spawn(host.clone(), SyncConfig::default())
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn test_edit_resyncs_after_quiet_period() {
	let host = FakeHost::new("<a/>");
	let handle = spawn(&host);

	handle.on_edit();
	settle().await;
	assert_eq!(handle.phase(), SyncPhase::Debouncing);

	advance_ms(999).await;
	assert_eq!(handle.sync_version(), 0);
	assert_eq!(host.tree_requests(), 0);

	advance_ms(1).await;
	assert_eq!(handle.sync_version(), 1);
	assert!(handle.is_well_formed());
	assert_eq!(handle.phase(), SyncPhase::Idle);
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn test_each_edit_restarts_quiet_period() {
	let host = FakeHost::new("<a/>");
	let handle = spawn(&host);

	handle.on_edit();
	settle().await;
	advance_ms(999).await;
	handle.on_edit();
	settle().await;
	advance_ms(999).await;
	assert_eq!(handle.sync_version(), 0);

	advance_ms(1).await;
	assert_eq!(handle.sync_version(), 1);
	assert_eq!(host.tree_requests(), 1);
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn test_custom_debounce() {
	let host = FakeHost::new("<a/>");
	let config = SyncConfig {
		debounce_ms: 50,
		..SyncConfig::default()
	};
	let handle = SyncEngine::spawn(host.clone(), config);

	handle.on_edit();
	settle().await;
	advance_ms(49).await;
	assert_eq!(handle.sync_version(), 0);
	advance_ms(1).await;
	assert_eq!(handle.sync_version(), 1);
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn test_failure_publishes_diagnostics_without_bumping_version() {
	let host = FakeHost::new("<a/>");
	let handle = spawn(&host);
	handle.request_immediate_sync();
	settle().await;
	assert_eq!(handle.sync_version(), 1);

	host.set_text("<a><b></a>");
	handle.request_immediate_sync();
	settle().await;

	let snapshot = handle.snapshot();
	assert!(!snapshot.is_well_formed);
	assert_eq!(snapshot.sync_version, 1);
	assert!(snapshot.object_tree.is_none());
	assert!(snapshot.links.is_empty());
	assert!(!snapshot.diagnostics.is_empty());
	assert_eq!(snapshot.diagnostics[0].line, 1);
	assert_eq!(snapshot.diagnostics[0].severity, Severity::Error);
	assert_eq!(host.tree_requests(), 1);

	host.set_text("<a><b/></a>");
	handle.on_edit();
	settle().await;
	advance_ms(1000).await;

	let snapshot = handle.snapshot();
	assert!(snapshot.is_well_formed);
	assert!(snapshot.diagnostics.is_empty());
	assert_eq!(snapshot.sync_version, 2);
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn test_unchanged_text_is_not_reparsed() {
	let host = FakeHost::new("<a/>");
	let handle = spawn(&host);
	let mut updates = handle.subscribe();

	handle.request_immediate_sync();
	settle().await;
	assert!(updates.has_changed().unwrap());
	updates.mark_unchanged();

	handle.request_immediate_sync();
	settle().await;
	assert!(!updates.has_changed().unwrap());
	assert_eq!(host.tree_requests(), 1);
	assert_eq!(handle.sync_version(), 1);
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn test_empty_text_clears_state() {
	let host = FakeHost::new("<a/>");
	let handle = spawn(&host);
	handle.request_immediate_sync();
	settle().await;

	host.set_text("");
	handle.request_immediate_sync();
	settle().await;

	let snapshot = handle.snapshot();
	assert!(!snapshot.is_well_formed);
	assert!(snapshot.diagnostics.is_empty());
	assert!(snapshot.object_tree.is_none());
	assert!(snapshot.links.is_empty());
	assert!(snapshot.processing_instructions.is_empty());
	assert_eq!(snapshot.sync_version, 1);
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn test_tree_timeout_retries_without_publishing() {
	let host = FakeHost::new("<a/>");
	host.stall.store(true, Ordering::SeqCst);
	let handle = spawn(&host);
	let updates = handle.subscribe();

	handle.request_immediate_sync();
	settle().await;
	assert_eq!(handle.phase(), SyncPhase::Resyncing);

	advance_ms(1000).await;
	assert!(!updates.has_changed().unwrap());
	assert_eq!(handle.phase(), SyncPhase::Debouncing);
	assert_eq!(host.tree_requests(), 1);

	host.stall.store(false, Ordering::SeqCst);
	advance_ms(249).await;
	assert_eq!(host.tree_requests(), 1);
	advance_ms(1).await;
	assert_eq!(host.tree_requests(), 2);
	assert!(updates.has_changed().unwrap());
	assert_eq!(handle.sync_version(), 1);
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn test_requests_during_pass_are_dropped_but_edits_rearm() {
	let host = FakeHost::new("<a/>");
	host.hold.store(true, Ordering::SeqCst);
	let handle = spawn(&host);

	handle.request_immediate_sync();
	settle().await;
	assert_eq!(handle.phase(), SyncPhase::Resyncing);

	handle.on_edit();
	handle.request_immediate_sync();
	settle().await;
	assert_eq!(host.tree_requests(), 1);

	host.hold.store(false, Ordering::SeqCst);
	host.release.notify_one();
	settle().await;
	assert_eq!(handle.sync_version(), 1);
	assert_eq!(handle.phase(), SyncPhase::Debouncing);
	assert_eq!(host.tree_requests(), 1);

	advance_ms(1000).await;
	assert_eq!(handle.phase(), SyncPhase::Idle);
	assert_eq!(host.tree_requests(), 1);
	assert_eq!(handle.sync_version(), 1);
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn test_shutdown_abandons_pass_in_flight() {
	let host = FakeHost::new("<a/>");
	host.hold.store(true, Ordering::SeqCst);
	let handle = spawn(&host);
	let updates = handle.subscribe();

	handle.request_immediate_sync();
	settle().await;
	handle.shutdown();
	host.release.notify_one();
	settle().await;

	assert!(handle.is_shut_down());
	assert!(!updates.has_changed().unwrap_or(false));
	assert_eq!(handle.sync_version(), 0);
	handle.stopped().await;

	handle.on_edit();
	handle.request_immediate_sync();
	settle().await;
	assert_eq!(handle.sync_version(), 0);
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn test_links_and_processing_instructions() {
	let host = FakeHost::new("<?pi d?><r><c/></r>");
	let handle = spawn(&host);
	let mut updates = handle.subscribe();
	handle.request_immediate_sync();
	updates.changed().await.unwrap();

	let snapshot = updates.borrow_and_update().clone();
	let keys: Vec<_> = snapshot.forward().keys().copied().collect();
	assert_eq!(keys, vec![8, 11]);

	let objects = snapshot.object_tree().unwrap();
	let root = objects.document_element().unwrap();
	assert_eq!(snapshot.backward().get(&root), Some(&8));
	assert_eq!(snapshot.links.object_at(8), Some(root));

	assert_eq!(snapshot.processing_instructions.len(), 1);
	assert_eq!(snapshot.processing_instructions[0].target, "pi");
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn test_link_mismatch_still_syncs_without_links() {
	let host = FakeHost::new("<r><c/></r>");
	*host.tree_text.lock().unwrap() = Some("<r><x/></r>".to_string());
	let handle = spawn(&host);
	handle.request_immediate_sync();
	settle().await;

	let snapshot = handle.snapshot();
	assert!(snapshot.is_well_formed);
	assert_eq!(snapshot.sync_version, 1);
	assert!(snapshot.object_tree.is_some());
	assert!(snapshot.links.is_empty());
}
