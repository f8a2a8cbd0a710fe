//! Edit → mirror → resync through a real document and engine.

use std::time::Duration;

use pretty_assertions::assert_eq;
use quire_editor::Document;
use quire_sync::{SyncConfig, SyncHost, SyncPhase};

async fn settle() {
	for _ in 0..32 {
		tokio::task::yield_now().await;
	}
}

async fn advance_ms(ms: u64) {
	tokio::time::advance(Duration::from_millis(ms)).await;
	settle().await;
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn attach_syncs_immediately() {
	let mut doc = Document::with_config("<a><b/><c/></a>", &SyncConfig::default());
	let engine = doc.attach(SyncConfig::default());
	settle().await;

	let snapshot = engine.snapshot();
	assert!(snapshot.is_well_formed);
	assert_eq!(snapshot.sync_version, 1);
	let keys: Vec<_> = snapshot.forward().keys().copied().collect();
	assert_eq!(keys, vec![0, 3, 7]);
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn malformed_then_repaired() {
	let mut doc = Document::with_config("<a><b/></a>", &SyncConfig::default());
	let engine = doc.attach(SyncConfig::default());
	settle().await;
	assert_eq!(engine.sync_version(), 1);

	doc.insert(3, "<c>").unwrap();
	assert_eq!(doc.text(), "<a><c><b/></a>");
	settle().await;
	assert_eq!(engine.phase(), SyncPhase::Debouncing);
	advance_ms(1000).await;

	let snapshot = engine.snapshot();
	assert!(!snapshot.is_well_formed);
	assert!(!snapshot.diagnostics.is_empty());
	assert_eq!(snapshot.sync_version, 1);

	doc.insert(10, "</c>").unwrap();
	assert_eq!(doc.text(), "<a><c><b/></c></a>");
	settle().await;
	advance_ms(1000).await;

	let snapshot = engine.snapshot();
	assert!(snapshot.is_well_formed);
	assert_eq!(snapshot.sync_version, 2);
	assert_eq!(snapshot.links.len(), 3);
	assert_eq!(engine.phase(), SyncPhase::Idle);
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn mirrored_rename_resyncs_once() {
	let mut doc = Document::with_config("<outer><inner>text</inner></outer>", &SyncConfig::default());
	let engine = doc.attach(SyncConfig::default());
	settle().await;

	doc.replace(8, 13, "span").unwrap();
	assert_eq!(doc.text(), "<outer><span>text</span></outer>");
	settle().await;
	advance_ms(1000).await;

	let snapshot = engine.snapshot();
	assert_eq!(snapshot.sync_version, 2);
	let objects = snapshot.object_tree().unwrap();
	let names: Vec<_> = objects
		.elements()
		.filter_map(|id| objects[id].name())
		.collect();
	assert_eq!(names, vec!["outer", "span"]);
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn rapid_edits_coalesce() {
	let mut doc = Document::with_config("<a/>", &SyncConfig::default());
	let engine = doc.attach(SyncConfig::default());
	settle().await;

	for offset in 0..5 {
		doc.insert(2 + offset, "x").unwrap();
		settle().await;
		advance_ms(500).await;
	}
	assert_eq!(doc.text(), "<axxxxx/>");
	assert_eq!(engine.sync_version(), 1);

	advance_ms(500).await;
	assert_eq!(engine.sync_version(), 2);
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn host_waits_for_matching_tree() {
	let doc = Document::new("<a/>");
	let host = doc.host();
	assert_eq!(host.text(), "<a/>");

	let tree = host.parse_tree(4, Duration::from_millis(100)).await.unwrap();
	assert_eq!(tree.len_chars(), 4);

	assert!(host.parse_tree(5, Duration::from_millis(100)).await.is_none());
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn detach_stops_engine() {
	let mut doc = Document::new("<a/>");
	let engine = doc.attach(SyncConfig::default());
	settle().await;

	doc.detach();
	assert!(doc.engine().is_none());
	engine.stopped().await;
	assert!(engine.is_shut_down());

	doc.insert(2, "b").unwrap();
	advance_ms(1000).await;
	assert_eq!(engine.sync_version(), 1);
}
