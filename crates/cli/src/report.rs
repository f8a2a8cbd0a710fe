//! Running one file through the engine and printing what it publishes.

use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, bail};
use quire_dom::ObjectTree;
use quire_editor::Document;
use quire_primitives::LineIndex;
use quire_sync::{SyncConfig, SyncSnapshot};
use tracing::debug;

/// Attaches an engine to `text` and waits for its first verdict.
pub async fn sync_text(text: &str, config: &SyncConfig) -> anyhow::Result<Arc<SyncSnapshot>> {
	let mut doc = Document::new(text);
	let engine = doc.attach(*config);
	let mut updates = engine.subscribe();

	// The first pass can time out waiting for the tree and be retried.
	let limit = (config.tree_wait() + config.retry()) * 4;
	tokio::time::timeout(limit, updates.changed())
		.await
		.context("sync did not finish in time")?
		.context("sync engine stopped")?;

	let snapshot = updates.borrow_and_update().clone();
	doc.detach();
	Ok(snapshot)
}

pub async fn sync_file(path: &Path, config: &SyncConfig) -> anyhow::Result<(String, Arc<SyncSnapshot>)> {
	let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
	let snapshot = sync_text(&text, config).await?;
	debug!(
		path = %path.display(),
		well_formed = snapshot.is_well_formed,
		diagnostics = snapshot.diagnostics.len(),
		"cli.synced"
	);
	Ok((text, snapshot))
}

/// Writes `file:line:col: severity: message` lines. Returns false when the
/// document is not well formed.
pub fn write_diagnostics(out: &mut impl Write, path: &Path, snapshot: &SyncSnapshot) -> io::Result<bool> {
	if snapshot.is_well_formed {
		return Ok(true);
	}
	if snapshot.diagnostics.is_empty() {
		writeln!(out, "{}:1:1: error: document is empty", path.display())?;
	}
	for diagnostic in &snapshot.diagnostics {
		writeln!(
			out,
			"{}:{}:{}: {}: {}",
			path.display(),
			diagnostic.line,
			diagnostic.column,
			diagnostic.severity,
			diagnostic.message
		)?;
	}
	Ok(false)
}

/// Writes one line per linked element, then one per processing instruction.
pub fn write_links(out: &mut impl Write, text: &str, snapshot: &SyncSnapshot) -> anyhow::Result<()> {
	let Some(objects) = snapshot.object_tree() else {
		bail!("document is not well formed");
	};
	let index = LineIndex::new(text);
	for (offset, id) in snapshot.links.iter() {
		let (line, column) = index.position(offset);
		writeln!(out, "{line}:{column}\t{offset}\t#{}\t{}", id.index(), element_name(objects, id))?;
	}
	for pi in &snapshot.processing_instructions {
		let (line, column) = index.position(pi.position);
		writeln!(out, "{line}:{column}\t{}\tpi\t{}", pi.position, pi.full_text)?;
	}
	Ok(())
}

fn element_name(objects: &ObjectTree, id: quire_dom::ObjectId) -> &str {
	objects.get(id).and_then(|node| node.name()).unwrap_or("?")
}
