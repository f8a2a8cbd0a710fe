//! One resync pass, free of engine state so it can be raced and abandoned.

use std::sync::Arc;
use std::time::Duration;

use quire_dom::{ObjectTree, ProcessingInstructionRecord};
use quire_primitives::LineIndex;
use quire_syntax::ParseTree;
use tracing::{error, warn};

use crate::diagnostics::{Diagnostic, normalize};
use crate::host::SyncHost;
use crate::linker::{LinkError, LinkMap, link};

pub(super) enum Outcome {
	/// The text is the one the previous verdict was reached on.
	Unchanged,
	/// The parse tree did not cover the text in time.
	TreeTimeout,
	Failed {
		text: String,
		diagnostics: Vec<Diagnostic>,
	},
	Synced {
		text: String,
		objects: ObjectTree,
		links: LinkMap,
		processing_instructions: Vec<ProcessingInstructionRecord>,
	},
}

pub(super) async fn run<H: SyncHost>(host: Arc<H>, last_text: Option<Arc<str>>, tree_wait: Duration) -> Outcome {
	let text = host.text();
	if last_text.as_deref() == Some(text.as_str()) {
		return Outcome::Unchanged;
	}
	if text.is_empty() {
		return Outcome::Failed {
			text,
			diagnostics: Vec::new(),
		};
	}

	let objects = match quire_dom::parse(&text) {
		Ok(objects) => objects,
		Err(raw) => {
			let diagnostics = normalize(&raw, &LineIndex::new(&text));
			return Outcome::Failed { text, diagnostics };
		}
	};

	let len = text.chars().count();
	let Some(tree) = host.parse_tree(len, tree_wait).await else {
		return Outcome::TreeTimeout;
	};

	let links = link_or_empty(&tree, &objects);
	let processing_instructions = objects.processing_instructions();
	Outcome::Synced {
		text,
		objects,
		links,
		processing_instructions,
	}
}

/// Two parsers disagreeing on well-formed text is an internal fault, not a
/// document problem: it is logged and the pass continues without links.
fn link_or_empty(tree: &ParseTree, objects: &ObjectTree) -> LinkMap {
	match link(tree, &tree.root(), objects) {
		Ok(links) => links,
		Err(err @ LinkError::NotDocumentRoot) => {
			error!(error = %err, "sync.link.contract");
			LinkMap::default()
		}
		Err(err) => {
			warn!(error = %err, "sync.link.mismatch");
			LinkMap::default()
		}
	}
}
