//! Seams between the engine and the editor that hosts it.

use std::time::Duration;

use async_trait::async_trait;
use quire_primitives::{CharLen, Transaction};
use quire_syntax::ParseTree;

/// What the sync engine needs from its host.
#[async_trait]
pub trait SyncHost: Send + Sync + 'static {
	/// The full current buffer text.
	fn text(&self) -> String;

	/// Waits up to `timeout` for a parse tree covering exactly `len`
	/// characters. `None` means the tree did not catch up in time.
	async fn parse_tree(&self, len: CharLen, timeout: Duration) -> Option<ParseTree>;
}

/// Edit-time hook run synchronously inside the commit pipeline.
///
/// `tree` is the parse of the text `tx` applies to. A returned companion
/// applies to the text `tx` produces and is committed atomically with it.
pub trait EditFilter: Send + Sync {
	fn name(&self) -> &'static str;

	fn filter(&self, tree: &ParseTree, tx: &Transaction) -> Option<Transaction>;
}
