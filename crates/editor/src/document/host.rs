use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use quire_primitives::CharLen;
use quire_syntax::ParseTree;
use quire_sync::SyncHost;

use super::Shared;

/// Read-only view of a [`Document`](super::Document) for the sync engine.
#[derive(Clone)]
pub struct DocumentHost {
	shared: Arc<Shared>,
}

impl DocumentHost {
	pub(super) fn new(shared: Arc<Shared>) -> Self {
		Self { shared }
	}
}

#[async_trait]
impl SyncHost for DocumentHost {
	fn text(&self) -> String {
		self.shared.content.read().to_string()
	}

	async fn parse_tree(&self, len: CharLen, timeout: Duration) -> Option<ParseTree> {
		let mut trees = self.shared.tree.subscribe();
		let ready = async move {
			trees
				.wait_for(|tree| tree.len_chars() == len)
				.await
				.map(|tree| tree.clone())
				.ok()
		};
		tokio::time::timeout(timeout, ready).await.ok().flatten()
	}
}
