//! Debounced resynchronization of the derived document state.
//!
//! [`SyncEngine`] runs as one spawned task that owns all derived state.
//! [`SyncHandle`] feeds it edit notifications and sync requests over an
//! unbounded channel, so the edit path never blocks, and reads published
//! [`SyncSnapshot`]s from a watch channel.
//!
//! # Scheduling
//!
//! - Every edit rearms the debounce deadline.
//! - An immediate sync request clears the deadline and runs a pass now.
//! - At most one pass is in flight. Requests arriving meanwhile are dropped;
//!   edits arriving meanwhile still rearm the deadline.
//! - A pass whose parse-tree wait times out publishes nothing and is retried
//!   after `retry_ms`.
//! - Shutdown cancels the task; an abandoned pass never publishes.

mod pass;
mod snapshot;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use quire_dom::ObjectTree;
use tokio::sync::{mpsc, watch};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use self::pass::Outcome;
pub use self::snapshot::{SyncPhase, SyncSnapshot};
use crate::config::SyncConfig;
use crate::host::SyncHost;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
	Edit,
	ImmediateSync,
	Shutdown,
}

/// Client side of a running [`SyncEngine`]. Cheap to clone; every clone
/// drives the same engine.
#[derive(Debug, Clone)]
pub struct SyncHandle {
	commands: mpsc::UnboundedSender<Command>,
	snapshot: watch::Receiver<Arc<SyncSnapshot>>,
	phase: watch::Receiver<SyncPhase>,
	cancel: CancellationToken,
}

impl SyncHandle {
	/// Notes that the buffer changed and restarts the debounce period.
	pub fn on_edit(&self) {
		let _ = self.commands.send(Command::Edit);
	}

	/// Skips the debounce period and resyncs as soon as the engine is free.
	pub fn request_immediate_sync(&self) {
		let _ = self.commands.send(Command::ImmediateSync);
	}

	/// Stops the engine. The last published snapshot stays readable.
	pub fn shutdown(&self) {
		let _ = self.commands.send(Command::Shutdown);
		self.cancel.cancel();
	}

	pub fn is_shut_down(&self) -> bool {
		self.cancel.is_cancelled()
	}

	/// Resolves once the engine task has exited.
	pub async fn stopped(&self) {
		self.commands.closed().await;
	}

	/// The most recently published snapshot.
	pub fn snapshot(&self) -> Arc<SyncSnapshot> {
		self.snapshot.borrow().clone()
	}

	/// A receiver notified on every publish.
	pub fn subscribe(&self) -> watch::Receiver<Arc<SyncSnapshot>> {
		self.snapshot.clone()
	}

	pub fn phase(&self) -> SyncPhase {
		*self.phase.borrow()
	}

	pub fn subscribe_phase(&self) -> watch::Receiver<SyncPhase> {
		self.phase.clone()
	}

	pub fn object_tree(&self) -> Option<Arc<ObjectTree>> {
		self.snapshot.borrow().object_tree.clone()
	}

	pub fn is_well_formed(&self) -> bool {
		self.snapshot.borrow().is_well_formed
	}

	pub fn sync_version(&self) -> u64 {
		self.snapshot.borrow().sync_version
	}
}

/// The engine task. Construct with [`SyncEngine::spawn`].
pub struct SyncEngine<H> {
	host: Arc<H>,
	config: SyncConfig,
	commands: mpsc::UnboundedReceiver<Command>,
	snapshot: watch::Sender<Arc<SyncSnapshot>>,
	phase: watch::Sender<SyncPhase>,
	cancel: CancellationToken,
	deadline: Option<Instant>,
	/// Text of the last pass that reached a verdict.
	last_text: Option<Arc<str>>,
	version: u64,
}

impl<H: SyncHost> SyncEngine<H> {
	/// Starts an engine for `host` on the current tokio runtime, beginning
	/// from the empty snapshot.
	pub fn spawn(host: Arc<H>, config: SyncConfig) -> SyncHandle {
		let (commands_tx, commands) = mpsc::unbounded_channel();
		let (snapshot, snapshot_rx) = watch::channel(Arc::new(SyncSnapshot::default()));
		let (phase, phase_rx) = watch::channel(SyncPhase::Idle);
		let cancel = CancellationToken::new();

		let engine = Self {
			host,
			config,
			commands,
			snapshot,
			phase,
			cancel: cancel.clone(),
			deadline: None,
			last_text: None,
			version: 0,
		};
		tokio::spawn(engine.run());

		SyncHandle {
			commands: commands_tx,
			snapshot: snapshot_rx,
			phase: phase_rx,
			cancel,
		}
	}

	async fn run(mut self) {
		debug!(debounce_ms = self.config.debounce_ms, "sync.engine.start");
		loop {
			let deadline = self.deadline;
			tokio::select! {
				biased;
				() = self.cancel.cancelled() => break,
				command = self.commands.recv() => match command {
					Some(Command::Edit) => {
						self.rearm();
						self.set_phase(SyncPhase::Debouncing);
					}
					Some(Command::ImmediateSync) => {
						self.deadline = None;
						if !self.resync().await {
							break;
						}
					}
					Some(Command::Shutdown) | None => break,
				},
				() = sleep_until(deadline) => {
					self.deadline = None;
					if !self.resync().await {
						break;
					}
				}
			}
		}

		self.cancel.cancel();
		self.deadline = None;
		self.set_phase(SyncPhase::Idle);
		debug!(version = self.version, "sync.engine.stop");
	}

	fn rearm(&mut self) {
		self.deadline = Some(Instant::now() + self.config.debounce());
	}

	fn set_phase(&self, phase: SyncPhase) {
		self.phase.send_if_modified(|current| {
			let changed = *current != phase;
			*current = phase;
			changed
		});
	}

	/// Runs one pass while still serving commands. Returns false when the
	/// engine must stop.
	async fn resync(&mut self) -> bool {
		self.set_phase(SyncPhase::Resyncing);
		debug!(version = self.version, "sync.resync.start");

		let pass = pass::run(self.host.clone(), self.last_text.clone(), self.config.tree_wait());
		tokio::pin!(pass);
		let outcome = loop {
			tokio::select! {
				biased;
				() = self.cancel.cancelled() => return false,
				outcome = &mut pass => break outcome,
				command = self.commands.recv() => match command {
					Some(Command::Edit) => self.rearm(),
					Some(Command::ImmediateSync) => trace!("sync.resync.busy"),
					Some(Command::Shutdown) | None => return false,
				},
			}
		};

		self.apply(outcome);
		self.set_phase(if self.deadline.is_some() {
			SyncPhase::Debouncing
		} else {
			SyncPhase::Idle
		});
		true
	}

	fn apply(&mut self, outcome: Outcome) {
		match outcome {
			Outcome::Unchanged => trace!(version = self.version, "sync.resync.unchanged"),
			Outcome::TreeTimeout => {
				warn!(
					tree_wait_ms = self.config.tree_wait_ms,
					retry_ms = self.config.retry_ms,
					"sync.tree_wait.timeout"
				);
				let retry = Instant::now() + self.config.retry();
				self.deadline = Some(self.deadline.map_or(retry, |deadline| deadline.min(retry)));
			}
			Outcome::Failed { text, diagnostics } => {
				debug!(
					len = text.len(),
					diagnostics = diagnostics.len(),
					"sync.resync.failed"
				);
				self.last_text = Some(text.into());
				self.publish(SyncSnapshot::failed(self.version, diagnostics));
			}
			Outcome::Synced {
				text,
				objects,
				links,
				processing_instructions,
			} => {
				self.version += 1;
				debug!(
					version = self.version,
					len = text.len(),
					links = links.len(),
					"sync.resync.synced"
				);
				self.last_text = Some(text.into());
				self.publish(SyncSnapshot {
					is_well_formed: true,
					diagnostics: Vec::new(),
					sync_version: self.version,
					object_tree: Some(Arc::new(objects)),
					links,
					processing_instructions,
				});
			}
		}
	}

	fn publish(&self, snapshot: SyncSnapshot) {
		if self.cancel.is_cancelled() {
			return;
		}
		self.snapshot.send_replace(Arc::new(snapshot));
	}
}

async fn sleep_until(deadline: Option<Instant>) {
	match deadline {
		Some(deadline) => tokio::time::sleep_until(deadline).await,
		None => std::future::pending().await,
	}
}
