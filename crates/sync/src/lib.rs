//! Dual-tree synchronization for XML editing buffers.
//!
//! An editor keeps a fault-tolerant parse tree ([`quire_syntax`]) live as the
//! user types. This crate keeps it consistent with the strict object tree
//! ([`quire_dom`]) and with itself:
//!
//! * [`link`] matches the two trees element by element.
//! * [`normalize`] turns raw strict-parser failures into located diagnostics.
//! * [`TagMirror`] renames the paired tag when a tag name is edited.
//! * [`SyncEngine`] debounces edits, reparses strictly, links and publishes
//!   versioned [`SyncSnapshot`]s.

pub mod config;
pub mod diagnostics;
pub mod engine;
mod host;
pub mod linker;
pub mod mirror;

pub use config::{ConfigError, SyncConfig};
pub use diagnostics::{Diagnostic, Severity, normalize};
pub use engine::{SyncEngine, SyncHandle, SyncPhase, SyncSnapshot};
pub use host::{EditFilter, SyncHost};
pub use linker::{LinkError, LinkMap, link};
pub use mirror::{MirrorOutcome, TagMirror};
