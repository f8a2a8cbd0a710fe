//! Editing buffer for XML documents.
//!
//! A [`Document`] owns the text and its live parse tree. Every edit goes
//! through [`Document::commit`], which runs the installed edit filters (the
//! tag mirror among them), applies the result atomically and reparses. An
//! attached sync engine is notified after each commit and reads the document
//! through [`DocumentHost`].

mod document;
mod error;

pub use document::{CommitResult, Document, DocumentHost, DocumentId};
pub use error::{EditError, Result};
