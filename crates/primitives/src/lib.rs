//! Core types for text editing: character offsets, change sets, transactions and line tables.

/// Line-start offset tables for line/column conversion.
pub mod line_index;
/// Character offset aliases.
pub mod range;
/// Change sets and transactions.
pub mod transaction;

pub use line_index::LineIndex;
pub use range::{CharIdx, CharLen};
pub use ropey::{Rope, RopeSlice};
pub use transaction::{Bias, Change, ChangeRef, ChangeSet, Transaction, TxFlags};
