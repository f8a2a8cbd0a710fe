//! Line-start offset table.
//!
//! Parsers report locations as 1-based line/column pairs; editors address text by
//! character offset. [`LineIndex`] converts between the two in O(log lines).

use std::ops::Range;

use crate::range::CharIdx;

/// Character offsets of every line start in a text.
///
/// Lines are separated by `\n`; a trailing `\r` belongs to the line it ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineIndex {
	starts: Vec<CharIdx>,
	len: CharIdx,
}

impl LineIndex {
	/// Builds the table for `text`.
	pub fn new(text: &str) -> Self {
		let mut starts = vec![0];
		let mut len = 0;
		for ch in text.chars() {
			len += 1;
			if ch == '\n' {
				starts.push(len);
			}
		}
		Self { starts, len }
	}

	/// Returns the number of lines (at least one).
	pub fn line_count(&self) -> usize {
		self.starts.len()
	}

	/// Returns the total character length of the indexed text.
	pub fn len_chars(&self) -> CharIdx {
		self.len
	}

	/// Returns the character range of a 1-based line, excluding its line break.
	pub fn line_range(&self, line: usize) -> Option<Range<CharIdx>> {
		let idx = line.checked_sub(1)?;
		let start = *self.starts.get(idx)?;
		let end = match self.starts.get(idx + 1) {
			Some(next) => next - 1,
			None => self.len,
		};
		Some(start..end)
	}

	/// Converts a 1-based line and column into a character offset.
	///
	/// Lines past the end clamp to the last line; columns clamp to the line's
	/// extent. Line or column zero is treated as one.
	pub fn offset(&self, line: usize, column: usize) -> CharIdx {
		let line = line.clamp(1, self.line_count());
		let Some(range) = self.line_range(line) else {
			return self.len;
		};
		(range.start + column.saturating_sub(1)).min(range.end)
	}

	/// Converts a character offset into a 1-based `(line, column)` pair.
	pub fn position(&self, offset: CharIdx) -> (usize, usize) {
		let offset = offset.min(self.len);
		let line = self.starts.partition_point(|&start| start <= offset);
		let start = self.starts[line - 1];
		(line, offset - start + 1)
	}

	/// Returns the end of the line containing `offset`, excluding the line break.
	pub fn line_end(&self, offset: CharIdx) -> CharIdx {
		let (line, _) = self.position(offset);
		self.line_range(line).map_or(self.len, |range| range.end)
	}
}
