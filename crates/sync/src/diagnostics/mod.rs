//! Structured diagnostics from raw strict-parser failures.
//!
//! Parsers disagree on how they report locations. [`normalize`] tries the
//! known shapes in order and falls back to a diagnostic at document start.

use std::fmt;
use std::sync::LazyLock;

use quire_dom::RawParseError;
use quire_primitives::{CharIdx, LineIndex};
use regex::Regex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
	Error,
}

impl fmt::Display for Severity {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Severity::Error => "error",
		})
	}
}

/// A located problem. `line` and `column` are 1-based; `from`/`to` are
/// character offsets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
	pub message: String,
	pub severity: Severity,
	pub line: usize,
	pub column: usize,
	pub from: CharIdx,
	pub to: CharIdx,
}

/// `message ... line N ... column N`
static MESSAGE_LINE_COLUMN: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"(?is)^(?P<message>.*?)[\s(,:;]*\bline\s+(?P<line>\d+)\b.*?\bcolumn\s+(?P<column>\d+)")
		.expect("static regex")
});

/// `Line Number N, Column N:` in a separate detail node.
static DETAIL_LINE_COLUMN: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"Line Number (?P<line>\d+), Column (?P<column>\d+):").expect("static regex"));

static INTEGER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").expect("static regex"));

/// Converts a raw parse failure into located diagnostics.
///
/// Always returns at least one diagnostic.
pub fn normalize(raw: &RawParseError, index: &LineIndex) -> Vec<Diagnostic> {
	let message = raw.message.trim();

	if let Some(caps) = MESSAGE_LINE_COLUMN.captures(message) {
		let text = caps.name("message").map_or("", |m| m.as_str()).trim();
		let text = if text.is_empty() { message } else { text };
		if let Some(diagnostic) = located(text, &caps["line"], &caps["column"], index) {
			return vec![diagnostic];
		}
	}

	if let Some(detail) = raw.detail.as_deref()
		&& let Some(caps) = DETAIL_LINE_COLUMN.captures(detail)
	{
		let rest = detail[caps.get(0).map_or(0, |m| m.end())..].trim();
		let text = match (message.is_empty(), rest.is_empty()) {
			(false, _) => message,
			(true, false) => rest,
			(true, true) => detail.trim(),
		};
		if let Some(diagnostic) = located(text, &caps["line"], &caps["column"], index) {
			return vec![diagnostic];
		}
	}

	let haystack = match raw.detail.as_deref() {
		Some(detail) => format!("{message}\n{detail}"),
		None => message.to_owned(),
	};
	let mut numbers = INTEGER.find_iter(&haystack).map(|m| m.as_str());
	if let (Some(line), Some(column)) = (numbers.next(), numbers.next())
		&& let Some(diagnostic) = located(message, line, column, index)
	{
		return vec![diagnostic];
	}

	vec![Diagnostic {
		message: message.to_owned(),
		severity: Severity::Error,
		line: 1,
		column: 1,
		from: 0,
		to: 0,
	}]
}

/// Builds a diagnostic spanning from the column to the end of its line.
fn located(message: &str, line: &str, column: &str, index: &LineIndex) -> Option<Diagnostic> {
	let line: usize = line.parse().ok()?;
	let column: usize = column.parse().ok()?;
	let from = index.offset(line, column);
	let to = index.line_end(from).max(from);
	let (line, column) = index.position(from);
	Some(Diagnostic {
		message: message.to_owned(),
		severity: Severity::Error,
		line,
		column,
		from,
		to,
	})
}
