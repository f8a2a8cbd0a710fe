//! Raw strict-parser failures.

use thiserror::Error;

/// A well-formedness failure as the strict parser reports it.
///
/// `message` is free text carrying the location somewhere inside it;
/// `detail` holds a secondary description some parsers attach separately.
/// Locating the failure is left to the diagnostics normalizer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct RawParseError {
	pub message: String,
	pub detail: Option<String>,
}

impl RawParseError {
	pub fn new(message: impl Into<String>) -> Self {
		Self {
			message: message.into(),
			detail: None,
		}
	}

	#[must_use]
	pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
		self.detail = Some(detail.into());
		self
	}
}
