//! Sync engine configuration.
//!
//! Read from the `[sync]` table of a TOML file. Every field is optional.
//!
//! ```toml
//! [sync]
//! debounce_ms = 1000
//! tree_wait_ms = 1000
//! retry_ms = 250
//! mirror_tags = true
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

/// Default quiet period before an automatic resync.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(1000);

/// Default bound on waiting for the parse tree to cover the document.
pub const DEFAULT_TREE_WAIT: Duration = Duration::from_millis(1000);

/// Default delay before retrying a resync whose tree wait timed out.
pub const DEFAULT_RETRY: Duration = Duration::from_millis(250);

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error parsing TOML syntax or shape.
	#[error("TOML parse error: {0}")]
	Toml(#[from] toml::de::Error),

	/// Error reading a configuration file.
	#[error("I/O error reading {path}: {error}")]
	Io {
		/// Path to the file that failed to read.
		path: PathBuf,
		/// The underlying I/O error.
		error: std::io::Error,
	},

	/// A field holds a value the engine cannot run with.
	#[error("invalid value for {field}: {reason}")]
	Invalid {
		field: &'static str,
		reason: &'static str,
	},
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SyncConfig {
	/// Milliseconds of quiet time before an automatic resync.
	pub debounce_ms: u64,
	/// Milliseconds to wait for the parse tree before giving up on a pass.
	pub tree_wait_ms: u64,
	/// Milliseconds before a pass that gave up on the tree is retried.
	pub retry_ms: u64,
	/// Whether hosts install the tag mirror edit filter.
	pub mirror_tags: bool,
}

impl Default for SyncConfig {
	fn default() -> Self {
		Self {
			debounce_ms: DEFAULT_DEBOUNCE.as_millis() as u64,
			tree_wait_ms: DEFAULT_TREE_WAIT.as_millis() as u64,
			retry_ms: DEFAULT_RETRY.as_millis() as u64,
			mirror_tags: true,
		}
	}
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
	sync: SyncConfig,
}

impl SyncConfig {
	/// Parses the `[sync]` table out of a TOML document and validates it.
	pub fn from_toml(text: &str) -> Result<Self> {
		let file: ConfigFile = toml::from_str(text)?;
		file.sync.validate()
	}

	/// Reads and parses a configuration file.
	pub fn load(path: &Path) -> Result<Self> {
		let text = std::fs::read_to_string(path).map_err(|error| ConfigError::Io {
			path: path.to_path_buf(),
			error,
		})?;
		Self::from_toml(&text)
	}

	pub fn validate(self) -> Result<Self> {
		if self.debounce_ms == 0 {
			return Err(ConfigError::Invalid {
				field: "debounce_ms",
				reason: "must be greater than zero",
			});
		}
		if self.tree_wait_ms == 0 {
			return Err(ConfigError::Invalid {
				field: "tree_wait_ms",
				reason: "must be greater than zero",
			});
		}
		Ok(self)
	}

	pub fn debounce(&self) -> Duration {
		Duration::from_millis(self.debounce_ms)
	}

	pub fn tree_wait(&self) -> Duration {
		Duration::from_millis(self.tree_wait_ms)
	}

	pub fn retry(&self) -> Duration {
		Duration::from_millis(self.retry_ms)
	}
}
