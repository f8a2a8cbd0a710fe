use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "quire")]
#[command(about = "Well-formedness checks and parse/object tree links for XML files")]
#[command(version)]
/// Command-line arguments.
pub struct Cli {
	/// TOML file with a `[sync]` table
	#[arg(long, short = 'c', global = true, value_name = "PATH")]
	pub config: Option<PathBuf>,

	/// Log more (repeat for trace output)
	#[arg(long, short = 'v', global = true, action = ArgAction::Count)]
	pub verbose: u8,

	#[command(subcommand)]
	pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
	/// Report diagnostics for malformed files
	Check {
		#[arg(required = true, value_name = "FILE")]
		files: Vec<PathBuf>,
	},
	/// Print element links and processing instructions
	Links {
		#[arg(value_name = "FILE")]
		file: PathBuf,
	},
}

impl Cli {
	/// Default log filter for the given verbosity, used when `RUST_LOG` is unset.
	pub fn log_filter(&self) -> &'static str {
		match self.verbose {
			0 => "warn",
			1 => "info",
			2 => "debug",
			_ => "trace",
		}
	}
}
