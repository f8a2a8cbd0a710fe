//! Quire command-line front end.

mod cli;
mod report;

use std::io::Write;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use cli::{Cli, Command};
use quire_sync::SyncConfig;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<ExitCode> {
	let cli = Cli::parse();

	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_filter()));
	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.init();

	let config = match &cli.config {
		Some(path) => SyncConfig::load(path).with_context(|| format!("loading {}", path.display()))?,
		None => SyncConfig::default(),
	};

	let mut stdout = std::io::stdout();
	let mut well_formed = true;
	match &cli.command {
		Command::Check { files } => {
			for path in files {
				let (_, snapshot) = report::sync_file(path, &config).await?;
				well_formed &= report::write_diagnostics(&mut stdout, path, &snapshot)?;
			}
		}
		Command::Links { file } => {
			let (text, snapshot) = report::sync_file(file, &config).await?;
			if report::write_diagnostics(&mut stdout, file, &snapshot)? {
				report::write_links(&mut stdout, &text, &snapshot)?;
			} else {
				well_formed = false;
			}
		}
	}
	stdout.flush()?;

	Ok(if well_formed { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}
