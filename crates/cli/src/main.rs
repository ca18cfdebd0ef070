//! `outlet` binary.

mod cli;
mod commands;
mod logging;

use std::process::ExitCode;

use clap::Parser;
use cli::{Cli, Command};
use outlet_extensions::OutletConfig;

fn main() -> anyhow::Result<ExitCode> {
	let cli = Cli::parse();
	logging::init(cli.json_logs);

	let config = OutletConfig::load(&cli.config)?;
	let mut stdout = std::io::stdout().lock();

	match cli.command {
		Command::Validate => {
			let clean = commands::validate::run(&config, &mut stdout)?;
			Ok(if clean { ExitCode::SUCCESS } else { ExitCode::FAILURE })
		}
		Command::Resolve {
			extension_point,
			as_plugin,
			context,
			limit_per_plugin,
		} => {
			let request = commands::resolve::Request {
				extension_point,
				as_plugin,
				context,
				limit_per_plugin,
			};
			commands::resolve::run(&config, &request, &mut stdout)?;
			Ok(ExitCode::SUCCESS)
		}
	}
}
