use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "outlet")]
#[command(about = "Inspect plugin extension registrations")]
#[command(version)]
/// Command-line arguments.
pub struct Cli {
	/// Host configuration file (TOML)
	#[arg(long, short = 'c', value_name = "PATH", default_value = "outlet.toml")]
	pub config: PathBuf,

	/// Emit logs as JSON lines
	#[arg(long)]
	pub json_logs: bool,

	#[command(subcommand)]
	pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
	/// Register declared links and check every other declared contribution
	Validate,
	/// Resolve the links of an extension point
	Resolve {
		/// Extension point id, e.g. grafana/dashboard/panel/menu
		extension_point: String,

		/// Resolve as this app plugin instead of as the host
		#[arg(long, value_name = "PLUGIN_ID")]
		as_plugin: Option<String>,

		/// Context handed to the links, as JSON
		#[arg(long, value_name = "JSON")]
		context: Option<String>,

		/// Keep at most this many links per plugin
		#[arg(long, value_name = "N")]
		limit_per_plugin: Option<usize>,
	},
}
