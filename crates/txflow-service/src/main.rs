//! Command line entry point for txflow.
//!
//! Sends transactions through the txflow pipeline and follows them to the
//! configured confirmation depth, runs one-shot RPC calls, and lists the
//! available methods.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

/// Command-line arguments for the txflow CLI.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Path to configuration file
	#[arg(short, long, default_value = "config.toml")]
	config: PathBuf,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "info")]
	log_level: String,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Send a transaction and wait for its confirmations
	Send(commands::SendArgs),
	/// Execute a one-shot RPC method, e.g. `call getBalance 0x.. latest`
	Call {
		/// Method name as listed by `methods`
		method: String,
		/// Positional parameters; JSON values, bare strings otherwise
		params: Vec<String>,
	},
	/// List the available methods
	Methods,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	// Initialize tracing with env filter
	use tracing_subscriber::{fmt, EnvFilter};

	let default_directive = args.log_level.to_string();
	let env_filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

	fmt()
		.with_env_filter(env_filter)
		.with_writer(std::io::stderr)
		.with_target(true)
		.init();

	match args.command {
		Command::Methods => commands::list_methods(),
		Command::Call { method, params } => {
			let module = commands::load_module(&args.config, None).await?;
			commands::call(&module, &method, &params).await?;
		}
		Command::Send(send) => {
			let module = commands::load_module(&args.config, send.confirmations).await?;
			commands::send(&module, &send).await?;
		}
	}

	Ok(())
}
