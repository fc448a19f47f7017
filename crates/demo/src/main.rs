//! Curtain demo binary.
//!
//! Runs a scripted set of callers against a presentation proxy whose lifecycle
//! hooks are driven by a simulated container, and logs how each call ends.

use std::path::PathBuf;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod container;
mod scenario;

use config::DemoConfig;
use scenario::Scenario;

/// Demo command line arguments.
#[derive(Parser, Debug)]
#[command(name = "curtain-demo")]
#[command(about = "Await modal presentation against a simulated container")]
struct Args {
	/// TOML configuration file
	#[arg(short, long, value_name = "PATH")]
	config: Option<PathBuf>,

	/// Caller script to run
	#[arg(short, long, value_enum, default_value_t = Scenario::Roundtrip)]
	scenario: Scenario,

	/// Number of concurrent presenters (overrides the config file)
	#[arg(long)]
	callers: Option<usize>,

	/// Per-call timeout in milliseconds (overrides the config file)
	#[arg(long, value_name = "MS")]
	timeout_ms: Option<u64>,

	/// Verbose logging
	#[arg(short, long)]
	verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	let args = Args::parse();

	let default_level = if args.verbose { "debug" } else { "info" };
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
	let subscriber = tracing_subscriber::fmt().with_env_filter(filter).finish();
	tracing::subscriber::set_global_default(subscriber)?;

	let mut config = match &args.config {
		Some(path) => DemoConfig::load(path)?,
		None => DemoConfig::default(),
	};
	if let Some(callers) = args.callers {
		config.callers = callers;
	}
	if let Some(timeout_ms) = args.timeout_ms {
		config.timeout_ms = Some(timeout_ms);
	}

	info!(scenario = ?args.scenario, callers = config.callers, proxy = %config.proxy.label, "Starting curtain-demo");
	let report = scenario::run(args.scenario, &config).await?;
	info!(
		completed = report.completed,
		cancelled = report.cancelled,
		timed_out = report.timed_out,
		"Scenario finished"
	);

	Ok(())
}
