//! Command-line client for the waste-pickup subscription service.
//!
//! Lists plans and orders, places orders and changes order status against
//! the configured orders API. Rendered output goes to stdout, logs to stderr.

use clap::Parser;
use pickup_api::implementations::{http, memory};
use pickup_config::Config;
use pickup_core::{ControllerBuilder, OrderController};
use std::path::PathBuf;

mod commands;
mod render;

use commands::Command;

/// Command-line arguments for the pickup client.
#[derive(Parser, Debug)]
#[command(name = "pickup", author, version, about, long_about = None)]
struct Args {
	/// Path to configuration file
	#[arg(short, long, default_value = "config.toml")]
	config: PathBuf,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "info")]
	log_level: String,

	/// Print machine-readable JSON instead of tables
	#[arg(long, global = true)]
	json: bool,

	#[command(subcommand)]
	command: Command,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	use tracing_subscriber::{fmt, EnvFilter};

	// RUST_LOG wins over --log-level
	let env_filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

	fmt()
		.with_env_filter(env_filter)
		.with_writer(std::io::stderr)
		.with_target(false)
		.init();

	let config_path = args
		.config
		.to_str()
		.ok_or("configuration path is not valid UTF-8")?;
	let config = Config::from_file(config_path).await?;
	tracing::info!("Loaded configuration [{}]", config.client.id);

	let mut controller = build_controller(config)?;
	let output = commands::run(args.command, &mut controller, args.json).await?;
	println!("{}", output);

	Ok(())
}

/// Macro to create a factory HashMap with the API factory type
macro_rules! create_factory_map {
    ($( $name:literal => $factory:expr ),* $(,)?) => {{
        let mut factories = std::collections::HashMap::new();
        $(
            factories.insert($name.to_string(), $factory as pickup_api::ApiFactory);
        )*
        factories
    }};
}

/// Builds the order controller with every known orders API implementation.
fn build_controller(config: Config) -> Result<OrderController, Box<dyn std::error::Error>> {
	let factories = create_factory_map!(
		"http" => http::create_api,
		"memory" => memory::create_api,
	);

	Ok(ControllerBuilder::new(config).build(&factories)?)
}
