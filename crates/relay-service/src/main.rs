use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use relay_config::{ConfigLoader, RelayConfig};
use std::path::{Path, PathBuf};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod service;

#[derive(Parser)]
#[command(name = "relay-service")]
#[command(about = "Gasless meta-transaction relay", long_about = None)]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
	#[command(subcommand)]
	command: Option<Commands>,

	#[arg(short, long, value_name = "FILE", default_value = "config/local.toml")]
	config: PathBuf,

	/// Log level; defaults to the configured one, then "info"
	#[arg(long, env = "RELAY_LOG_LEVEL")]
	log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
	/// Start the relay service
	Start,
	/// Validate the configuration file
	Validate,
}

#[tokio::main]
async fn main() -> Result<()> {
	let cli = Cli::parse();

	// Tracing is set up after loading so the configured level can apply.
	let config = load_config(&cli.config).await;
	let log_level = cli
		.log_level
		.clone()
		.or_else(|| config.as_ref().ok().map(|c| c.relay.log_level.clone()))
		.unwrap_or_else(|| "info".to_string());
	setup_tracing(&log_level)?;

	let config = config?;
	match cli.command {
		Some(Commands::Start) | None => start_service(config).await,
		Some(Commands::Validate) => validate_config(config),
	}
}

async fn load_config(path: &Path) -> Result<RelayConfig> {
	ConfigLoader::new()
		.with_file(path)
		.load()
		.await
		.with_context(|| format!("Failed to load configuration from {}", path.display()))
}

async fn start_service(config: RelayConfig) -> Result<()> {
	info!("Starting meta-transaction relay");
	info!("HTTP: {}:{}", config.relay.http_host, config.relay.http_port);

	let service =
		service::RelayService::from_config(config).context("Failed to build relay service")?;
	service.run(shutdown_signal()).await?;

	info!("Relay service stopped");
	Ok(())
}

fn validate_config(config: RelayConfig) -> Result<()> {
	let registry = service::build_registry(&config)?;

	info!("Configuration is valid");
	for summary in registry.summaries() {
		info!(
			"  Network: {} (id {}, relay {})",
			summary.name, summary.id, summary.relay_contract_address
		);
	}

	Ok(())
}

fn setup_tracing(log_level: &str) -> Result<()> {
	let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

	tracing_subscriber::registry()
		.with(env_filter)
		.with(tracing_subscriber::fmt::layer())
		.try_init()
		.context("Failed to initialize tracing")?;

	Ok(())
}

async fn shutdown_signal() {
	let ctrl_c = async {
		if let Err(e) = signal::ctrl_c().await {
			error!("Failed to listen for Ctrl+C: {}", e);
			std::future::pending::<()>().await;
		}
	};

	#[cfg(unix)]
	let terminate = async {
		match signal::unix::signal(signal::unix::SignalKind::terminate()) {
			Ok(mut stream) => {
				stream.recv().await;
			}
			Err(e) => {
				error!("Failed to install SIGTERM handler: {}", e);
				std::future::pending::<()>().await;
			}
		}
	};

	#[cfg(not(unix))]
	let terminate = std::future::pending::<()>();

	tokio::select! {
		_ = ctrl_c => {},
		_ = terminate => {},
	}

	info!("Shutdown signal received");
}
