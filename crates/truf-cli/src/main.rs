//! TRUF.NETWORK client - Entry Point

use anyhow::Result;
use clap::Parser;
use tracing::info;
use truf_cli::{run_offline, AppConfig, Application, Cli};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_format = truf_telemetry::LogFormat::from_env()?;
    truf_telemetry::init_tracing(cli.verbose, log_format)?;

    info!("Starting truf v{}", env!("CARGO_PKG_VERSION"));

    // CLI arg > TRUF_CONFIG env var > default
    let config_path = cli
        .config
        .clone()
        .or_else(|| std::env::var("TRUF_CONFIG").ok())
        .unwrap_or_else(|| "config/default.toml".to_string());

    let output = if cli.command.is_offline() {
        run_offline(&cli.command)?
    } else {
        info!(config_path = %config_path, "Loading configuration");
        let config = AppConfig::load(&config_path)?;
        info!(
            endpoint = %config.ledger.endpoint,
            chain_id = %config.ledger.chain_id,
            "Configuration loaded"
        );
        let app = Application::connect(config)?;
        app.execute(cli.command).await?
    };

    println!("{}", serde_json::to_string_pretty(&output)?);

    if cli.metrics {
        eprintln!("{}", truf_telemetry::gather_text()?);
    }

    Ok(())
}
