use anyhow::{Context, Result};
use clap::Parser;
use config_manager::SystemConfig;
use history_core::HistoryExporter;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;
use tronscan_client::TronscanClient;

/// Export the TRX, TRC10 and TRC20 transfer history of a TRON account as CSV
#[derive(Parser, Debug)]
#[command(name = "tron_history", version, about)]
struct Args {
    /// TRON account address
    address: String,

    /// Output CSV file (defaults to output.default_path from the configuration)
    output: Option<PathBuf>,

    /// Configuration file; missing files fall back to defaults and TRONHIST__* variables
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = SystemConfig::load_from_path(&args.config)
        .with_context(|| format!("failed to load configuration from {}", args.config.display()))?;
    history_core::validate_address(&args.address)?;

    let output = args
        .output
        .unwrap_or_else(|| PathBuf::from(&config.output.default_path));
    let client = TronscanClient::new(&config.explorer).context("failed to build HTTP client")?;

    info!("Writing to file {}...", output.display());
    let mut writer = csv::WriterBuilder::new()
        .has_headers(config.output.include_header)
        .from_path(&output)
        .with_context(|| format!("failed to open {}", output.display()))?;

    let summary = HistoryExporter::new(&client, &config)
        .export(&args.address, &mut writer)
        .await
        .with_context(|| format!("export for {} failed", args.address))?;

    for (label, count) in &summary.downloaded {
        info!("📊 {}: {} transfers", label, count);
    }
    info!(
        "✅ Successfully written {} records to {}!",
        summary.rows_written,
        output.display()
    );

    Ok(())
}
