use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use log::LevelFilter;

use dextract::config::AppConfig;
use dextract::services::DevRouteSource;
use dextract::{logger, workers, AppContext};

/// Chain-agnostic cache and normalization layer over external market-data
/// providers.
#[derive(Parser)]
#[command(name = "dextract", version)]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(long, default_value = "dextract.toml")]
    config: PathBuf,

    /// Enable debug logging.
    #[arg(long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    logger::init(if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    });

    let config = if args.config.exists() {
        AppConfig::load(&args.config)?
    } else {
        log::warn!(
            "config file {} not found, using defaults",
            args.config.display()
        );
        AppConfig::default()
    };

    let ctx = Arc::new(AppContext::build(&config, Arc::new(DevRouteSource))?);
    log::info!(
        "dextract ready: {} chains, providers {:?}",
        ctx.chains.supported_chains().len(),
        ctx.token_providers
            .providers()
            .iter()
            .map(|p| p.as_str())
            .collect::<Vec<_>>()
    );

    let sweeps = tokio::spawn(workers::run(ctx, config.workers.clone()));

    tokio::signal::ctrl_c().await?;
    log::info!("shutting down");
    sweeps.abort();

    Ok(())
}
