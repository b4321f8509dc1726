//! Bankweb main entry point

use anyhow::Context;
use bankweb_api::{start_server, AppState};
use bankweb_config::{Config, ConfigError};
use bankweb_core::{HttpAccountGateway, HttpOperationGateway, HttpTransport, HyperTransport};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Runtime;

#[derive(Parser, Debug)]
#[command(name = "bankweb")]
#[command(author = "Bankweb Contributors")]
#[command(version = "0.1.0")]
#[command(about = "Web front-end for the bank account kata", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Override api.base_url from the configuration
    #[arg(long)]
    api_base_url: Option<String>,

    /// Print the default configuration and exit
    #[arg(long)]
    print_default_config: bool,
}

/// Logging is not set up before the config is read, so this goes to stderr
fn report_config_error(error: &ConfigError) {
    eprintln!("{}: {}", error.severity(), error.to_details());
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.print_default_config {
        print!("{}", Config::generate_default());
        return Ok(());
    }

    let mut config = Config::load_or_default(&args.config)
        .inspect_err(report_config_error)
        .with_context(|| format!("Failed to load configuration from {}", args.config.display()))?;
    if let Some(base_url) = args.api_base_url {
        config.api.base_url = base_url;
        config
            .validate()
            .inspect_err(report_config_error)
            .context("Invalid --api-base-url")?;
    }

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(config.logging.level.as_str()))
        .init();
    if !args.config.exists() {
        log::warn!("Config file {} not found, using defaults", args.config.display());
    }
    log::info!("Config loaded: api={}, refresh_on_cancel={}", config.api_base_url(), config.view.refresh_on_cancel);

    let transport: Arc<dyn HttpTransport> = Arc::new(HyperTransport::from_config(&config));
    let base_url = config.api_base_url().to_string();
    let accounts = Arc::new(HttpAccountGateway::new(Arc::clone(&transport), &base_url));
    let operations = Arc::new(HttpOperationGateway::new(transport, &base_url));
    let state = AppState::new(config, accounts, operations);

    let rt = Runtime::new().context("Failed to start the tokio runtime")?;
    rt.block_on(start_server(state)).context("Server error")?;

    Ok(())
}
