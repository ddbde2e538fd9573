use anyhow::Result;
use quoting::{init_tracing, MockQuoter, QuoterConfig, QuotingClient};
use rfq_quoter::bin_common::{config_path_from_args, parse_args, ConfigType};
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    // Load config first (before logging is initialized)
    let config_path = config_path_from_args(&parse_args(), ConfigType::Quoter);
    let config = QuoterConfig::load(&config_path)?;

    // Initialize logging with configured level
    init_tracing(&config.log_level);
    config.log();

    let client = Arc::new(
        QuotingClient::new(&config.url, config.credentials()?, MockQuoter::new())?
            .with_wait_timeout(Some(config.wait_timeout()))
            .with_retry_delay(config.retry_delay()),
    );

    let shutdown_client = Arc::clone(&client);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutdown requested");
            shutdown_client.disconnect().await;
        }
    });

    print_banner("Mock quoter", &config.url);

    let result = client.connect().await;
    if let Err(e) = &result {
        error!("Quoting client stopped: {}", e);
    }

    print_shutdown("Mock quoter");
    Ok(result?)
}

fn print_banner(name: &str, url: &str) {
    info!("");
    info!("========================================");
    info!("Starting {}", name);
    info!("Venue: {}", url);
    info!("Press Ctrl+C to stop");
    info!("========================================");
    info!("");
}

fn print_shutdown(name: &str) {
    info!("");
    info!("========================================");
    info!("{} stopped", name);
    info!("========================================");
}
