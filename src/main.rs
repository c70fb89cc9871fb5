use anyhow::Result;
use clap::Parser;
use log::{error, info, warn};

use spl_balances::config::{Cli, Config, OutputFormat};
use spl_balances::display::{self, NOT_CONNECTED};
use spl_balances::portfolio::{fetch_balances, BalanceReport};
use spl_balances::rpc::TokenRpcClient;
use spl_balances::utils;

fn print_report(config: &Config, report: &BalanceReport) -> Result<()> {
    if !report.failed.is_empty() {
        let failed: Vec<_> = report.failed.iter().map(|ns| ns.label()).collect();
        warn!("Balances exclude failed token programs: {}", failed.join(", "));
    }

    match config.output {
        OutputFormat::Table => println!("{}", display::render_table(&report.balances, config.mint_width)),
        OutputFormat::Json => println!("{}", display::render_json(&report.balances)?),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = Config::load(&cli)?;

    let namespaces: Vec<_> = config.namespaces.iter().map(|ns| ns.label()).collect();

    info!("Configuration:");
    info!("  cluster: {}", config.cluster);
    info!("  rpc: {}", config.rpc_endpoint);
    info!("  commitment: {:?}", config.commitment.commitment);
    info!("  token programs: {}", namespaces.join(", "));
    info!("  partial failures: {}", config.partial_policy);

    let Some(owner) = config.owner else {
        warn!("No owner address or keypair configured");
        match config.output {
            OutputFormat::Table => println!("{}", NOT_CONNECTED),
            OutputFormat::Json => println!("{}", display::render_json(&[])?),
        }
        return Ok(());
    };
    info!("  owner: {}", owner);

    let client = TokenRpcClient::new(&config.rpc_endpoint, config.commitment);
    info!("Connected to {}", client.url());

    let mut cycle = 0u64;

    loop {
        cycle += 1;
        if config.refresh_interval_ms > 0 {
            info!("=== Cycle {} ===", cycle);
        }

        match fetch_balances(&client, &owner, &config.namespaces, config.partial_policy).await {
            Ok(report) => {
                report.metrics.log_summary();
                print_report(&config, &report)?;
            }
            Err(e) if config.refresh_interval_ms > 0 => {
                error!("Cycle {} failed: {:#}", cycle, e);
            }
            Err(e) => return Err(e),
        }

        if config.refresh_interval_ms == 0 {
            return Ok(());
        }

        utils::wait(config.refresh_interval_ms).await;
    }
}
