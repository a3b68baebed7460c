use anyhow::Context;
use clap::{Parser, Subcommand};
use std::time::Duration;
use stockroom::lifecycle::{
    setup_tracing, start_item_service, start_order_service, Config, ServiceHandle, Stockroom,
    Storage,
};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "stockroom", version, about = "Catalog and order services")]
struct Cli {
    /// Log level used when RUST_LOG is unset
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Emit JSON log lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the item service
    Item {
        /// Listen address
        #[arg(long)]
        address: Option<String>,

        /// Redis URL for the catalog; in-process storage when omitted
        #[arg(long)]
        redis_url: Option<String>,
    },
    /// Run the order service
    Order {
        /// Listen address
        #[arg(long)]
        address: Option<String>,

        /// Base URL of the item service
        #[arg(long)]
        item_service: Option<String>,

        /// Catalog fetch timeout in milliseconds
        #[arg(long)]
        timeout_ms: Option<u64>,

        /// Redis URL for orders and the order counter; in-process storage when omitted
        #[arg(long)]
        redis_url: Option<String>,
    },
    /// Run both services in one process
    All {
        #[arg(long)]
        item_address: Option<String>,

        #[arg(long)]
        order_address: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = Config::from_env();
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }
    config.log_json |= cli.log_json;

    setup_tracing(&config.log_level, config.log_json);

    match cli.command {
        Command::Item { address, redis_url } => {
            let address = address.unwrap_or(config.item_address);
            let storage = Storage::from_url(redis_url.or(config.item_redis_url).as_deref());
            let service = start_item_service(&address, storage).await?;
            run_until_signal(vec![service]).await
        }
        Command::Order {
            address,
            item_service,
            timeout_ms,
            redis_url,
        } => {
            let address = address.unwrap_or(config.order_address);
            let item_service = item_service.unwrap_or(config.item_service);
            let timeout = timeout_ms
                .map(Duration::from_millis)
                .unwrap_or(config.request_timeout);
            let storage = Storage::from_url(redis_url.or(config.order_redis_url).as_deref());
            let service = start_order_service(&address, &item_service, timeout, storage).await?;
            run_until_signal(vec![service]).await
        }
        Command::All {
            item_address,
            order_address,
        } => {
            if let Some(address) = item_address {
                config.item_address = address;
            }
            if let Some(address) = order_address {
                config.order_address = address;
            }
            let system = Stockroom::start(&config).await?;
            run_until_signal(vec![system.order, system.item]).await
        }
    }
}

async fn run_until_signal(services: Vec<ServiceHandle>) -> anyhow::Result<()> {
    tokio::signal::ctrl_c()
        .await
        .context("unable to listen for shutdown signal")?;
    info!("Shutdown signal received");

    for service in services {
        let name = service.name();
        service
            .shutdown()
            .await
            .with_context(|| format!("{name} service did not shut down cleanly"))?;
    }
    Ok(())
}
