//! Repair-shop inventory command line
//!
//! `shop-inventory [list|analytics|export <csv|xlsx|pdf>]`

use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;
use shared::{format_currency, LabelLookup};
use shop_inventory::services::{export, ExportFormat, TracingSink};
use shop_inventory::{ChangeChannel, ClientConfig, HttpInventoryGateway, InventoryStore, SessionContext};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

enum Command {
    List,
    Analytics,
    Export(Option<ExportFormat>),
}

fn parse_command(args: &[String]) -> anyhow::Result<Command> {
    match args.first().map(String::as_str) {
        None | Some("list") => Ok(Command::List),
        Some("analytics") => Ok(Command::Analytics),
        Some("export") => {
            let format = args.get(1).map(|f| f.parse::<ExportFormat>()).transpose()?;
            Ok(Command::Export(format))
        }
        Some(other) => anyhow::bail!("Unknown command: {} (expected list, analytics or export)", other),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = ClientConfig::load()?;

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.filter.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = parse_command(&args)?;

    tracing::info!("Environment: {}", config.environment);

    let token = config.api.token.clone();
    let session = SessionContext::from_jwt(token.clone()).unwrap_or_else(|_| SessionContext::new(token, None));
    let gateway = HttpInventoryGateway::new(&config.api.base_url, config.api.timeout())?;
    let store = InventoryStore::new(
        Arc::new(gateway),
        ChangeChannel::new(),
        Arc::new(TracingSink),
        session,
    );

    store.list().await.context("Failed to load products")?;

    match command {
        Command::List => {
            for product in store.products() {
                println!(
                    "{:<12} {:<32} {:>6} {:>6} {:>12}",
                    product.code,
                    product.name,
                    product.stock,
                    product.min_stock,
                    format_currency(product.value())
                );
            }
        }
        Command::Analytics => {
            println!("{}", serde_json::to_string_pretty(&store.analytics())?);
        }
        Command::Export(format) => {
            let format = format.unwrap_or(config.export.default_format);
            let artifact = export::serialize(&store.products(), format, &LabelLookup::default(), Utc::now())?;

            std::fs::create_dir_all(&config.export.directory)?;
            let path = config.export.directory.join(&artifact.file_name);
            std::fs::write(&path, &artifact.bytes)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            tracing::info!(path = %path.display(), "Export written");
            println!("{}", path.display());
        }
    }

    Ok(())
}
