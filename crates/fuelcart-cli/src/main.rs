mod catalog;
mod checkout;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use fuelcart_core::PackLine;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "fuelcart")]
#[command(about = "STYRKR bundle catalog and checkout tooling")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Resolve the identifier catalog from the Shopify Admin API
    BuildCatalog {
        /// Where to write the catalog (defaults to `FUELCART_CATALOG_PATH`)
        #[arg(long)]
        output: Option<PathBuf>,
        /// Admin API version (defaults to `SHOPIFY_API_VERSION`)
        #[arg(long)]
        api_version: Option<String>,
    },
    /// Report catalog entries that still hold placeholder values
    AuditCatalog,
    /// Add a bundle to the cart through the bundle service
    Checkout {
        /// Pack line as KEY=QTY; repeatable
        #[arg(long = "line", value_name = "KEY=QTY", required = true)]
        lines: Vec<PackLine>,
        /// Buy once instead of subscribing
        #[arg(long)]
        one_time: bool,
    },
    /// Print a bundle-builder link that pre-fills the given lines
    PrefillLink {
        /// Pack line as KEY=QTY; repeatable
        #[arg(long = "line", value_name = "KEY=QTY", required = true)]
        lines: Vec<PackLine>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // `--help` and argument errors exit here, before any env var is read.
    let cli = Cli::parse();

    dotenvy::dotenv().ok();
    let config = fuelcart_core::load_app_config_from_env()?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Some(Commands::BuildCatalog {
            output,
            api_version,
        }) => catalog::run_build_catalog(&config, output, api_version).await,
        Some(Commands::AuditCatalog) => catalog::run_audit_catalog(&config),
        Some(Commands::Checkout { lines, one_time }) => {
            checkout::run_checkout(&config, &lines, !one_time).await
        }
        Some(Commands::PrefillLink { lines }) => checkout::run_prefill_link(&config, &lines),
        None => {
            println!("no command given; run `fuelcart --help` for usage");
            Ok(())
        }
    }
}
