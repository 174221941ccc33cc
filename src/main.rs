use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};

use storefront::api::InMemoryCatalog;
use storefront::app::App;
use storefront::config::Config;
use storefront::diagnostics::TracingSink;
use storefront::logging::init_tracing;
use storefront::storage::JsonFileCartStorage;

#[derive(Parser)]
#[command(name = "storefront")]
#[command(about = "Headless storefront: load a catalog, open a page, print the result")]
struct Cli {
    /// Config file (default: platform config dir)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Product catalog as a JSON array
    #[arg(long)]
    catalog: Option<PathBuf>,
    /// Page to open
    #[arg(long, default_value = "/")]
    route: String,
    /// Output format
    #[arg(long, value_enum, default_value_t = Output::Json)]
    output: Output,
}

#[derive(Clone, Copy, ValueEnum)]
enum Output {
    /// Final application state
    Json,
    /// Outline of the rendered page
    Text,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
    .context("loading config")?;

    let catalog = match &cli.catalog {
        Some(path) => InMemoryCatalog::load_from(path)?,
        None => InMemoryCatalog::new(Vec::new())?,
    };
    tracing::info!(products = catalog.len(), "Catalog loaded");

    let storage = JsonFileCartStorage::new(config.cart_storage_path());
    let mut app = App::new(
        &config,
        Arc::new(catalog),
        Arc::new(storage),
        Arc::new(TracingSink),
    );
    app.start(&cli.route);
    app.run_until_idle().await;

    match cli.output {
        Output::Json => {
            let state = app.store().get_state();
            println!("{}", serde_json::to_string_pretty(&*state)?);
        }
        Output::Text => println!("{}", app.document().snapshot().outline()),
    }

    app.shutdown();
    Ok(())
}
