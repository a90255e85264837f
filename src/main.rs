// Main entry point - configuration, wiring and the per-entry job loop
mod domain;
mod application;
mod infrastructure;
mod presentation;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::application::runner::JobRunner;
use crate::domain::project_data::parse_project_data;
use crate::infrastructure::config::load_client_settings;
use crate::infrastructure::tableau_client::TableauClient;
use crate::presentation::cli::Args;
use crate::presentation::report::render_outcome;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "tableau_publisher=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if let Err(e) = run(args).await {
        tracing::error!("{:#}", e);
        println!("Workbook not published.\n {:#}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    // Load configuration
    let settings = load_client_settings(args.config.as_deref()).context("Could not load settings")?;
    let entries = parse_project_data(&args.project_data).context("Invalid --project_data JSON")?;
    let credentials = args.credentials();

    tracing::info!("Processing {} project data entries", entries.len());

    for data in &entries {
        // Each entry may point at a different server
        let client = TableauClient::connect(&data.server_url, &settings).await?;
        tracing::debug!("Using REST API {} for {}", client.api_version(), data.server_url);
        let runner = JobRunner::new(Arc::new(client), settings.workbooks_dir.clone());

        let outcome = runner.run(data, &credentials).await?;
        print!("{}", render_outcome(data, &outcome));
    }

    Ok(())
}
