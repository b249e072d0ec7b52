use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use colored::*;
use tokio::sync::watch;
use tracing::error;
use tracing_subscriber::EnvFilter;

use github_stars_harvester::cli::Cli;
use github_stars_harvester::error::HarvestError;
use github_stars_harvester::export::SnapshotWriter;
use github_stars_harvester::github::GitHubClient;
use github_stars_harvester::harvest::{HarvestConfig, HarvestOutcome, Harvester};
use github_stars_harvester::store::StarStore;

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file if it exists
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut cli = Cli::parse();

    // Override db_url if --local flag is set
    if cli.local {
        cli.db_url = "ws://localhost:8000".to_string();
        println!(
            "{}",
            "Running in local mode (DB URL: ws://localhost:8000)".yellow()
        );
    }

    match run(cli).await {
        Ok(outcome) => match outcome {
            HarvestOutcome::TargetReached { fetched } => {
                println!(
                    "{}",
                    format!("Crawling complete! {} repos fetched", fetched)
                        .bold()
                        .green()
                );
                ExitCode::SUCCESS
            }
            HarvestOutcome::SourceExhausted { fetched } => {
                println!(
                    "{}",
                    format!(
                        "Search exhausted after {} repos; snapshot contains partial data",
                        fetched
                    )
                    .yellow()
                );
                ExitCode::from(2)
            }
            HarvestOutcome::Cancelled { fetched } => {
                println!(
                    "{}",
                    format!("Stopped by operator after {} repos", fetched).yellow()
                );
                ExitCode::SUCCESS
            }
        },
        Err(err) => {
            error!(error = %err, "run failed");
            eprintln!("{}", format!("Fatal: {}", err).red());
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<HarvestOutcome, HarvestError> {
    println!("{}", "GitHub Stars Harvester".bold().green());
    println!("{}\n", "=".repeat(50).dimmed());

    let store = StarStore::new(
        &cli.db_url,
        &cli.db_user,
        &cli.db_pass,
        &cli.db_namespace,
        &cli.db_database,
    )
    .await
    .map_err(|e| HarvestError::WriteFailed(format!("failed to open database session: {e:#}")))?;

    store
        .ensure_schema()
        .await
        .map_err(|e| HarvestError::WriteFailed(format!("failed to define schema: {e:#}")))?;

    let fetcher = GitHubClient::new(cli.github_token.clone(), cli.search_query.clone())?;

    // Ctrl+C flips the shutdown flag; the driver notices it between pages
    // and during its timed pauses.
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            println!("\n{}", "Stopping after the current page...".yellow());
            let _ = shutdown_tx.send(true);
        }
    });

    let config = HarvestConfig {
        target_repos: cli.target_repos,
        page_size: cli.page_size,
        page_delay: Duration::from_secs(cli.page_delay_secs),
        retry_delay: Duration::from_secs(cli.retry_delay_secs),
        max_fetch_retries: cli.max_fetch_retries,
    };

    let mut harvester = Harvester::new(fetcher, store.clone(), config, shutdown_rx);
    let outcome = harvester.run().await?;

    let rows = store
        .snapshot_rows()
        .await
        .map_err(|e| HarvestError::ExportFailed(format!("failed reading snapshot rows: {e:#}")))?;

    let writer = SnapshotWriter::new(cli.csv_path.clone(), cli.json_path.clone());
    writer.write(&rows)?;

    println!("Saved {}", cli.csv_path.display());
    println!("Saved {}", cli.json_path.display());

    Ok(outcome)
}
