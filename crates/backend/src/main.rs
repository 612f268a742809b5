#![allow(clippy::too_many_arguments, clippy::derivable_impls)]

pub mod domain;
pub mod projections;
pub mod shared;
pub mod system;
pub mod usecases;

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use projections::p001_order_summary::service as summary_service;
use shared::config::{self, Config};
use usecases::u001_import_products_csv::{ImportExecutor, ProgressTracker};

#[derive(Parser)]
#[command(version, about = "Order summary aggregator and product CSV importer")]
struct Cli {
    /// Path to config.toml (default: next to the executable, then embedded defaults)
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Run the interval worker (recompute the summary every N seconds)
    Serve,
    /// One incremental aggregation run
    Recompute,
    /// Full recomputation of the summary over the whole ledger
    Rebuild,
    /// Print the summary row as JSON
    Summary,
    /// Import a product catalog CSV
    Import {
        #[arg(value_name = "FILE")]
        file: PathBuf,
        /// Variants per transaction (1..=1000)
        #[arg(long)]
        batch_size: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = config::load_config(cli.config.as_deref())?;
    system::tracing::initialize(Path::new(&config.logging.dir), &config.logging.level)?;

    let db_path = config::get_database_path(&config);
    tracing::info!("Database file: {}", db_path.display());
    let db = shared::data::db::initialize_database(&db_path)
        .await
        .with_context(|| format!("Failed to open database {}", db_path.display()))?;

    match cli.cmd {
        Cmd::Serve => serve(db, &config).await,
        Cmd::Recompute => {
            let outcome =
                summary_service::recompute(db, config.aggregator.watermark_policy).await?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
            Ok(())
        }
        Cmd::Rebuild => {
            let outcome = summary_service::rebuild(db, config.aggregator.watermark_policy).await?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
            Ok(())
        }
        Cmd::Summary => {
            match summary_service::get_summary(db).await? {
                Some(summary) => println!("{}", serde_json::to_string_pretty(&summary)?),
                None => println!("null"),
            }
            Ok(())
        }
        Cmd::Import { file, batch_size } => {
            let batch_size = batch_size.unwrap_or(config.importer.batch_size);
            config::validate_batch_size(batch_size)?;

            let executor =
                ImportExecutor::new(db.clone(), Arc::new(ProgressTracker::new()), batch_size);
            match executor.import_file(&file).await {
                Ok(report) => {
                    println!("{}", serde_json::to_string_pretty(&report)?);
                    Ok(())
                }
                Err(failure) => {
                    println!("{}", serde_json::to_string_pretty(&failure.report)?);
                    Err(anyhow::Error::new(failure.error)
                        .context(format!("Import of {} failed", file.display())))
                }
            }
        }
    }
}

async fn serve(db: &sea_orm::DatabaseConnection, config: &Config) -> anyhow::Result<()> {
    let worker = system::tasks::initialization::initialize_scheduled_tasks(db, config)?;

    tokio::select! {
        _ = worker.run_loop() => {}
        result = tokio::signal::ctrl_c() => {
            result?;
            tracing::info!("Shutdown signal received, stopping worker");
        }
    }
    Ok(())
}
