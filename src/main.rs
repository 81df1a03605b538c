use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{Datelike, Utc};
use clap::{Parser, Subcommand};
use sqlx::postgres::PgPoolOptions;
use tracing::info;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

mod analytics;
mod db;
mod models;
mod report;

use models::{RowSets, School};

#[derive(Parser)]
#[command(name = "school-cpd-dashboard")]
#[command(about = "Per-school CPD learning analytics over workshops, enrollments and feedback", long_about = None)]
struct Cli {
    /// Read row sets from CSV files in this directory instead of Postgres
    #[arg(long, global = true)]
    csv_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Emit the full analytics document as JSON
    Dashboard {
        #[arg(long)]
        school: Uuid,
        /// Calendar year for the login activity chart (defaults to the current year)
        #[arg(long)]
        year: Option<i32>,
        /// Write to a file instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
        /// Single-line JSON instead of pretty-printed
        #[arg(long)]
        compact: bool,
    },
    /// Generate a markdown report
    Report {
        #[arg(long)]
        school: Uuid,
        #[arg(long)]
        year: Option<i32>,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Dashboard {
            school,
            year,
            out,
            compact,
        } => {
            let year = year.unwrap_or_else(|| Utc::now().year());
            let (details, rows) = gather(cli.csv_dir.as_deref(), school, year).await?;
            let dashboard =
                analytics::build_dashboard(details, &rows, year, Utc::now().date_naive());

            let json = if compact {
                serde_json::to_string(&dashboard)?
            } else {
                serde_json::to_string_pretty(&dashboard)?
            };
            match out {
                Some(path) => {
                    std::fs::write(&path, json)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    println!("Dashboard written to {}.", path.display());
                }
                None => println!("{json}"),
            }
        }
        Commands::Report { school, year, out } => {
            let year = year.unwrap_or_else(|| Utc::now().year());
            let (details, rows) = gather(cli.csv_dir.as_deref(), school, year).await?;
            let dashboard =
                analytics::build_dashboard(details, &rows, year, Utc::now().date_naive());
            let report = report::build_report(&dashboard, year);
            std::fs::write(&out, report)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}

/// Resolve the school and its row sets from either input path. A school the
/// lookup cannot find is an error; everything else empty is just empty.
async fn gather(
    csv_dir: Option<&Path>,
    school_id: Uuid,
    year: i32,
) -> anyhow::Result<(School, RowSets)> {
    let (school, rows) = match csv_dir {
        Some(dir) => {
            info!(dir = %dir.display(), "loading row sets from CSV");
            (
                db::load_school_from_dir(dir, school_id)?,
                db::load_rowsets_from_dir(dir)?,
            )
        }
        None => {
            let database_url = std::env::var("DATABASE_URL")
                .context("DATABASE_URL must be set when --csv-dir is not given")?;
            let pool = PgPoolOptions::new()
                .max_connections(5)
                .connect(&database_url)
                .await
                .context("failed to connect to Postgres")?;
            (
                db::fetch_school(&pool, school_id).await?,
                db::fetch_rowsets(&pool, school_id, year).await?,
            )
        }
    };

    let school = school.with_context(|| format!("school {school_id} not found"))?;
    Ok((school, rows))
}
