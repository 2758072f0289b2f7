use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use tracing::info;

use keyalign::config::Config;
use keyalign::dataset::Dataset;
use keyalign::keywords::align::{KeywordAligner, SentinelMode};
use keyalign::session::SessionContext;

/// keyalign: compare manual, GPT and Gemini keyword annotations.
///
/// Loads an activity spreadsheet, aligns the three keyword sets of one
/// activity into a table, and exports it as CSV.
#[derive(Parser)]
#[command(name = "keyalign", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the web interface
    #[cfg(feature = "web")]
    Serve {
        /// Port to listen on (default: KEYALIGN_PORT or 5002)
        #[arg(long)]
        port: Option<u16>,

        /// Address to bind (default: KEYALIGN_BIND or 127.0.0.1)
        #[arg(long)]
        bind: Option<String>,
    },

    /// List the selectable activity IDs in a spreadsheet
    Activities {
        /// Path to the .xlsx / .xls / .ods file
        file: PathBuf,
    },

    /// Align the keywords of one activity
    Compare {
        /// Path to the .xlsx / .xls / .ods file
        file: PathBuf,

        /// Activity ID to compare
        activity_id: String,

        /// Output format
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,

        /// Also write the CSV export (default name: comparison_<id>.csv)
        #[arg(long, num_args = 0..=1, value_name = "PATH")]
        export: Option<Option<PathBuf>>,

        /// Don't treat "-" placeholders as keywords
        #[arg(long)]
        exclude_sentinel: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Csv,
    Json,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("keyalign=info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        #[cfg(feature = "web")]
        Commands::Serve { port, bind } => {
            let config = Config::load()?;
            let port = port.unwrap_or(config.port);
            let bind = bind.unwrap_or_else(|| config.bind.clone());
            info!(sentinel_mode = ?config.sentinel_mode, "Starting web server");
            keyalign::web::run_server(config, port, &bind).await?;
        }

        Commands::Activities { file } => {
            let dataset = load_dataset(&file)?;
            keyalign::output::terminal::display_activity_ids(&dataset.activity_ids());
        }

        Commands::Compare {
            file,
            activity_id,
            format,
            export,
            exclude_sentinel,
        } => {
            let config = Config::load()?;
            let sentinel = if exclude_sentinel {
                SentinelMode::Exclude
            } else {
                config.sentinel_mode
            };
            let aligner = KeywordAligner::new(sentinel);

            let mut ctx = SessionContext::default();
            ctx.set_dataset(load_dataset(&file)?);

            let comparison = ctx
                .compare(&activity_id, &aligner)
                .with_context(|| format!("Comparison failed for activity '{activity_id}'"))?;

            match format {
                OutputFormat::Table => keyalign::output::terminal::display_alignment(
                    &comparison.activity_id,
                    &comparison.activity_name,
                    &comparison.table,
                ),
                OutputFormat::Csv => {
                    let bytes = keyalign::output::csv::export_csv(&comparison.table);
                    std::io::stdout().write_all(&bytes)?;
                }
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(comparison)?);
                }
            }

            if let Some(path) = export {
                let csv = ctx.export()?;
                let path = path.unwrap_or_else(|| PathBuf::from(&csv.filename));
                std::fs::write(&path, &csv.bytes)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                eprintln!(
                    "{}",
                    format!("CSV exported to: {}", path.display()).bold()
                );
            }
        }
    }

    Ok(())
}

fn load_dataset(path: &Path) -> Result<Dataset> {
    let dataset = Dataset::from_path(path)
        .with_context(|| format!("Failed to load spreadsheet {}", path.display()))?;
    info!(records = dataset.len(), path = %path.display(), "Spreadsheet loaded");
    Ok(dataset)
}
