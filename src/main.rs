mod cli;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use drillbook::config::DrillbookConfig;

#[derive(Parser)]
#[command(name = "drillbook", version, about = "Adaptive vocabulary drills")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run an interactive practice session
    Practice {
        /// Item kind to drill: word or sentence
        #[arg(long, default_value = "word")]
        kind: String,
        /// Only drill items added today
        #[arg(long)]
        today_new: bool,
        /// Only drill items carrying this tag
        #[arg(long)]
        tag: Option<String>,
        /// Lower proficiency bound
        #[arg(long)]
        min: Option<i64>,
        /// Upper proficiency bound
        #[arg(long)]
        max: Option<i64>,
    },
    /// Add one item (translations comma-separated)
    Add {
        text: String,
        translations: String,
        /// Item kind: word or sentence
        #[arg(long, default_value = "word")]
        kind: String,
        /// Comma-separated tags
        #[arg(long)]
        tags: Option<String>,
    },
    /// Bulk-add items from a text file (one `text translations` line each)
    Bulk { file: PathBuf },
    /// Export all items and the practice log as JSON to stdout
    Export,
    /// Import a snapshot, overwriting the current collections
    Import { file: PathBuf },
    /// Show collection and practice statistics
    Stats,
    /// Run storage diagnostics
    Doctor {
        /// Repair inconsistent item stats (best-effort)
        #[arg(long)]
        repair: bool,
    },
    /// Delete all items and practice history
    Reset,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load config (for log level)
    let config = DrillbookConfig::load()?;

    // Initialize tracing with the configured log level.
    // Log to stderr so stdout stays clean for exported JSON.
    let filter = EnvFilter::try_new(&config.app.log_level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Practice {
            kind,
            today_new,
            tag,
            min,
            max,
        } => {
            cli::practice::practice(&config, &kind, today_new, tag, min, max).await?;
        }
        Command::Add {
            text,
            translations,
            kind,
            tags,
        } => {
            cli::add::add(&config, &kind, &text, &translations, tags.as_deref()).await?;
        }
        Command::Bulk { file } => {
            cli::add::bulk(&config, &file).await?;
        }
        Command::Export => {
            cli::export::export(&config).await?;
        }
        Command::Import { file } => {
            cli::import::import(&config, &file).await?;
        }
        Command::Stats => {
            cli::stats::stats(&config).await?;
        }
        Command::Doctor { repair } => {
            cli::doctor::doctor(&config, repair).await?;
        }
        Command::Reset => {
            cli::reset::reset(&config).await?;
        }
    }

    Ok(())
}
