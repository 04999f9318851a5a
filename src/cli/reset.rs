//! CLI `reset` command — delete all items and history after user confirmation.

use anyhow::{bail, Result};
use std::io::Write;

use drillbook::config::DrillbookConfig;
use drillbook::vocab::types::PracticeDays;

/// Delete all items and practice history after user confirmation. Empty
/// collections are written through the store so a synced remote tier is
/// reset too.
pub async fn reset(config: &DrillbookConfig) -> Result<()> {
    println!("WARNING: This will permanently delete ALL items and practice history.");
    println!("Database: {}", config.resolved_db_path().display());
    print!("\nType YES to confirm: ");
    std::io::stdout().flush()?;

    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;

    if input.trim() != "YES" {
        bail!("reset cancelled");
    }

    let runtime = super::open_runtime(config).await?;
    runtime.repo.replace_all(Vec::new()).await?;
    runtime.log.replace_all(PracticeDays::new()).await?;

    println!("All items deleted. Collections reset.");
    Ok(())
}
