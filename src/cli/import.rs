use anyhow::{bail, Context, Result};
use std::io::Write;
use std::path::Path;

use drillbook::config::DrillbookConfig;
use drillbook::vocab::snapshot::{self, Snapshot};

/// Import a snapshot from a JSON file.
///
/// The current item collection and practice log are overwritten wholesale,
/// so the import asks for confirmation first.
pub async fn import(config: &DrillbookConfig, file: &Path) -> Result<()> {
    let json = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read import file: {}", file.display()))?;

    let snapshot: Snapshot =
        serde_json::from_str(&json).context("failed to parse import JSON")?;

    println!(
        "Importing {} items and {} practice-log days (exported {}).",
        snapshot.items.len(),
        snapshot.practice_log.len(),
        snapshot.exported_at
    );
    println!("WARNING: This REPLACES all current items and practice history.");
    print!("\nType YES to confirm: ");
    std::io::stdout().flush()?;

    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;

    if input.trim() != "YES" {
        bail!("import cancelled");
    }

    let runtime = super::open_runtime(config).await?;
    let items = snapshot.items.len();
    let days = snapshot.practice_log.len();
    snapshot::restore(&runtime.repo, &runtime.log, snapshot).await?;

    println!("Import complete: {items} items, {days} practice-log days.");
    Ok(())
}
