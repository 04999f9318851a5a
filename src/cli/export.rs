use anyhow::Result;

use drillbook::config::DrillbookConfig;
use drillbook::vocab::snapshot;

/// Export all items and the practice log as JSON to stdout.
pub async fn export(config: &DrillbookConfig) -> Result<()> {
    let runtime = super::open_runtime(config).await?;

    let snapshot = snapshot::take(&runtime.repo, &runtime.log).await?;

    let json = serde_json::to_string_pretty(&snapshot)?;
    println!("{json}");

    eprintln!(
        "Exported {} items and {} practice-log days.",
        snapshot.items.len(),
        snapshot.practice_log.len()
    );

    Ok(())
}
