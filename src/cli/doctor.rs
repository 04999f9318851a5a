//! CLI `doctor` command — run storage diagnostics and print a health report.

use anyhow::Result;

use drillbook::config::DrillbookConfig;
use drillbook::vocab::maintenance;

/// Run storage diagnostics and print a health report. With `repair`, also
/// rebuild inconsistent item stats (best-effort).
pub async fn doctor(config: &DrillbookConfig, repair: bool) -> Result<()> {
    let db_path = config.resolved_db_path();

    if !db_path.exists() {
        println!("Database: not found at {}", db_path.display());
        println!("Run `drillbook add` or `drillbook practice` to initialize.");
        return Ok(());
    }

    let file_size = std::fs::metadata(&db_path).map(|m| m.len()).unwrap_or(0);

    let runtime = super::open_runtime(config).await?;
    let items = runtime.repo.all().await?;
    let days = runtime.log.days().await?;

    let inconsistent = items
        .iter()
        .filter(|i| !i.stats.is_consistent())
        .count();

    println!("Drillbook Health Report");
    println!("=======================");
    println!();
    println!("Database:          {}", db_path.display());
    println!("File size:         {}", format_bytes(file_size));
    println!(
        "Remote sync:       {}",
        match (&config.sync.base_url, &runtime.notice) {
            (None, _) => "not configured".to_string(),
            (Some(url), None) => format!("active ({url})"),
            (Some(_), Some(notice)) => format!("DEGRADED — {}", notice.message),
        }
    );
    println!();
    println!("Row counts:");
    println!("  Items:           {}", items.len());
    println!("  Practice days:   {}", days.len());
    println!();
    if inconsistent == 0 {
        println!("Stats invariant:   PASSED");
    } else {
        println!("Stats invariant:   FAILED ({inconsistent} items inconsistent)");
    }

    if repair {
        println!();
        let report = maintenance::repair_stats(&runtime.repo, &runtime.log).await?;
        println!("Repair pass:");
        println!("  Scanned:         {}", report.scanned);
        println!("  Recomputed:      {}", report.invariant_fixed);
        println!("  Approximated:    {} (60/40 split, best-effort)", report.approximated);
    } else if inconsistent > 0 {
        println!();
        println!("Run `drillbook doctor --repair` to rebuild inconsistent stats.");
    }

    Ok(())
}

fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
