//! Best-effort stats recovery.
//!
//! [`repair_stats`] restores the `practice_count == correct_count +
//! error_count` invariant for records damaged by older versions or partial
//! imports. Where the correct/error breakdown is gone entirely, it
//! approximates one with the historical 60/40 correct-to-error split — an
//! admitted guess, reported as such, and only ever run explicitly via
//! `doctor --repair`.

use crate::error::Result;
use crate::vocab::practice_log::PracticeLog;
use crate::vocab::repository::{ItemPatch, ItemRepository};
use crate::vocab::types::ItemStats;

/// What a repair pass did.
#[derive(Debug, Default)]
pub struct RepairReport {
    pub scanned: usize,
    /// Records whose counters disagreed and were recomputed exactly.
    pub invariant_fixed: usize,
    /// Records rebuilt with the approximate 60/40 split.
    pub approximated: usize,
}

impl RepairReport {
    pub fn touched(&self) -> usize {
        self.invariant_fixed + self.approximated
    }
}

/// Scan every item and repair inconsistent stats.
///
/// Exact repair: when a correct/error breakdown exists, `practice_count` is
/// recomputed from it. Approximate repair: when the breakdown is zero but
/// the item shows practice history (its own `practice_count`, or failing
/// that its appearances in the practice log), the total is split 60/40
/// correct/error. The approximation is lossy; treat the result as a best
/// effort, not ground truth.
pub async fn repair_stats(repo: &ItemRepository, log: &PracticeLog) -> Result<RepairReport> {
    let items = repo.all().await?;
    let days = log.days().await?;

    let mut report = RepairReport {
        scanned: items.len(),
        ..Default::default()
    };

    for item in items {
        if item.stats.is_consistent() && item.stats.practice_count > 0 {
            continue;
        }

        let breakdown = item.stats.correct_count + item.stats.error_count;
        let repaired = if breakdown > 0 {
            report.invariant_fixed += 1;
            ItemStats {
                practice_count: breakdown,
                ..item.stats
            }
        } else {
            // No breakdown survives; fall back to the item's own total, or
            // count the log days it was drilled on
            let total = if item.stats.practice_count > 0 {
                item.stats.practice_count
            } else {
                days.values().filter(|d| d.item_ids.contains(&item.id)).count() as u64
            };
            if total == 0 {
                continue; // genuinely never practiced
            }

            report.approximated += 1;
            let correct_count = (total as f64 * 0.6).round() as u64;
            ItemStats {
                practice_count: total,
                correct_count,
                error_count: total - correct_count,
                ..item.stats
            }
        };

        tracing::info!(id = %item.id, ?repaired, "repaired item stats");
        repo.update(
            &item.id,
            ItemPatch {
                stats: Some(repaired),
                ..Default::default()
            },
        )
        .await?;
    }

    Ok(report)
}
