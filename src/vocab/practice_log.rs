//! Per-day aggregation of drill activity.
//!
//! Each local calendar day gets one [`PracticeDay`]: the set of item ids
//! drilled (deduplicated) and a correct-submission tally (not deduplicated).
//! Entries are created lazily on the first drill of a day, mutated
//! additively, and only removed by a bulk reset or snapshot import.

use anyhow::Context;
use chrono::{Local, NaiveDate};
use std::sync::Arc;

use crate::error::Result;
use crate::store::RecordStore;
use crate::vocab::types::{decode_log, encode_log, PracticeDay, PracticeDays};

/// Store key of the practice log.
pub const PRACTICE_LOG_KEY: &str = "drillbook_practice_log";

/// Format a local calendar date as a log key.
pub fn day_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Today's log key, in local time.
pub fn today_key() -> String {
    day_key(Local::now().date_naive())
}

/// Heatmap bucket for one day, by distinct-item count. The thresholds are a
/// rendering convention for the collaborator's calendar view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intensity {
    /// No practice.
    None,
    /// 1–5 distinct items.
    Low,
    /// 6–15 distinct items.
    Medium,
    /// 16 or more distinct items.
    High,
}

impl Intensity {
    pub fn for_item_count(count: usize) -> Self {
        match count {
            0 => Self::None,
            1..=5 => Self::Low,
            6..=15 => Self::Medium,
            _ => Self::High,
        }
    }
}

/// Day-keyed drill history over the record store.
#[derive(Clone)]
pub struct PracticeLog {
    store: Arc<dyn RecordStore>,
}

impl PracticeLog {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Load the full log, self-healing legacy payloads.
    pub async fn days(&self) -> Result<PracticeDays> {
        let Some(payload) = self.store.read(PRACTICE_LOG_KEY).await? else {
            return Ok(PracticeDays::new());
        };

        let (days, healed) = decode_log(&payload).context("failed to decode practice log")?;
        if healed {
            tracing::info!(days = days.len(), "migrated practice log, re-persisting");
            self.persist(&days).await?;
        }
        Ok(days)
    }

    async fn persist(&self, days: &PracticeDays) -> Result<()> {
        let payload = encode_log(days).context("failed to encode practice log")?;
        self.store.write(PRACTICE_LOG_KEY, &payload).await?;
        Ok(())
    }

    /// Record one drill of `item_id` today. Adding the same item again is a
    /// no-op for the day's set, but a correct answer still bumps the tally.
    pub async fn record(&self, item_id: &str, correct: bool) -> Result<()> {
        let mut days = self.days().await?;
        let day = days.entry(today_key()).or_insert_with(PracticeDay::default);
        day.item_ids.insert(item_id.to_string());
        if correct {
            day.correct_count += 1;
        }
        self.persist(&days).await
    }

    /// Overwrite the entire log. Used by snapshot import and reset.
    pub async fn replace_all(&self, days: PracticeDays) -> Result<()> {
        self.persist(&days).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::local::LocalTier;
    use crate::store::LocalOnlyStore;

    fn test_log() -> PracticeLog {
        let local = Arc::new(LocalTier::open_in_memory().unwrap());
        PracticeLog::new(Arc::new(LocalOnlyStore::new(local)))
    }

    #[tokio::test]
    async fn first_record_creates_todays_entry() {
        let log = test_log();
        log.record("item-a", true).await.unwrap();

        let days = log.days().await.unwrap();
        let day = &days[&today_key()];
        assert!(day.item_ids.contains("item-a"));
        assert_eq!(day.correct_count, 1);
    }

    #[tokio::test]
    async fn repeat_drills_deduplicate_ids_but_accumulate_correct() {
        let log = test_log();
        log.record("item-a", true).await.unwrap();
        log.record("item-a", true).await.unwrap();
        log.record("item-a", false).await.unwrap();

        let days = log.days().await.unwrap();
        let day = &days[&today_key()];
        assert_eq!(day.item_ids.len(), 1);
        assert_eq!(day.correct_count, 2);
    }

    #[test]
    fn intensity_bucket_edges() {
        assert_eq!(Intensity::for_item_count(0), Intensity::None);
        assert_eq!(Intensity::for_item_count(1), Intensity::Low);
        assert_eq!(Intensity::for_item_count(5), Intensity::Low);
        assert_eq!(Intensity::for_item_count(6), Intensity::Medium);
        assert_eq!(Intensity::for_item_count(15), Intensity::Medium);
        assert_eq!(Intensity::for_item_count(16), Intensity::High);
    }
}
