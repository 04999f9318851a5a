//! Core item and practice-log type definitions.
//!
//! Defines [`ItemKind`] (the two practiced unit kinds), [`Item`] (a full
//! record with its cumulative [`ItemStats`]), [`PracticeDay`] (one calendar
//! day of drill history), and the versioned storage envelopes with their
//! explicit migration functions.
//!
//! Collections are persisted as `{"version": N, "items"/"days": ...}`. The
//! decoders also accept the legacy unversioned forms (a bare array / bare
//! map, possibly missing the `stats` and `tags` substructures) and report
//! whether anything had to be backfilled, so the repository can re-persist
//! the healed collection once and make the migration self-healing.

use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Storage envelope version written by the current binary.
pub const COLLECTION_VERSION: u32 = 2;

/// Proficiency assigned to every newly created (or upserted) item.
pub const INITIAL_PROFICIENCY: i64 = -100;

/// The two kinds of practiced unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    /// A single word; spelling is practiced letter by letter.
    Word,
    /// A normalized sentence; compared with punctuation stripped.
    Sentence,
}

impl ItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Word => "word",
            Self::Sentence => "sentence",
        }
    }
}

impl std::fmt::Display for ItemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ItemKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "word" => Ok(Self::Word),
            "sentence" => Ok(Self::Sentence),
            _ => Err(format!("unknown item kind: {s}")),
        }
    }
}

/// Cumulative per-item drill counters.
///
/// Invariant: `practice_count == correct_count + error_count` after every
/// update — the counters are only ever committed together.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStats {
    pub practice_count: u64,
    pub correct_count: u64,
    pub error_count: u64,
    pub last_practice_at: Option<DateTime<Utc>>,
}

impl ItemStats {
    /// Whether the counter invariant holds.
    pub fn is_consistent(&self) -> bool {
        self.practice_count == self.correct_count + self.error_count
    }
}

/// A practiced unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// UUID v7, collision-checked against the collection at assignment time.
    pub id: String,
    /// Word or sentence.
    pub kind: ItemKind,
    /// The string to be typed exactly (normalized on create).
    pub primary_text: String,
    /// Gloss strings; non-empty.
    pub translations: Vec<String>,
    /// Free-form labels; deduplicated, order-irrelevant.
    pub tags: BTreeSet<String>,
    /// Signed ranking score; lower means more urgently due. Starts at
    /// [`INITIAL_PROFICIENCY`], +1 per correct submission, -1 per error.
    pub proficiency: i64,
    /// Creation timestamp, immutable.
    pub added_at: DateTime<Utc>,
    pub stats: ItemStats,
}

impl Item {
    /// Whether this item was created on the given local calendar day.
    pub fn added_on(&self, day: NaiveDate) -> bool {
        self.added_at.with_timezone(&Local).date_naive() == day
    }

    /// Whether this item carries any of the requested tags. An empty
    /// request means "no filter" and matches everything.
    pub fn matches_tags(&self, tags: &BTreeSet<String>) -> bool {
        tags.is_empty() || self.tags.intersection(tags).next().is_some()
    }
}

/// One calendar day of drill history.
///
/// `item_ids` is a true set in memory; at the storage boundary it serializes
/// as a deduplicated ordered sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PracticeDay {
    pub item_ids: BTreeSet<String>,
    /// Correct submissions that day — not deduplicated by item.
    pub correct_count: u64,
}

/// Day-keyed practice log, keys are local dates formatted `YYYY-MM-DD`.
pub type PracticeDays = BTreeMap<String, PracticeDay>;

// ---------------------------------------------------------------------------
// Storage envelopes and migration
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct ItemsEnvelope<'a> {
    version: u32,
    items: &'a [Item],
}

#[derive(Debug, Serialize)]
struct LogEnvelope<'a> {
    version: u32,
    days: &'a PracticeDays,
}

/// Pre-migration item record. Early collections stored words only and had
/// neither `kind` nor `tags` nor `stats`.
#[derive(Debug, Deserialize)]
struct RawItem {
    id: String,
    #[serde(default)]
    kind: Option<ItemKind>,
    primary_text: String,
    translations: Vec<String>,
    #[serde(default)]
    tags: Option<BTreeSet<String>>,
    proficiency: i64,
    added_at: DateTime<Utc>,
    #[serde(default)]
    stats: Option<ItemStats>,
}

impl RawItem {
    /// Returns the typed record and whether any substructure was backfilled.
    fn migrate(self) -> (Item, bool) {
        let healed = self.kind.is_none() || self.tags.is_none() || self.stats.is_none();
        let item = Item {
            id: self.id,
            kind: self.kind.unwrap_or(ItemKind::Word),
            primary_text: self.primary_text,
            translations: self.translations,
            tags: self.tags.unwrap_or_default(),
            proficiency: self.proficiency,
            added_at: self.added_at,
            stats: self.stats.unwrap_or_default(),
        };
        (item, healed)
    }
}

#[derive(Debug, Deserialize)]
struct RawDay {
    #[serde(default)]
    item_ids: Vec<String>,
    #[serde(default)]
    correct_count: u64,
}

/// Decode an item collection payload.
///
/// Accepts the current versioned envelope or the legacy bare array. Returns
/// the typed items plus a flag indicating the payload needs re-persisting
/// (legacy envelope, or any record that required backfilling).
pub fn decode_items(payload: &str) -> Result<(Vec<Item>, bool), serde_json::Error> {
    let value: serde_json::Value = serde_json::from_str(payload)?;

    let (raw_items, mut healed) = match value {
        serde_json::Value::Array(entries) => (entries, true),
        serde_json::Value::Object(mut map) => {
            let entries = match map.remove("items") {
                Some(serde_json::Value::Array(entries)) => entries,
                _ => Vec::new(),
            };
            let version = map.get("version").and_then(|v| v.as_u64()).unwrap_or(0);
            (entries, version < u64::from(COLLECTION_VERSION))
        }
        _ => (Vec::new(), true),
    };

    let mut items = Vec::with_capacity(raw_items.len());
    for entry in raw_items {
        let raw: RawItem = serde_json::from_value(entry)?;
        let (item, item_healed) = raw.migrate();
        healed |= item_healed;
        items.push(item);
    }
    Ok((items, healed))
}

/// Encode an item collection into the current envelope.
pub fn encode_items(items: &[Item]) -> Result<String, serde_json::Error> {
    serde_json::to_string(&ItemsEnvelope {
        version: COLLECTION_VERSION,
        items,
    })
}

/// Decode a practice-log payload, accepting the current envelope or the
/// legacy bare day-map. Duplicate ids inside a stored day collapse into the
/// in-memory set.
pub fn decode_log(payload: &str) -> Result<(PracticeDays, bool), serde_json::Error> {
    let value: serde_json::Value = serde_json::from_str(payload)?;

    let (raw_days, healed) = match value {
        serde_json::Value::Object(mut map) => {
            if map.contains_key("version") || map.contains_key("days") {
                let days = match map.remove("days") {
                    Some(serde_json::Value::Object(days)) => days,
                    _ => serde_json::Map::new(),
                };
                let version = map.get("version").and_then(|v| v.as_u64()).unwrap_or(0);
                (days, version < u64::from(COLLECTION_VERSION))
            } else {
                (map, true)
            }
        }
        _ => (serde_json::Map::new(), true),
    };

    let mut days = PracticeDays::new();
    for (date, entry) in raw_days {
        let raw: RawDay = serde_json::from_value(entry)?;
        days.insert(
            date,
            PracticeDay {
                item_ids: raw.item_ids.into_iter().collect(),
                correct_count: raw.correct_count,
            },
        );
    }
    Ok((days, healed))
}

/// Encode a practice log into the current envelope.
pub fn encode_log(days: &PracticeDays) -> Result<String, serde_json::Error> {
    serde_json::to_string(&LogEnvelope {
        version: COLLECTION_VERSION,
        days,
    })
}
