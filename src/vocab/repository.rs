//! Typed CRUD and queries over the persisted item collection.
//!
//! Every operation materializes the collection fresh from the record store —
//! there is no long-lived cache. Mutations re-read, apply, and write the
//! whole collection back, so the last write wins wholesale and a read
//! immediately after a write always observes it. If decoding detects
//! records that needed backfilling, the healed collection is re-persisted
//! once before being returned.

use anyhow::Context;
use chrono::{Local, Utc};
use std::collections::BTreeSet;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::store::RecordStore;
use crate::vocab::normalize_primary_text;
use crate::vocab::types::{
    decode_items, encode_items, Item, ItemKind, ItemStats, INITIAL_PROFICIENCY,
};

/// Store key of the item collection.
pub const ITEMS_KEY: &str = "drillbook_items";

/// Partial update applied by [`ItemRepository::update`].
///
/// Merge is shallow: a provided `stats` replaces the stored one whole, it is
/// not deep-merged. `id`, `kind`, and `added_at` are immutable.
#[derive(Debug, Clone, Default)]
pub struct ItemPatch {
    pub primary_text: Option<String>,
    pub translations: Option<Vec<String>>,
    pub tags: Option<BTreeSet<String>>,
    pub proficiency: Option<i64>,
    pub stats: Option<ItemStats>,
}

/// Repository over the persisted item collection.
#[derive(Clone)]
pub struct ItemRepository {
    store: Arc<dyn RecordStore>,
}

impl ItemRepository {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Load the full collection, self-healing any records that predate the
    /// current schema.
    pub async fn all(&self) -> Result<Vec<Item>> {
        let Some(payload) = self.store.read(ITEMS_KEY).await? else {
            return Ok(Vec::new());
        };

        let (items, healed) =
            decode_items(&payload).context("failed to decode item collection")?;
        if healed {
            tracing::info!(count = items.len(), "migrated item records, re-persisting");
            self.persist(&items).await?;
        }
        Ok(items)
    }

    async fn persist(&self, items: &[Item]) -> Result<()> {
        let payload = encode_items(items).context("failed to encode item collection")?;
        self.store.write(ITEMS_KEY, &payload).await?;
        Ok(())
    }

    /// Create a new item with normalized primary text, a fresh unique id,
    /// initial proficiency, and zeroed stats.
    pub async fn create(
        &self,
        kind: ItemKind,
        primary_text: &str,
        translations: Vec<String>,
        tags: BTreeSet<String>,
    ) -> Result<Item> {
        let (primary_text, translations) = validate_fields(kind, primary_text, translations)?;

        let mut items = self.all().await?;
        let item = Item {
            id: assign_id(&items),
            kind,
            primary_text,
            translations,
            tags,
            proficiency: INITIAL_PROFICIENCY,
            added_at: Utc::now(),
            stats: ItemStats::default(),
        };
        items.push(item.clone());
        self.persist(&items).await?;

        tracing::debug!(id = %item.id, kind = %item.kind, "created item");
        Ok(item)
    }

    /// Shallow-merge `patch` into the item, persist, and return the updated
    /// record. `Ok(None)` if the id is unknown.
    pub async fn update(&self, id: &str, patch: ItemPatch) -> Result<Option<Item>> {
        let mut items = self.all().await?;
        let Some(item) = items.iter_mut().find(|i| i.id == id) else {
            return Ok(None);
        };

        if let Some(primary_text) = patch.primary_text {
            item.primary_text = normalize_primary_text(item.kind, &primary_text);
        }
        if let Some(translations) = patch.translations {
            item.translations = translations;
        }
        if let Some(tags) = patch.tags {
            item.tags = tags;
        }
        if let Some(proficiency) = patch.proficiency {
            item.proficiency = proficiency;
        }
        if let Some(stats) = patch.stats {
            item.stats = stats;
        }

        let updated = item.clone();
        self.persist(&items).await?;
        Ok(Some(updated))
    }

    /// Remove an item by id. Returns whether anything was removed.
    pub async fn delete(&self, id: &str) -> Result<bool> {
        let mut items = self.all().await?;
        let before = items.len();
        items.retain(|i| i.id != id);
        if items.len() == before {
            return Ok(false);
        }
        self.persist(&items).await?;
        Ok(true)
    }

    /// Lookup by id. Missing ids are `None`, never an error.
    pub async fn get_by_id(&self, id: &str) -> Result<Option<Item>> {
        Ok(self.all().await?.into_iter().find(|i| i.id == id))
    }

    /// The `n` items with the lowest proficiency, ascending. The sort is
    /// stable, so ties keep their stored (insertion) order.
    pub async fn lowest_by_proficiency(&self, n: usize) -> Result<Vec<Item>> {
        let mut items = self.all().await?;
        items.sort_by_key(|i| i.proficiency);
        items.truncate(n);
        Ok(items)
    }

    /// Items whose proficiency lies in `[min, max]`, inclusive.
    pub async fn by_proficiency_range(&self, min: i64, max: i64) -> Result<Vec<Item>> {
        let items = self.all().await?;
        Ok(items
            .into_iter()
            .filter(|i| i.proficiency >= min && i.proficiency <= max)
            .collect())
    }

    /// Items created on the current local calendar day.
    pub async fn by_added_today(&self) -> Result<Vec<Item>> {
        let today = Local::now().date_naive();
        let items = self.all().await?;
        Ok(items.into_iter().filter(|i| i.added_on(today)).collect())
    }

    /// Items carrying any of the requested tags; an empty set returns all.
    pub async fn by_tags(&self, tags: &BTreeSet<String>) -> Result<Vec<Item>> {
        let items = self.all().await?;
        Ok(items.into_iter().filter(|i| i.matches_tags(tags)).collect())
    }

    /// The duplicate-name convention used by bulk import and the CLI: if an
    /// item of the same kind with the same normalized primary text exists,
    /// reset its proficiency to [`INITIAL_PROFICIENCY`] and replace its
    /// translations and tags, preserving its id and stats; otherwise create.
    /// Returns the record and whether it was newly created.
    pub async fn upsert(
        &self,
        kind: ItemKind,
        primary_text: &str,
        translations: Vec<String>,
        tags: BTreeSet<String>,
    ) -> Result<(Item, bool)> {
        let (primary_text, translations) = validate_fields(kind, primary_text, translations)?;

        let mut items = self.all().await?;
        if let Some(item) = items
            .iter_mut()
            .find(|i| i.kind == kind && i.primary_text == primary_text)
        {
            item.proficiency = INITIAL_PROFICIENCY;
            item.translations = translations;
            item.tags = tags;
            let updated = item.clone();
            self.persist(&items).await?;
            tracing::debug!(id = %updated.id, "reset existing item via upsert");
            return Ok((updated, false));
        }

        let item = Item {
            id: assign_id(&items),
            kind,
            primary_text,
            translations,
            tags,
            proficiency: INITIAL_PROFICIENCY,
            added_at: Utc::now(),
            stats: ItemStats::default(),
        };
        items.push(item.clone());
        self.persist(&items).await?;
        Ok((item, true))
    }

    /// Overwrite the entire collection. Used by snapshot import and reset.
    pub async fn replace_all(&self, items: Vec<Item>) -> Result<()> {
        self.persist(&items).await
    }
}

/// Normalize and validate create/upsert inputs.
fn validate_fields(
    kind: ItemKind,
    primary_text: &str,
    translations: Vec<String>,
) -> Result<(String, Vec<String>)> {
    let primary_text = normalize_primary_text(kind, primary_text);
    if primary_text.is_empty() {
        return Err(Error::Validation("primary text must not be empty".into()));
    }

    let translations: Vec<String> = translations
        .into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect();
    if translations.is_empty() {
        return Err(Error::Validation(
            "at least one translation is required".into(),
        ));
    }

    Ok((primary_text, translations))
}

/// Assign a fresh id, re-rolling on the (vanishingly unlikely) collision
/// with an existing record.
fn assign_id(items: &[Item]) -> String {
    loop {
        let id = uuid::Uuid::now_v7().to_string();
        if !items.iter().any(|i| i.id == id) {
            return id;
        }
    }
}
