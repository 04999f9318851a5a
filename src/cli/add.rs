//! CLI `add` and `bulk` commands — create items via the upsert convention.

use anyhow::{Context, Result};
use std::collections::BTreeSet;
use std::path::Path;

use drillbook::config::DrillbookConfig;
use drillbook::vocab::types::ItemKind;

/// Add a single item. An existing item with the same normalized text is
/// reset to -100 proficiency with its translations and tags replaced.
pub async fn add(
    config: &DrillbookConfig,
    kind: &str,
    text: &str,
    translations: &str,
    tags: Option<&str>,
) -> Result<()> {
    let kind: ItemKind = kind.parse().map_err(anyhow::Error::msg)?;
    let runtime = super::open_runtime(config).await?;

    let translations = split_list(translations);
    let tags: BTreeSet<String> = tags.map(split_list).unwrap_or_default().into_iter().collect();

    let (item, created) = runtime.repo.upsert(kind, text, translations, tags).await?;
    if created {
        println!("Added {} \"{}\" ({})", item.kind, item.primary_text, item.id);
    } else {
        println!(
            "\"{}\" already existed — proficiency reset to {}, translations updated",
            item.primary_text, item.proficiency
        );
    }
    Ok(())
}

/// Bulk-add words from a text file.
///
/// One item per line: the first whitespace separates the word from its
/// comma-separated translations; tokens starting with `#` become tags.
/// Existing words are reset via the upsert convention. Malformed lines are
/// skipped and reported.
pub async fn bulk(config: &DrillbookConfig, file: &Path) -> Result<()> {
    let contents = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read import file: {}", file.display()))?;

    let runtime = super::open_runtime(config).await?;

    let mut added = 0u64;
    let mut reset = 0u64;
    let mut errors: Vec<String> = Vec::new();

    for (index, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let Some((text, translations, tags)) = parse_line(line) else {
            errors.push(format!("line {}: missing translations", index + 1));
            continue;
        };

        match runtime
            .repo
            .upsert(ItemKind::Word, text, translations, tags)
            .await
        {
            Ok((_, true)) => added += 1,
            Ok((_, false)) => reset += 1,
            Err(e) => errors.push(format!("line {}: {e}", index + 1)),
        }
    }

    println!("Bulk import complete:");
    println!("  Added: {added}");
    println!("  Reset: {reset} (already existed)");
    if !errors.is_empty() {
        println!("  Skipped: {}", errors.len());
        for error in errors.iter().take(5) {
            println!("    {error}");
        }
    }
    Ok(())
}

/// Split one bulk line into `(text, translations, tags)`.
fn parse_line(line: &str) -> Option<(&str, Vec<String>, BTreeSet<String>)> {
    let (text, rest) = line.split_once(char::is_whitespace)?;

    let mut translations = Vec::new();
    let mut tags = BTreeSet::new();
    for token in split_list(rest) {
        if let Some(tag) = token.strip_prefix('#') {
            tags.insert(tag.to_string());
        } else {
            translations.push(token);
        }
    }

    if translations.is_empty() {
        return None;
    }
    Some((text, translations, tags))
}

/// Split on ASCII and fullwidth commas, trimming and dropping empties.
fn split_list(s: &str) -> Vec<String> {
    s.split([',', '，'])
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}
