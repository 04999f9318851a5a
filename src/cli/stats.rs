use anyhow::Result;

use drillbook::config::DrillbookConfig;
use drillbook::vocab::practice_log::Intensity;
use drillbook::vocab::types::ItemKind;

/// Display collection and practice statistics in the terminal.
pub async fn stats(config: &DrillbookConfig) -> Result<()> {
    let runtime = super::open_runtime(config).await?;

    let items = runtime.repo.all().await?;
    let days = runtime.log.days().await?;

    let words = items.iter().filter(|i| i.kind == ItemKind::Word).count();
    let sentences = items.len() - words;
    let total_practice: u64 = items.iter().map(|i| i.stats.practice_count).sum();
    let total_correct: u64 = items.iter().map(|i| i.stats.correct_count).sum();
    let total_error: u64 = items.iter().map(|i| i.stats.error_count).sum();

    println!("Drill Statistics");
    println!("{}", "=".repeat(40));
    println!("  Items:               {}", items.len());
    println!("  Words:               {words}");
    println!("  Sentences:           {sentences}");
    println!("  Total drills:        {total_practice}");
    println!("  Correct:             {total_correct}");
    println!("  Errors:              {total_error}");
    println!();

    if !items.is_empty() {
        let mut by_practice = items.clone();
        by_practice.sort_by(|a, b| b.stats.practice_count.cmp(&a.stats.practice_count));

        println!("Most drilled:");
        for item in by_practice.iter().take(10) {
            println!(
                "  {:<20} proficiency {:>5}   {} drills ({} correct / {} wrong)",
                item.primary_text,
                item.proficiency,
                item.stats.practice_count,
                item.stats.correct_count,
                item.stats.error_count
            );
        }
        println!();
    }

    if !days.is_empty() {
        println!("Recent practice days:");
        for (date, day) in days.iter().rev().take(7) {
            let intensity = match Intensity::for_item_count(day.item_ids.len()) {
                Intensity::None => "-",
                Intensity::Low => "low",
                Intensity::Medium => "medium",
                Intensity::High => "high",
            };
            println!(
                "  {date}  {:>3} items, {:>3} correct  [{intensity}]",
                day.item_ids.len(),
                day.correct_count
            );
        }
    }

    Ok(())
}
