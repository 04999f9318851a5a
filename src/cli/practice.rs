//! CLI `practice` command — an interactive drill session in the terminal.
//!
//! This is the collaborator side of the scheduler contract: it renders
//! prompts, feeds whole-line answers into `submit_answer`, and paces the
//! session with the exported delay constants.

use anyhow::Result;
use std::io::Write;

use drillbook::config::DrillbookConfig;
use drillbook::error::Error;
use drillbook::vocab::scheduler::{Drill, DrillMode, ProficiencyRange, Scheduler};
use drillbook::vocab::session::{CORRECT_ADVANCE_DELAY, REVEAL_ADVANCE_DELAY};
use drillbook::vocab::types::ItemKind;

/// Run an interactive practice session until the learner quits or the
/// filters run out of items.
pub async fn practice(
    config: &DrillbookConfig,
    kind: &str,
    today_new: bool,
    tag: Option<String>,
    min: Option<i64>,
    max: Option<i64>,
) -> Result<()> {
    let kind: ItemKind = kind.parse().map_err(anyhow::Error::msg)?;
    let runtime = super::open_runtime(config).await?;

    let mut settings = config.practice.clone();
    if today_new {
        settings.today_new_only = true;
    }
    if tag.is_some() {
        settings.tag_filter = tag;
    }
    settings.proficiency_range = ProficiencyRange {
        min: min.unwrap_or(settings.proficiency_range.min),
        max: max.unwrap_or(settings.proficiency_range.max),
    };

    let mut scheduler = Scheduler::new(runtime.repo, runtime.log, settings, kind)?;

    println!("Practice session — type your answer, or :q to quit.");
    println!();

    loop {
        let drill = match scheduler.select_next().await {
            Ok(drill) => drill,
            Err(Error::NoEligibleItems) => {
                println!("No items match the current filters. Session over.");
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        show_prompt(&drill);

        loop {
            print!("> ");
            std::io::stdout().flush()?;
            let mut line = String::new();
            if std::io::stdin().read_line(&mut line)? == 0 || line.trim() == ":q" {
                println!("Session ended.");
                return Ok(());
            }
            if line.trim().is_empty() {
                continue;
            }

            let outcome = scheduler.submit_answer(&line).await?;
            if outcome.is_correct {
                println!(
                    "✓ {} — {}",
                    outcome.correct_text,
                    drill.item.translations.join("; ")
                );
                tokio::time::sleep(CORRECT_ADVANCE_DELAY).await;
                break;
            }
            if outcome.should_reveal {
                println!(
                    "✗ {} wrong in a row — the answer is: {}",
                    outcome.consecutive_errors, outcome.correct_text
                );
                tokio::time::sleep(REVEAL_ADVANCE_DELAY).await;
                scheduler.finish_drill();
                break;
            }
            println!("✗ wrong ({} in a row), try again", outcome.consecutive_errors);
        }
        println!();
    }
}

fn show_prompt(drill: &Drill) {
    let hint = drill
        .item
        .translations
        .first()
        .map(String::as_str)
        .unwrap_or("");
    match drill.mode {
        DrillMode::Audio => println!(
            "[audio] say it aloud, then type it — hint: {hint}   (proficiency {})",
            drill.item.proficiency
        ),
        DrillMode::Translation => println!(
            "[translation] type the word for: {hint}   (proficiency {})",
            drill.item.proficiency
        ),
        DrillMode::Sentence => println!(
            "[sentence] type the sentence for: {hint}   (proficiency {})",
            drill.item.proficiency
        ),
    }
}
