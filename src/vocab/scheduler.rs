//! Drill selection and the proficiency update rule.
//!
//! Selection narrows the candidate set (range or today-new, then tags) to
//! the 20 lowest-proficiency items and picks one uniformly at random from
//! that pool — biased toward weak items without always drilling the single
//! worst one. Answers move proficiency by ±1 and commit the full stats
//! update plus a practice-log entry in one pass.

use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::error::{Error, Result};
use crate::vocab::normalize_answer;
use crate::vocab::practice_log::PracticeLog;
use crate::vocab::repository::{ItemPatch, ItemRepository};
use crate::vocab::session::{InputOutcome, Session, REVEAL_THRESHOLD};
use crate::vocab::types::{Item, ItemKind};

/// Size of the low-proficiency pool the random pick draws from.
pub const LOW_PROFICIENCY_POOL: usize = 20;

/// Hard bounds on the configurable proficiency range.
pub const PROFICIENCY_RANGE_LIMIT: i64 = 9999;

/// Presentation style of a drill prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrillMode {
    /// Only the pronunciation is given.
    Audio,
    /// A translation is shown.
    Translation,
    /// Sentence transcription from its translation.
    Sentence,
}

/// Which word drill modes the learner enabled.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EnabledModes {
    pub audio: bool,
    pub translation: bool,
}

impl Default for EnabledModes {
    fn default() -> Self {
        Self {
            audio: true,
            translation: true,
        }
    }
}

/// Inclusive proficiency window for candidate selection.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ProficiencyRange {
    pub min: i64,
    pub max: i64,
}

impl Default for ProficiencyRange {
    fn default() -> Self {
        Self {
            min: -PROFICIENCY_RANGE_LIMIT,
            max: PROFICIENCY_RANGE_LIMIT,
        }
    }
}

/// Collaborator-supplied practice filters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PracticeSettings {
    pub enabled_modes: EnabledModes,
    pub proficiency_range: ProficiencyRange,
    /// Restrict candidates to items created today (local time).
    pub today_new_only: bool,
    /// Restrict candidates to items carrying this tag.
    pub tag_filter: Option<String>,
}

impl PracticeSettings {
    /// Reject malformed settings before they reach selection.
    pub fn validate(&self) -> Result<()> {
        let ProficiencyRange { min, max } = self.proficiency_range;
        if min > max {
            return Err(Error::Validation(format!(
                "proficiency range is inverted: {min} > {max}"
            )));
        }
        if min < -PROFICIENCY_RANGE_LIMIT || max > PROFICIENCY_RANGE_LIMIT {
            return Err(Error::Validation(format!(
                "proficiency range must lie within ±{PROFICIENCY_RANGE_LIMIT}"
            )));
        }
        if let Some(tag) = &self.tag_filter {
            if tag.trim().is_empty() {
                return Err(Error::Validation("tag filter must not be blank".into()));
            }
        }
        Ok(())
    }
}

/// A selected drill: the item plus the mode to present it in.
#[derive(Debug, Clone)]
pub struct Drill {
    pub item: Item,
    pub mode: DrillMode,
}

/// Result of a full-item submission.
#[derive(Debug, Clone)]
pub struct AnswerOutcome {
    pub is_correct: bool,
    pub consecutive_errors: u32,
    /// The reveal threshold was reached; the answer should be shown and
    /// input locked until the drill advances.
    pub should_reveal: bool,
    pub correct_text: String,
}

/// Feedback from keystroke-level input handling.
#[derive(Debug, Clone)]
pub enum InputFeedback {
    /// Valid prefix; keep typing.
    Accepted,
    /// The input completed the target and was submitted as correct.
    Finalized(AnswerOutcome),
    /// The input diverged from the target.
    MidEntryError {
        consecutive_errors: u32,
        revealed: bool,
    },
    /// Input arrived while locked or with no drill active.
    Ignored,
}

/// Selects drills and applies the proficiency update rule.
pub struct Scheduler {
    repo: ItemRepository,
    log: PracticeLog,
    settings: PracticeSettings,
    kind: ItemKind,
    rng: StdRng,
    current: Option<Drill>,
    session: Session,
}

impl Scheduler {
    pub fn new(
        repo: ItemRepository,
        log: PracticeLog,
        settings: PracticeSettings,
        kind: ItemKind,
    ) -> Result<Self> {
        Self::with_rng(repo, log, settings, kind, StdRng::from_entropy())
    }

    /// Seeded constructor for deterministic tests.
    pub fn with_rng(
        repo: ItemRepository,
        log: PracticeLog,
        settings: PracticeSettings,
        kind: ItemKind,
        rng: StdRng,
    ) -> Result<Self> {
        settings.validate()?;
        Ok(Self {
            repo,
            log,
            settings,
            kind,
            rng,
            current: None,
            session: Session::new(),
        })
    }

    pub fn settings(&self) -> &PracticeSettings {
        &self.settings
    }

    /// Replace the active filters. Validated before taking effect.
    pub fn update_settings(&mut self, settings: PracticeSettings) -> Result<()> {
        settings.validate()?;
        self.settings = settings;
        Ok(())
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Select the next drill item and mode, and reset the session counters.
    pub async fn select_next(&mut self) -> Result<Drill> {
        let candidates = if self.settings.today_new_only {
            self.repo.by_added_today().await?
        } else {
            let ProficiencyRange { min, max } = self.settings.proficiency_range;
            self.repo.by_proficiency_range(min, max).await?
        };

        let tag_filter: BTreeSet<String> = self
            .settings
            .tag_filter
            .iter()
            .map(|t| t.trim().to_string())
            .collect();

        let mut pool: Vec<Item> = candidates
            .into_iter()
            .filter(|i| i.kind == self.kind && i.matches_tags(&tag_filter))
            .collect();

        if pool.is_empty() {
            return Err(Error::NoEligibleItems);
        }

        // Narrow to the worst 20, then randomize within that pool
        pool.sort_by_key(|i| i.proficiency);
        pool.truncate(LOW_PROFICIENCY_POOL);
        let item = pool.swap_remove(self.rng.gen_range(0..pool.len()));

        let mode = self.pick_mode();
        self.session.begin(self.kind, &item.primary_text);

        let drill = Drill { item, mode };
        self.current = Some(drill.clone());
        tracing::debug!(id = %drill.item.id, mode = ?drill.mode, "selected drill");
        Ok(drill)
    }

    /// Word drills pick uniformly from the enabled mode set; an empty set
    /// force-enables audio so selection can never stall. Sentence drills
    /// always use sentence mode.
    fn pick_mode(&mut self) -> DrillMode {
        if self.kind == ItemKind::Sentence {
            return DrillMode::Sentence;
        }

        let mut modes = Vec::with_capacity(2);
        if self.settings.enabled_modes.audio {
            modes.push(DrillMode::Audio);
        }
        if self.settings.enabled_modes.translation {
            modes.push(DrillMode::Translation);
        }
        if modes.is_empty() {
            self.settings.enabled_modes.audio = true;
            modes.push(DrillMode::Audio);
        }
        modes[self.rng.gen_range(0..modes.len())]
    }

    /// Grade a full-item submission and commit its effects: proficiency ±1,
    /// the paired stats counters, `last_practice_at`, and a practice-log
    /// entry for today.
    pub async fn submit_answer(&mut self, raw_input: &str) -> Result<AnswerOutcome> {
        let Some(drill) = self.current.clone() else {
            return Err(Error::Validation("no drill in progress".into()));
        };

        let kind = drill.item.kind;
        let is_correct =
            normalize_answer(kind, raw_input) == normalize_answer(kind, &drill.item.primary_text);

        let (consecutive_errors, should_reveal) = self.session.note_submission(is_correct);

        if let Some(mut item) = self.repo.get_by_id(&drill.item.id).await? {
            item.stats.practice_count += 1;
            if is_correct {
                item.stats.correct_count += 1;
                item.proficiency += 1;
            } else {
                item.stats.error_count += 1;
                item.proficiency -= 1;
            }
            item.stats.last_practice_at = Some(Utc::now());

            self.repo
                .update(
                    &item.id,
                    ItemPatch {
                        proficiency: Some(item.proficiency),
                        stats: Some(item.stats),
                        ..Default::default()
                    },
                )
                .await?;
            self.log.record(&item.id, is_correct).await?;
        } else {
            tracing::warn!(id = %drill.item.id, "drilled item vanished, skipping stats update");
        }

        Ok(AnswerOutcome {
            is_correct,
            consecutive_errors,
            should_reveal,
            correct_text: drill.item.primary_text,
        })
    }

    /// Validate a partial input keystroke-by-keystroke. An exact match
    /// finalizes as a correct submission; the first divergence of an attempt
    /// costs one proficiency point immediately, while the stats counters
    /// wait for the attempt to be abandoned.
    pub async fn handle_input(&mut self, partial: &str) -> Result<InputFeedback> {
        if self.current.is_none() {
            return Ok(InputFeedback::Ignored);
        }

        match self.session.evaluate(partial) {
            InputOutcome::Ignored => Ok(InputFeedback::Ignored),
            InputOutcome::Continue => Ok(InputFeedback::Accepted),
            InputOutcome::Complete => {
                let target = self
                    .current
                    .as_ref()
                    .map(|d| d.item.primary_text.clone())
                    .unwrap_or_default();
                let outcome = self.submit_answer(&target).await?;
                Ok(InputFeedback::Finalized(outcome))
            }
            InputOutcome::Diverged { penalize, reveal } => {
                let consecutive_errors = if reveal {
                    REVEAL_THRESHOLD
                } else {
                    self.session.consecutive_errors()
                };

                if penalize {
                    self.apply_keystroke_penalty().await?;
                }
                if reveal && self.session.take_pending_commit() {
                    self.commit_abandoned_attempt().await?;
                }

                Ok(InputFeedback::MidEntryError {
                    consecutive_errors,
                    revealed: reveal,
                })
            }
        }
    }

    /// Abandon the current attempt after the clear delay: pays the owed
    /// stats commit (if any) and releases the latch for a fresh attempt.
    pub async fn clear_and_retry(&mut self) -> Result<()> {
        if self.session.clear_and_retry() {
            self.commit_abandoned_attempt().await?;
        }
        Ok(())
    }

    /// Tear down the current drill (advance delay elapsed or session ended).
    pub fn finish_drill(&mut self) {
        self.session.finish();
        self.current = None;
    }

    /// The immediate cost of a first divergence: proficiency only.
    async fn apply_keystroke_penalty(&mut self) -> Result<()> {
        let Some(drill) = &self.current else {
            return Ok(());
        };
        if let Some(item) = self.repo.get_by_id(&drill.item.id).await? {
            self.repo
                .update(
                    &item.id,
                    ItemPatch {
                        proficiency: Some(item.proficiency - 1),
                        ..Default::default()
                    },
                )
                .await?;
        }
        Ok(())
    }

    /// The single stats commit for an abandoned attempt: one paired
    /// `practice_count`/`error_count` increment plus a log entry.
    async fn commit_abandoned_attempt(&mut self) -> Result<()> {
        let Some(drill) = &self.current else {
            return Ok(());
        };
        if let Some(mut item) = self.repo.get_by_id(&drill.item.id).await? {
            item.stats.practice_count += 1;
            item.stats.error_count += 1;
            item.stats.last_practice_at = Some(Utc::now());
            self.repo
                .update(
                    &item.id,
                    ItemPatch {
                        stats: Some(item.stats),
                        ..Default::default()
                    },
                )
                .await?;
            self.log.record(&item.id, false).await?;
        }
        Ok(())
    }
}
