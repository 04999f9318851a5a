//! Per-drill session state machine.
//!
//! Tracks the phase of the current attempt, the consecutive-error count, and
//! the error latch that keeps one keystroke-level mistake from being
//! penalized twice. The machine itself is pure state: it decides transitions
//! and reports which persistence effects the scheduler must apply (a
//! proficiency penalty on the first divergence of an attempt, a single
//! stats commit when an attempt is abandoned).
//!
//! Phases: `Idle → AwaitingInput → (complete | MidEntryError) →
//! AwaitingInput | Revealed → Idle`.

use std::time::Duration;

use crate::vocab::normalize_answer;
use crate::vocab::types::ItemKind;

/// Consecutive wrong attempts on one item before the answer is shown.
pub const REVEAL_THRESHOLD: u32 = 5;

/// How long a collaborator leaves a mid-entry error visible before clearing
/// the input for a fresh attempt.
pub const MID_ENTRY_CLEAR_DELAY: Duration = Duration::from_millis(500);

/// Pause after a correct answer before advancing to the next item.
pub const CORRECT_ADVANCE_DELAY: Duration = Duration::from_millis(1500);

/// Pause after a reveal before advancing to the next item.
pub const REVEAL_ADVANCE_DELAY: Duration = Duration::from_millis(3000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No drill in progress.
    Idle,
    /// Waiting on keystrokes for the current attempt.
    AwaitingInput,
    /// The partial input diverged from the target; cleared after
    /// [`MID_ENTRY_CLEAR_DELAY`] unless the reveal threshold fired.
    MidEntryError,
    /// The answer is shown and input is locked until the drill advances.
    Revealed,
}

/// What one keystroke-level evaluation decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputOutcome {
    /// Valid prefix of the target — accepted silently.
    Continue,
    /// The input matches the target exactly; finalize as a correct
    /// submission.
    Complete,
    /// The input diverged. `penalize` is set only on the first divergence of
    /// this attempt (the error latch); `reveal` is set when that divergence
    /// was the one that reached [`REVEAL_THRESHOLD`].
    Diverged { penalize: bool, reveal: bool },
    /// Input arrived while locked ([`Phase::Revealed`]) or with no drill
    /// active; ignored.
    Ignored,
}

/// Ephemeral state of the drill in progress. Never persisted.
#[derive(Debug)]
pub struct Session {
    phase: Phase,
    kind: ItemKind,
    /// Normalized target of the current drill.
    target: String,
    consecutive_errors: u32,
    /// Set on the first divergence of an attempt so repeated change events
    /// for the same mistake cannot double-penalize.
    error_latched: bool,
    /// A latched divergence whose stats commit is still owed; paid exactly
    /// once when the attempt is abandoned (clear-and-retry or reveal), and
    /// dropped if the attempt is completed or submitted instead.
    pending_error_commit: bool,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            phase: Phase::Idle,
            kind: ItemKind::Word,
            target: String::new(),
            consecutive_errors: 0,
            error_latched: false,
            pending_error_commit: false,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn consecutive_errors(&self) -> u32 {
        self.consecutive_errors
    }

    /// Start a drill: counters reset, latch cleared, input awaited.
    pub(crate) fn begin(&mut self, kind: ItemKind, primary_text: &str) {
        self.phase = Phase::AwaitingInput;
        self.kind = kind;
        self.target = normalize_answer(kind, primary_text);
        self.consecutive_errors = 0;
        self.error_latched = false;
        self.pending_error_commit = false;
    }

    /// Evaluate the current partial input.
    pub(crate) fn evaluate(&mut self, partial: &str) -> InputOutcome {
        match self.phase {
            Phase::Idle | Phase::Revealed => return InputOutcome::Ignored,
            Phase::AwaitingInput | Phase::MidEntryError => {}
        }

        let normalized = normalize_answer(self.kind, partial);
        if normalized == self.target {
            return InputOutcome::Complete;
        }
        if self.target.starts_with(&normalized) {
            self.phase = Phase::AwaitingInput;
            return InputOutcome::Continue;
        }

        self.phase = Phase::MidEntryError;
        if self.error_latched {
            return InputOutcome::Diverged {
                penalize: false,
                reveal: false,
            };
        }

        self.error_latched = true;
        self.pending_error_commit = true;
        self.consecutive_errors += 1;

        let reveal = self.consecutive_errors >= REVEAL_THRESHOLD;
        if reveal {
            self.phase = Phase::Revealed;
            self.consecutive_errors = 0;
        }
        InputOutcome::Diverged {
            penalize: true,
            reveal,
        }
    }

    /// Register a full-item submission. Returns the running consecutive
    /// error count and whether the reveal threshold was reached (in which
    /// case the counter has already been reset).
    pub(crate) fn note_submission(&mut self, correct: bool) -> (u32, bool) {
        // A submission ends the keystroke-level attempt; any owed mid-entry
        // commit is superseded by the submission's own stats increment.
        self.pending_error_commit = false;
        self.error_latched = false;

        if correct {
            self.consecutive_errors = 0;
            self.phase = Phase::Idle;
            return (0, false);
        }

        self.consecutive_errors += 1;
        let reveal = self.consecutive_errors >= REVEAL_THRESHOLD;
        let reported = self.consecutive_errors;
        if reveal {
            self.phase = Phase::Revealed;
            self.consecutive_errors = 0;
        } else {
            self.phase = Phase::AwaitingInput;
        }
        (reported, reveal)
    }

    /// Abandon the current attempt (collaborator cleared the input after
    /// [`MID_ENTRY_CLEAR_DELAY`]). Releases the latch so the next attempt
    /// can be penalized independently; returns whether a stats commit is
    /// owed for the abandoned attempt.
    pub(crate) fn clear_and_retry(&mut self) -> bool {
        let owed = self.pending_error_commit;
        self.pending_error_commit = false;
        self.error_latched = false;
        if self.phase == Phase::MidEntryError {
            self.phase = Phase::AwaitingInput;
        }
        owed
    }

    /// Take the owed stats commit when the reveal threshold fired mid-entry.
    pub(crate) fn take_pending_commit(&mut self) -> bool {
        let owed = self.pending_error_commit;
        self.pending_error_commit = false;
        owed
    }

    /// Tear the drill down (reveal delay elapsed, or the collaborator moved
    /// on). Timers cancelled with the session leave no persistent effect.
    pub(crate) fn finish(&mut self) {
        self.phase = Phase::Idle;
        self.target.clear();
        self.consecutive_errors = 0;
        self.error_latched = false;
        self.pending_error_commit = false;
    }
}
