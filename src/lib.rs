//! Adaptive vocabulary drills with local-first, best-effort-synced storage.
//!
//! drillbook tracks a signed per-item **proficiency** score (new items start
//! at -100, +1 per correct answer, -1 per error) and always drills from the
//! weakest end of the collection: candidates are filtered, narrowed to the
//! 20 lowest scores, and one is picked at random so review stays focused but
//! not monotonous. Five consecutive misses on one item reveal the answer.
//!
//! # Architecture
//!
//! - **Storage**: a dual-tier record store. The local tier (SQLite) is
//!   always available and takes every write first; an optional remote tier
//!   (HTTP key/value) is probed at startup and synced best-effort. Remote
//!   failures degrade the session to local-only, never fail an operation.
//! - **Repository**: typed CRUD and queries over the item collection,
//!   re-read fresh per call, with self-healing migration of legacy records.
//! - **Scheduler / session**: drill selection, the proficiency update rule,
//!   and the per-keystroke state machine with its consecutive-error reveal
//!   threshold.
//! - **Practice log**: per-day drilled-item sets feeding a calendar heatmap.
//!
//! # Modules
//!
//! - [`config`] — Configuration loading from TOML files and environment variables
//! - [`error`] — The error taxonomy surfaced to collaborators
//! - [`store`] — Dual-tier record store: local SQLite plus probed remote sync
//! - [`vocab`] — Core drill engine: items, queries, scheduling, session state,
//!   practice log, snapshots, and stats repair

pub mod config;
pub mod error;
pub mod store;
pub mod vocab;
