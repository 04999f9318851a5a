//! Error taxonomy for the drill core.
//!
//! Only two failures are ever surfaced to a collaborator as errors:
//! rejected settings/input ([`Error::Validation`]) and an empty candidate
//! set ([`Error::NoEligibleItems`], a session-ending signal rather than a
//! crash). Missing ids are reported as `None` results, never as errors, and
//! remote-tier failures are swallowed inside the store layer.

use thiserror::Error;

/// Errors surfaced by the repository, scheduler, and session machine.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed settings or input (e.g. `min > max`, empty primary text).
    #[error("invalid input: {0}")]
    Validation(String),

    /// The current filters matched no items; the caller decides whether to
    /// end the session.
    #[error("no items match the current practice filters")]
    NoEligibleItems,

    /// Local-tier or serialization failure. Remote-tier errors never reach
    /// this variant.
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

/// Convenience alias used throughout the vocab modules.
pub type Result<T> = std::result::Result<T, Error>;
