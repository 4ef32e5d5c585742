//! Errors surfaced by the harness binary and library, scoped to exactly the
//! failure domains this crate owns (CLI input, fixture/report I/O) — kept
//! separate from [`fiberrt_core`]'s own error types rather than folded into
//! one global enum.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("unknown scenario {0:?}; run `fiberrt-harness list` for the valid names")]
    UnknownScenario(String),
    #[error("failed to serialize report as json: {0}")]
    Json(#[from] serde_json::Error),
}
