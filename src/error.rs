//! Error taxonomy for the settlement engine.
//!
//! Duplicate-key races (config activation, payout creation, webhook insert)
//! are not represented here: they are absorbed at the call site and converted
//! into the idempotent success response. Unrecoverable storage errors pass
//! through `Storage` unchanged; retry policy belongs to the calling layer.

use thiserror::Error;

/// Errors surfaced by settlement services
#[derive(Error, Debug)]
pub enum SettlementError {
    /// Finalization referenced a fee config id that does not exist
    #[error("Fee config not found: {0}")]
    ConfigNotFound(String),

    /// Payout creation requested before finalization wrote a snapshot
    #[error("Fee snapshot not found for seller order: {0}")]
    SnapshotNotFound(String),

    /// Payout status update referenced an unknown payout
    #[error("Payout not found: {0}")]
    PayoutNotFound(String),

    /// Payout status update attempted an illegal transition
    #[error("Invalid payout status transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    /// Underlying storage failure (connection loss, constraint outside the
    /// idempotent paths, etc.)
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, SettlementError>;
