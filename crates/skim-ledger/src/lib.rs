//! # skim-ledger
//!
//! Per-asset volume reward accounting for the Skim module.
//!
//! Each asset carries a single monotonically non-decreasing
//! reward-per-unit-volume accumulator, so any participant's share of all
//! rewards injected since its last settlement is computed in constant
//! time, regardless of how many participants exist.
//!
//! ## Modules
//!
//! - [`accounting`] — the volume ledger and participant accounts

pub mod accounting;

pub use accounting::{ParticipantAccount, VolumeLedger};

/// Error types for ledger operations.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// A pending-reward computation went negative: the recorded debt
    /// exceeds the accumulated reward. This signals debt settled out of
    /// sequence, not a valid state; the ledger must not continue.
    #[error("reward debt {debt} exceeds accumulated reward {accumulated}")]
    Underflow {
        /// Accumulated reward (volume × reward-per-unit, unscaled).
        accumulated: u64,
        /// The participant's recorded reward debt.
        debt: u64,
    },

    /// Arithmetic overflow in a volume or reward computation.
    #[error("arithmetic overflow in reward accounting")]
    Overflow,
}

/// Convenience result type for ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;
