//! # skim-types
//!
//! Shared domain types used across the Skim workspace.
//!
//! Skim is the accounting core of a fee-capture-and-yield module attached
//! to an exchange pool: every trade is skimmed for a 0.1% fee on its input
//! asset, the fee is split between the module operator and the pool's
//! traders in proportion to contributed volume, and collected fees sit in
//! an external yield-bearing vault so unclaimed rewards keep appreciating
//! until claimed.
//!
//! ## Modules
//!
//! - [`asset`] — the fixed set of supported pool assets

pub mod asset;

pub use asset::Asset;

/// Participant, operator, and token identities (32-byte account ids).
pub type AccountId = [u8; 32];

/// Fixed-point scale for reward accumulators and share prices (10^18).
pub const SCALE: u128 = 1_000_000_000_000_000_000;
