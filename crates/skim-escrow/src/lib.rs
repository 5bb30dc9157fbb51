//! # skim-escrow
//!
//! Vault-share bookkeeping for collected fees.
//!
//! Collected fees are deposited into an external yield-bearing vault. The
//! escrow tracks how many internal shares the module owns per asset and
//! converts between share counts and the growing underlying balance the
//! vault reports. The share price only moves when the vault accrues
//! yield, so rewards left unclaimed keep appreciating until claimed.
//!
//! ## Modules
//!
//! - [`shares`] — per-asset share accounting and price conversion
//! - [`vault`] — the external vault interface and an in-memory stub

pub mod shares;
pub mod vault;

pub use shares::ShareEscrow;
pub use vault::{StubVault, VaultError, YieldVault};

/// Error types for escrow operations.
#[derive(Debug, thiserror::Error)]
pub enum EscrowError {
    /// The escrow holds no vault shares; the share price is undefined
    /// and no conversion may be attempted against it.
    #[error("share price undefined: escrow holds no vault shares")]
    ZeroShares,

    /// Shares are outstanding but the vault reports a zero balance;
    /// deposits cannot be priced against a worthless share.
    #[error("vault reports zero balance against {shares} outstanding shares")]
    ZeroBalance {
        /// Outstanding vault shares.
        shares: u64,
    },

    /// A withdrawal asked for more shares than the escrow owns.
    #[error("insufficient vault shares: have {available}, requested {requested}")]
    InsufficientShares {
        /// Shares the escrow owns.
        available: u64,
        /// Shares the withdrawal requested.
        requested: u64,
    },

    /// Arithmetic overflow in a share conversion.
    #[error("arithmetic overflow in share conversion")]
    Overflow,

    /// The external vault rejected an operation.
    #[error("vault operation failed: {0}")]
    Vault(#[from] VaultError),
}

/// Convenience result type for escrow operations.
pub type Result<T> = std::result::Result<T, EscrowError>;
