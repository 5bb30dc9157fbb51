//! # skim-module
//!
//! The facade that composes the fee splitter, volume reward ledger, and
//! yield escrow into the Skim module's trade/claim pipeline.
//!
//! The settlement platform drives the module through two trigger points:
//! "a trade occurred" ([`TradeObserver`]) and "someone wants to claim"
//! ([`ClaimHandler`]). Every operation is a single atomic transition.
//! Per asset, all ledger and escrow mutations happen under one lock, so
//! operations on one asset never interleave while different assets
//! proceed fully in parallel.
//!
//! ## Modules
//!
//! - [`config`] — module configuration (owner, beneficiary, bindings)
//! - [`facade`] — the fee module itself
//! - [`observer`] — the narrow interface the settlement platform calls

pub mod config;
pub mod facade;
pub mod observer;

pub use config::{AssetBinding, ModuleConfig};
pub use facade::FeeModule;
pub use observer::{ClaimHandler, TradeObserver};

use skim_types::Asset;

/// Error types for module operations.
#[derive(Debug, thiserror::Error)]
pub enum ModuleError {
    /// The asset is not bound to a vault-share token. Rejected before
    /// any state change.
    #[error("asset {0} is not configured")]
    UnsupportedAsset(Asset),

    /// The asset is already bound; rebinding would orphan its live
    /// ledger and escrow.
    #[error("asset {0} is already configured")]
    AssetAlreadyBound(Asset),

    /// The asset was halted after a failed vault withdrawal and needs
    /// manual intervention before any further operation.
    #[error("asset {0} is halted pending manual intervention")]
    AssetHalted(Asset),

    /// The caller is not the module owner.
    #[error("caller is not the module owner")]
    NotOwner,

    /// The vault rejected a withdrawal after the ledger was already
    /// settled. Fatal for the asset: a retry would double-charge the
    /// settled ledger.
    #[error("vault withdrawal failed after settlement: {0}")]
    VaultWithdrawalFailed(#[source] skim_escrow::VaultError),

    /// Ledger accounting failure.
    #[error("ledger error: {0}")]
    Ledger(#[from] skim_ledger::LedgerError),

    /// Escrow accounting failure.
    #[error("escrow error: {0}")]
    Escrow(#[from] skim_escrow::EscrowError),
}

/// Convenience result type for module operations.
pub type Result<T> = std::result::Result<T, ModuleError>;
