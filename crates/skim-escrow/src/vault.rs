//! The external vault interface and an in-memory stub.
//!
//! The real vault is an external yield-bearing service that custodies
//! deposited assets and pays yield; the module only consumes its
//! supply/withdraw/balance contract and treats its interest model as
//! opaque. [`StubVault`] implements the same contract in memory, with
//! development-only controls to simulate yield and failures, so the
//! accounting core is testable without the live service.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use skim_types::{AccountId, Asset};

/// Error types for vault operations.
#[derive(Debug, thiserror::Error)]
pub enum VaultError {
    /// The vault rejected the withdrawal outright.
    #[error("vault rejected the withdrawal")]
    WithdrawalsDisabled,

    /// The vault cannot release the requested amount.
    #[error("vault has {available} available, withdrawal asked for {requested}")]
    InsufficientLiquidity {
        /// Balance the vault holds for the asset.
        available: u64,
        /// Amount the withdrawal requested.
        requested: u64,
    },
}

/// The external yield vault's contract, as consumed by the module.
///
/// Methods take `&self`: implementations are clients of an external
/// service and manage their own interior state.
pub trait YieldVault {
    /// Deposit `amount` of `asset` into the vault for `on_behalf_of`.
    ///
    /// # Errors
    ///
    /// Implementation-defined rejection of the deposit.
    fn supply(&self, asset: Asset, amount: u64, on_behalf_of: AccountId)
        -> Result<(), VaultError>;

    /// Withdraw `amount` of `asset` to `to`, returning the amount the
    /// vault actually released. The returned amount is authoritative for
    /// what was transferred.
    ///
    /// # Errors
    ///
    /// Implementation-defined rejection of the withdrawal.
    fn withdraw(&self, asset: Asset, amount: u64, to: AccountId) -> Result<u64, VaultError>;

    /// The vault's view of how much underlying the module's deposits are
    /// worth right now.
    fn reported_balance(&self, asset: Asset) -> u64;
}

/// An in-memory vault for development and testing.
#[derive(Debug, Default)]
pub struct StubVault {
    state: Mutex<StubState>,
}

#[derive(Debug)]
struct StubState {
    balances: HashMap<Asset, u64>,
    withdrawals_enabled: bool,
}

impl Default for StubState {
    fn default() -> Self {
        Self {
            balances: HashMap::new(),
            withdrawals_enabled: true,
        }
    }
}

impl StubVault {
    /// Create an empty stub vault with withdrawals enabled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit yield to an asset's balance (development/testing only).
    ///
    /// The real vault accrues yield continuously; the stub accrues it
    /// when told to.
    ///
    /// # Arguments
    ///
    /// * `asset` - The asset to credit
    /// * `amount` - The yield amount in underlying units
    pub fn dev_accrue_yield(&self, asset: Asset, amount: u64) {
        let mut state = self.state();
        let balance = state.balances.entry(asset).or_default();
        *balance = balance.saturating_add(amount);
        tracing::warn!(%asset, amount, "stub vault: yield credited (dev only)");
    }

    /// Enable or disable withdrawals (development/testing only).
    ///
    /// Disabling lets tests exercise the fatal withdrawal-failure path.
    pub fn dev_set_withdrawals_enabled(&self, enabled: bool) {
        self.state().withdrawals_enabled = enabled;
        tracing::warn!(enabled, "stub vault: withdrawal switch changed (dev only)");
    }

    fn state(&self) -> MutexGuard<'_, StubState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl YieldVault for StubVault {
    fn supply(
        &self,
        asset: Asset,
        amount: u64,
        _on_behalf_of: AccountId,
    ) -> Result<(), VaultError> {
        let mut state = self.state();
        let balance = state.balances.entry(asset).or_default();
        *balance = balance.saturating_add(amount);
        Ok(())
    }

    fn withdraw(&self, asset: Asset, amount: u64, _to: AccountId) -> Result<u64, VaultError> {
        let mut state = self.state();
        if !state.withdrawals_enabled {
            return Err(VaultError::WithdrawalsDisabled);
        }
        let balance = state.balances.entry(asset).or_default();
        if *balance < amount {
            return Err(VaultError::InsufficientLiquidity {
                available: *balance,
                requested: amount,
            });
        }
        *balance -= amount;
        Ok(amount)
    }

    fn reported_balance(&self, asset: Asset) -> u64 {
        self.state().balances.get(&asset).copied().unwrap_or(0)
    }
}
