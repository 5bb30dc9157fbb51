//! Per-asset share accounting and price conversion.
//!
//! `vault_shares` is the module's total stake in the vault, in an
//! internal share unit. The share price is the vault-reported balance
//! over the share count, scaled by [`SCALE`]. Deposits mint at the
//! current price and yield only adds balance, so the price never
//! decreases.

use serde::{Deserialize, Serialize};
use skim_types::{AccountId, Asset, SCALE};

use crate::vault::YieldVault;
use crate::{EscrowError, Result};

/// Vault-share bookkeeping for a single asset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareEscrow {
    /// Shares the module owns in the vault's internal accounting.
    vault_shares: u64,
}

impl ShareEscrow {
    /// Create an empty escrow.
    pub fn new() -> Self {
        Self::default()
    }

    /// Shares the module currently owns.
    pub fn vault_shares(&self) -> u64 {
        self.vault_shares
    }

    /// Current share price, scaled by [`SCALE`].
    ///
    /// # Arguments
    ///
    /// * `reported_balance` - The vault's current balance for the asset
    ///
    /// # Errors
    ///
    /// - [`EscrowError::ZeroShares`] if no shares are outstanding: the
    ///   price is undefined and callers must not convert against it
    /// - [`EscrowError::Overflow`] on arithmetic overflow
    pub fn share_price(&self, reported_balance: u64) -> Result<u128> {
        if self.vault_shares == 0 {
            return Err(EscrowError::ZeroShares);
        }
        (reported_balance as u128)
            .checked_mul(SCALE)
            .map(|v| v / self.vault_shares as u128)
            .ok_or(EscrowError::Overflow)
    }

    /// Underlying value of `share` shares at the current price.
    ///
    /// # Errors
    ///
    /// Same conditions as [`share_price`](Self::share_price).
    pub fn share_value(&self, share: u64, reported_balance: u64) -> Result<u64> {
        if self.vault_shares == 0 {
            return Err(EscrowError::ZeroShares);
        }
        mul_div(share, reported_balance, self.vault_shares)
    }

    /// Deposit `amount` into the vault, minting the share-equivalent.
    ///
    /// The first deposit defines the price as 1:1. Later deposits mint
    /// `amount × vault_shares / reported_balance` against the pre-deposit
    /// balance, which leaves the price unchanged. Returns the minted
    /// share count; a zero amount is a no-op.
    ///
    /// # Errors
    ///
    /// - [`EscrowError::ZeroBalance`] if shares are outstanding but the
    ///   vault reports nothing to price them against
    /// - [`EscrowError::Overflow`] on arithmetic overflow
    /// - [`EscrowError::Vault`] if the vault rejects the deposit; no
    ///   shares are minted in that case
    pub fn deposit<V: YieldVault>(
        &mut self,
        vault: &V,
        asset: Asset,
        amount: u64,
        on_behalf_of: AccountId,
    ) -> Result<u64> {
        if amount == 0 {
            return Ok(0);
        }
        let minted = if self.vault_shares == 0 {
            amount
        } else {
            let balance = vault.reported_balance(asset);
            if balance == 0 {
                return Err(EscrowError::ZeroBalance {
                    shares: self.vault_shares,
                });
            }
            mul_div(amount, self.vault_shares, balance)?
        };
        vault.supply(asset, amount, on_behalf_of)?;
        self.vault_shares = self
            .vault_shares
            .checked_add(minted)
            .ok_or(EscrowError::Overflow)?;
        tracing::trace!(
            %asset,
            amount,
            minted,
            total_shares = self.vault_shares,
            "fee deposited into vault"
        );
        Ok(minted)
    }

    /// Withdraw `share` shares' worth of underlying to `to`.
    ///
    /// Converts at the current price, decrements the share count, then
    /// forwards the withdrawal. The vault's returned amount is
    /// authoritative for what was transferred; a discrepancy against the
    /// computed amount is surfaced in the log, never absorbed. A zero
    /// share count is a no-op.
    ///
    /// A vault rejection here leaves the share count already
    /// decremented; the caller must treat that as fatal for the asset.
    ///
    /// # Errors
    ///
    /// - [`EscrowError::InsufficientShares`] if `share` exceeds the
    ///   escrow's holdings (rejected before any mutation)
    /// - [`EscrowError::Overflow`] on arithmetic overflow
    /// - [`EscrowError::Vault`] if the vault rejects the withdrawal
    pub fn withdraw_by_share<V: YieldVault>(
        &mut self,
        vault: &V,
        asset: Asset,
        share: u64,
        to: AccountId,
    ) -> Result<u64> {
        if share == 0 {
            return Ok(0);
        }
        if share > self.vault_shares {
            return Err(EscrowError::InsufficientShares {
                available: self.vault_shares,
                requested: share,
            });
        }
        let underlying = self.share_value(share, vault.reported_balance(asset))?;
        self.vault_shares -= share;
        let released = vault.withdraw(asset, underlying, to)?;
        if released != underlying {
            tracing::warn!(
                %asset,
                computed = underlying,
                released,
                "vault released a different amount than computed"
            );
        }
        tracing::trace!(
            %asset,
            share,
            released,
            remaining_shares = self.vault_shares,
            "shares redeemed"
        );
        Ok(released)
    }
}

/// `amount × numerator / denominator` in u128, overflow-checked.
fn mul_div(amount: u64, numerator: u64, denominator: u64) -> Result<u64> {
    let value = (amount as u128)
        .checked_mul(numerator as u128)
        .ok_or(EscrowError::Overflow)?
        / denominator as u128;
    u64::try_from(value).map_err(|_| EscrowError::Overflow)
}
