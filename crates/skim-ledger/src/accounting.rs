//! The volume ledger and participant accounts.
//!
//! ## Accounting model
//!
//! `reward_per_unit` accumulates reward per unit of contributed volume as
//! a fixed-point value scaled by [`SCALE`]. A participant's lifetime
//! entitlement is `volume_contributed × reward_per_unit / SCALE`;
//! `reward_debt` records the portion of that product already settled or
//! baselined, so the pending amount is always the difference of the two.
//! Injecting a reward is a single addition to the accumulator — no
//! per-participant iteration ever happens.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use skim_types::{AccountId, SCALE};

use crate::{LedgerError, Result};

/// Per-participant reward position within one asset.
///
/// Rows are created lazily on first trade and never removed; a
/// zero-volume, zero-debt account is equivalent to absence.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantAccount {
    /// Cumulative trading volume attributed to this participant.
    pub volume_contributed: u64,
    /// Portion of `volume_contributed × reward_per_unit / SCALE` already
    /// settled or baselined.
    pub reward_debt: u64,
}

/// Reward ledger for a single asset.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct VolumeLedger {
    /// Reward per unit of volume, scaled by [`SCALE`]. Never decreases.
    reward_per_unit: u128,
    /// Sum of all contributed volume; denominator for reward injection.
    total_volume: u64,
    /// Undistributed reward earmarked for the module operator.
    operator_accrued: u64,
    /// Lifetime fee collected. Diagnostic only; feeds no payout math.
    total_fee_accrued: u64,
    /// Participant accounts, created lazily and never removed.
    accounts: HashMap<AccountId, ParticipantAccount>,
}

impl VolumeLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a trade's volume and inject its participant reward share.
    ///
    /// The trading participant's new volume is baselined at the current
    /// accumulator (its reward debt advances by
    /// `volume × reward_per_unit / SCALE`), so reward already pending is
    /// preserved and the new volume earns only from this injection
    /// onward. The injection divides by the total volume including this
    /// trade, so the trader earns the proportional slice of its own
    /// trade's reward.
    ///
    /// On the very first trade of an asset there is no volume to
    /// distribute against; the participant share is routed to the
    /// operator instead of dividing by zero.
    ///
    /// # Arguments
    ///
    /// * `participant` - The trading participant
    /// * `volume` - The trade's input amount
    /// * `participant_share` - The fee portion to distribute to traders
    ///
    /// # Errors
    ///
    /// - [`LedgerError::Overflow`] if any volume or reward computation
    ///   overflows
    pub fn record_trade(
        &mut self,
        participant: AccountId,
        volume: u64,
        participant_share: u64,
    ) -> Result<()> {
        let reward_per_unit = self.reward_per_unit;
        let account = self.accounts.entry(participant).or_default();

        let baseline = scale_down(volume, reward_per_unit)?;
        account.reward_debt = account
            .reward_debt
            .checked_add(baseline)
            .ok_or(LedgerError::Overflow)?;
        account.volume_contributed = account
            .volume_contributed
            .checked_add(volume)
            .ok_or(LedgerError::Overflow)?;

        let pre_trade_volume = self.total_volume;
        self.total_volume = pre_trade_volume
            .checked_add(volume)
            .ok_or(LedgerError::Overflow)?;

        if participant_share > 0 {
            if pre_trade_volume == 0 {
                // First trade: no prior volume to distribute against.
                self.operator_accrued = self
                    .operator_accrued
                    .checked_add(participant_share)
                    .ok_or(LedgerError::Overflow)?;
                tracing::debug!(
                    share = participant_share,
                    "first trade for asset: reward share routed to operator"
                );
            } else {
                let injected = (participant_share as u128)
                    .checked_mul(SCALE)
                    .ok_or(LedgerError::Overflow)?
                    / self.total_volume as u128;
                self.reward_per_unit = self
                    .reward_per_unit
                    .checked_add(injected)
                    .ok_or(LedgerError::Overflow)?;
                tracing::trace!(
                    share = participant_share,
                    total_volume = self.total_volume,
                    reward_per_unit = %self.reward_per_unit,
                    "reward injected"
                );
            }
        }

        Ok(())
    }

    /// Reward accrued to `participant` since its last settlement.
    ///
    /// Participants with no recorded account pend zero.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::Underflow`] if the recorded debt exceeds the
    ///   accumulated reward — a sequencing violation, never a valid state
    /// - [`LedgerError::Overflow`] on arithmetic overflow
    pub fn pending_reward(&self, participant: &AccountId) -> Result<u64> {
        let Some(account) = self.accounts.get(participant) else {
            return Ok(0);
        };
        let accumulated = scale_down(account.volume_contributed, self.reward_per_unit)?;
        accumulated
            .checked_sub(account.reward_debt)
            .ok_or(LedgerError::Underflow {
                accumulated,
                debt: account.reward_debt,
            })
    }

    /// Settle `participant`'s pending reward, returning it exactly once.
    ///
    /// The participant's reward debt advances to the full accumulated
    /// product, so a second call with no intervening trade returns zero.
    /// This is the only claim-driven mutation path for reward debt.
    ///
    /// # Errors
    ///
    /// Same conditions as [`pending_reward`](Self::pending_reward).
    pub fn settle(&mut self, participant: AccountId) -> Result<u64> {
        let pending = self.pending_reward(&participant)?;
        let reward_per_unit = self.reward_per_unit;
        if let Some(account) = self.accounts.get_mut(&participant) {
            account.reward_debt = scale_down(account.volume_contributed, reward_per_unit)?;
        }
        if pending > 0 {
            tracing::debug!(amount = pending, "reward settled");
        }
        Ok(pending)
    }

    /// Add an operator share to the undistributed operator bucket.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::Overflow`] if the bucket would overflow
    pub fn add_operator_accrued(&mut self, amount: u64) -> Result<()> {
        self.operator_accrued = self
            .operator_accrued
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;
        Ok(())
    }

    /// Take the full operator bucket, zeroing it.
    pub fn take_operator_accrued(&mut self) -> u64 {
        std::mem::take(&mut self.operator_accrued)
    }

    /// Record a collected fee in the lifetime diagnostic counter.
    pub fn note_fee(&mut self, fee: u64) {
        self.total_fee_accrued = self.total_fee_accrued.saturating_add(fee);
    }

    /// Current reward-per-unit accumulator, scaled by [`SCALE`].
    pub fn reward_per_unit(&self) -> u128 {
        self.reward_per_unit
    }

    /// Total contributed volume across all participants.
    pub fn total_volume(&self) -> u64 {
        self.total_volume
    }

    /// Undistributed operator reward.
    pub fn operator_accrued(&self) -> u64 {
        self.operator_accrued
    }

    /// Lifetime fee collected (diagnostic).
    pub fn total_fee_accrued(&self) -> u64 {
        self.total_fee_accrued
    }

    /// Look up a participant's account, if it has ever traded.
    pub fn account(&self, participant: &AccountId) -> Option<&ParticipantAccount> {
        self.accounts.get(participant)
    }
}

/// `volume × reward_per_unit / SCALE`, overflow-checked, as an amount.
fn scale_down(volume: u64, reward_per_unit: u128) -> Result<u64> {
    let scaled = (volume as u128)
        .checked_mul(reward_per_unit)
        .ok_or(LedgerError::Overflow)?
        / SCALE;
    u64::try_from(scaled).map_err(|_| LedgerError::Overflow)
}
