//! The narrow interface the settlement platform drives.
//!
//! The settlement platform invokes the module once per matched trade and
//! on explicit participant or operator claim requests. It is only ever a
//! caller of these traits, never a base type the module inherits from;
//! asset custody stays on the platform side, and payouts flow through the
//! vault's withdrawal path.

use skim_escrow::YieldVault;
use skim_types::{AccountId, Asset};

use crate::facade::FeeModule;
use crate::Result;

/// Trade-side trigger, invoked once per matched trade.
pub trait TradeObserver {
    /// A matched trade settled, with `trade_input` of `asset` provided
    /// by `participant`.
    ///
    /// # Errors
    ///
    /// Implementations reject unsupported assets and accounting
    /// failures; a successful return means the fee is fully captured.
    fn trade_settled(&self, participant: AccountId, asset: Asset, trade_input: u64) -> Result<()>;
}

/// Claim-side trigger, invoked on explicit request.
pub trait ClaimHandler {
    /// A participant requests payout of its pending reward. Returns the
    /// amount released; zero pending is a successful no-op.
    ///
    /// # Errors
    ///
    /// Implementations surface fatal vault failures; see
    /// [`FeeModule::on_claim`].
    fn claim_requested(&self, participant: AccountId, asset: Asset) -> Result<u64>;

    /// The operator requests payout of the accrued operator share.
    ///
    /// # Errors
    ///
    /// Same conditions as [`claim_requested`](Self::claim_requested),
    /// plus owner gating.
    fn operator_claim_requested(&self, caller: AccountId, asset: Asset) -> Result<u64>;
}

impl<V: YieldVault> TradeObserver for FeeModule<V> {
    fn trade_settled(&self, participant: AccountId, asset: Asset, trade_input: u64) -> Result<()> {
        self.on_trade(participant, asset, trade_input).map(|_| ())
    }
}

impl<V: YieldVault> ClaimHandler for FeeModule<V> {
    fn claim_requested(&self, participant: AccountId, asset: Asset) -> Result<u64> {
        self.on_claim(participant, asset)
    }

    fn operator_claim_requested(&self, caller: AccountId, asset: Asset) -> Result<u64> {
        self.on_operator_claim(caller, asset)
    }
}
