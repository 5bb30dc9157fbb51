//! The fee module facade.
//!
//! Owns one guarded state cell per configured asset and orchestrates the
//! trade and claim pipelines across the fee splitter, the volume reward
//! ledger, and the yield escrow. Settled reward amounts are passed to the
//! escrow as share counts directly: a reward unit is minted as one vault
//! share at fee-deposit time, so claims left unclaimed appreciate with
//! the vault's share price.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use skim_escrow::{EscrowError, ShareEscrow, YieldVault};
use skim_fees::{split_trade, FeeSplit};
use skim_ledger::VolumeLedger;
use skim_types::{AccountId, Asset};
use tracing::{debug, error, info};

use crate::config::ModuleConfig;
use crate::{ModuleError, Result};

/// Per-asset accounting state, guarded as one unit.
///
/// Everything a trade or claim touches for one asset lives behind the
/// same lock, so ledger and escrow mutations never interleave.
#[derive(Debug)]
struct AssetState {
    /// Vault-share token bound to this asset at setup.
    vault_token: AccountId,
    ledger: VolumeLedger,
    escrow: ShareEscrow,
    /// Set after a fatal post-settlement vault failure; every further
    /// operation on the asset is rejected until manual intervention.
    halted: bool,
}

impl AssetState {
    fn new(vault_token: AccountId) -> Self {
        Self {
            vault_token,
            ledger: VolumeLedger::new(),
            escrow: ShareEscrow::new(),
            halted: false,
        }
    }
}

/// The Skim fee module: fee capture, reward accounting, and vault escrow
/// for every configured asset.
pub struct FeeModule<V: YieldVault> {
    vault: V,
    owner: RwLock<AccountId>,
    module_account: AccountId,
    assets: RwLock<HashMap<Asset, Arc<Mutex<AssetState>>>>,
}

impl<V: YieldVault> FeeModule<V> {
    /// Build a module from its configuration and a vault client.
    pub fn new(vault: V, config: &ModuleConfig) -> Self {
        let assets = config
            .assets
            .iter()
            .map(|binding| {
                (
                    binding.asset,
                    Arc::new(Mutex::new(AssetState::new(binding.vault_token))),
                )
            })
            .collect();
        Self {
            vault,
            owner: RwLock::new(config.owner),
            module_account: config.module_account,
            assets: RwLock::new(assets),
        }
    }

    /// Process one matched trade: skim the fee, credit the reward
    /// ledgers, and deposit the fee into the vault.
    ///
    /// Returns the fee split applied to the trade.
    ///
    /// # Errors
    ///
    /// - [`ModuleError::UnsupportedAsset`] if `asset` is not bound
    /// - [`ModuleError::AssetHalted`] if the asset is halted
    /// - [`ModuleError::Ledger`] / [`ModuleError::Escrow`] on
    ///   accounting failures
    pub fn on_trade(
        &self,
        participant: AccountId,
        asset: Asset,
        trade_input: u64,
    ) -> Result<FeeSplit> {
        let handle = self.asset_state(asset)?;
        let mut state = lock_state(&handle);
        if state.halted {
            return Err(ModuleError::AssetHalted(asset));
        }

        let fees = split_trade(trade_input);
        state
            .ledger
            .record_trade(participant, trade_input, fees.participant_share)?;
        state.ledger.add_operator_accrued(fees.operator_share)?;
        state
            .escrow
            .deposit(&self.vault, asset, fees.fee_total, self.module_account)?;
        state.ledger.note_fee(fees.fee_total);

        debug!(
            %asset,
            participant = %hex::encode(participant),
            input = trade_input,
            fee = fees.fee_total,
            "trade fee captured"
        );
        Ok(fees)
    }

    /// Pay out a participant's pending reward.
    ///
    /// A zero pending amount succeeds as a no-op. Once settled, the
    /// reward is redeemed against the vault with the settled amount as
    /// the share count. Returns the amount the vault released to the
    /// participant.
    ///
    /// # Errors
    ///
    /// - [`ModuleError::UnsupportedAsset`] / [`ModuleError::AssetHalted`]
    /// - [`ModuleError::VaultWithdrawalFailed`] if the vault rejects the
    ///   withdrawal after settlement; the asset halts and stays halted
    pub fn on_claim(&self, participant: AccountId, asset: Asset) -> Result<u64> {
        let handle = self.asset_state(asset)?;
        let mut state = lock_state(&handle);
        if state.halted {
            return Err(ModuleError::AssetHalted(asset));
        }

        let amount = state.ledger.settle(participant)?;
        if amount == 0 {
            return Ok(0);
        }
        let paid = self.redeem(&mut state, asset, amount, participant)?;
        info!(
            %asset,
            participant = %hex::encode(participant),
            reward = amount,
            paid,
            "reward claimed"
        );
        Ok(paid)
    }

    /// Pay out the accrued operator share to the owner. Owner only.
    ///
    /// The operator bucket is zeroed before the withdrawal, mirroring
    /// the participant claim path.
    ///
    /// # Errors
    ///
    /// - [`ModuleError::NotOwner`] for non-owner callers
    /// - otherwise the same conditions as [`on_claim`](Self::on_claim)
    pub fn on_operator_claim(&self, caller: AccountId, asset: Asset) -> Result<u64> {
        self.require_owner(caller)?;
        let handle = self.asset_state(asset)?;
        let mut state = lock_state(&handle);
        if state.halted {
            return Err(ModuleError::AssetHalted(asset));
        }

        let amount = state.ledger.take_operator_accrued();
        if amount == 0 {
            return Ok(0);
        }
        let paid = self.redeem(&mut state, asset, amount, caller)?;
        info!(%asset, reward = amount, paid, "operator reward claimed");
        Ok(paid)
    }

    /// Bind `asset` to its vault-share token, creating its ledgers.
    /// Owner only.
    ///
    /// # Errors
    ///
    /// - [`ModuleError::NotOwner`] for non-owner callers
    /// - [`ModuleError::AssetAlreadyBound`] if the asset is already
    ///   bound: rebinding would orphan its live ledger and escrow
    pub fn bind_asset(
        &self,
        caller: AccountId,
        asset: Asset,
        vault_token: AccountId,
    ) -> Result<()> {
        self.require_owner(caller)?;
        let mut assets = write_lock(&self.assets);
        if assets.contains_key(&asset) {
            return Err(ModuleError::AssetAlreadyBound(asset));
        }
        assets.insert(asset, Arc::new(Mutex::new(AssetState::new(vault_token))));
        info!(%asset, vault_token = %hex::encode(vault_token), "asset bound");
        Ok(())
    }

    /// Transfer module ownership. Owner only, effective immediately.
    ///
    /// # Errors
    ///
    /// - [`ModuleError::NotOwner`] for non-owner callers
    pub fn transfer_ownership(&self, caller: AccountId, new_owner: AccountId) -> Result<()> {
        self.require_owner(caller)?;
        *write_lock(&self.owner) = new_owner;
        info!(new_owner = %hex::encode(new_owner), "module ownership transferred");
        Ok(())
    }

    /// Current module owner.
    pub fn owner(&self) -> AccountId {
        *read_lock(&self.owner)
    }

    /// Pending reward for `participant`, in reward units.
    ///
    /// # Errors
    ///
    /// - [`ModuleError::UnsupportedAsset`] and ledger read failures
    pub fn pending_reward(&self, participant: AccountId, asset: Asset) -> Result<u64> {
        let handle = self.asset_state(asset)?;
        let state = lock_state(&handle);
        Ok(state.ledger.pending_reward(&participant)?)
    }

    /// Pending reward converted to underlying at the current share
    /// price. Display-oriented; the paid amount is fixed at claim time.
    ///
    /// # Errors
    ///
    /// - [`ModuleError::UnsupportedAsset`] and conversion failures
    pub fn pending_reward_in_underlying(
        &self,
        participant: AccountId,
        asset: Asset,
    ) -> Result<u64> {
        let handle = self.asset_state(asset)?;
        let state = lock_state(&handle);
        let pending = state.ledger.pending_reward(&participant)?;
        if pending == 0 {
            return Ok(0);
        }
        Ok(state
            .escrow
            .share_value(pending, self.vault.reported_balance(asset))?)
    }

    /// Undistributed operator reward for `asset`.
    pub fn operator_accrued(&self, asset: Asset) -> Result<u64> {
        Ok(lock_state(&*self.asset_state(asset)?).ledger.operator_accrued())
    }

    /// Lifetime fee collected for `asset` (diagnostic).
    pub fn total_fee_accrued(&self, asset: Asset) -> Result<u64> {
        Ok(lock_state(&*self.asset_state(asset)?).ledger.total_fee_accrued())
    }

    /// Vault shares the module owns for `asset`.
    pub fn vault_shares(&self, asset: Asset) -> Result<u64> {
        Ok(lock_state(&*self.asset_state(asset)?).escrow.vault_shares())
    }

    /// Vault-share token bound to `asset`.
    pub fn vault_token(&self, asset: Asset) -> Result<AccountId> {
        Ok(lock_state(&*self.asset_state(asset)?).vault_token)
    }

    /// Whether `asset` is halted pending manual intervention.
    pub fn is_halted(&self, asset: Asset) -> Result<bool> {
        Ok(lock_state(&*self.asset_state(asset)?).halted)
    }

    /// The vault client (read-only access, e.g. for balance views).
    pub fn vault(&self) -> &V {
        &self.vault
    }

    /// Redeem a settled reward amount against the vault.
    ///
    /// The ledger is already committed when this runs; any escrow or
    /// vault failure is fatal for the asset, which halts rather than
    /// permitting a retry against the already-debited ledger.
    fn redeem(
        &self,
        state: &mut AssetState,
        asset: Asset,
        amount: u64,
        to: AccountId,
    ) -> Result<u64> {
        match state
            .escrow
            .withdraw_by_share(&self.vault, asset, amount, to)
        {
            Ok(paid) => Ok(paid),
            Err(err) => {
                state.halted = true;
                error!(
                    %asset,
                    reward = amount,
                    %err,
                    "vault redemption failed after settlement; asset halted"
                );
                match err {
                    EscrowError::Vault(vault_err) => {
                        Err(ModuleError::VaultWithdrawalFailed(vault_err))
                    }
                    other => Err(ModuleError::Escrow(other)),
                }
            }
        }
    }

    fn asset_state(&self, asset: Asset) -> Result<Arc<Mutex<AssetState>>> {
        read_lock(&self.assets)
            .get(&asset)
            .cloned()
            .ok_or(ModuleError::UnsupportedAsset(asset))
    }

    fn require_owner(&self, caller: AccountId) -> Result<()> {
        if caller != *read_lock(&self.owner) {
            return Err(ModuleError::NotOwner);
        }
        Ok(())
    }
}

fn lock_state(state: &Mutex<AssetState>) -> MutexGuard<'_, AssetState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

fn read_lock<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write_lock<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use skim_escrow::StubVault;

    use super::*;
    use crate::config::AssetBinding;

    const OWNER: AccountId = [0x0A; 32];
    const MODULE: AccountId = [0x1B; 32];
    const ALICE: AccountId = [0xA1; 32];
    const BOB: AccountId = [0xB2; 32];

    fn test_config() -> ModuleConfig {
        ModuleConfig {
            owner: OWNER,
            module_account: MODULE,
            assets: vec![
                AssetBinding {
                    asset: Asset::Base,
                    vault_token: [0x2C; 32],
                },
                AssetBinding {
                    asset: Asset::Quote,
                    vault_token: [0x3D; 32],
                },
            ],
        }
    }

    fn test_module() -> FeeModule<StubVault> {
        FeeModule::new(StubVault::new(), &test_config())
    }

    #[test]
    fn test_trade_captures_fee() {
        let module = test_module();
        let fees = module.on_trade(ALICE, Asset::Base, 1_000_000).expect("trade");
        assert_eq!(fees.fee_total, 1_000);
        assert_eq!(fees.operator_share, 500);
        assert_eq!(fees.participant_share, 500);

        // First trade: the participant share rides with the operator.
        assert_eq!(module.operator_accrued(Asset::Base).expect("view"), 1_000);
        assert_eq!(module.total_fee_accrued(Asset::Base).expect("view"), 1_000);
        assert_eq!(module.vault_shares(Asset::Base).expect("view"), 1_000);
        assert_eq!(module.vault().reported_balance(Asset::Base), 1_000);
    }

    #[test]
    fn test_unbound_asset_rejected() {
        let config = ModuleConfig {
            owner: OWNER,
            module_account: MODULE,
            assets: vec![AssetBinding {
                asset: Asset::Base,
                vault_token: [0x2C; 32],
            }],
        };
        let module = FeeModule::new(StubVault::new(), &config);
        assert!(matches!(
            module.on_trade(ALICE, Asset::Quote, 1_000_000),
            Err(ModuleError::UnsupportedAsset(Asset::Quote))
        ));
        assert!(matches!(
            module.on_claim(ALICE, Asset::Quote),
            Err(ModuleError::UnsupportedAsset(Asset::Quote))
        ));
    }

    #[test]
    fn test_claim_with_nothing_pending_is_noop() {
        let module = test_module();
        assert_eq!(module.on_claim(ALICE, Asset::Base).expect("claim"), 0);
    }

    #[test]
    fn test_trade_then_claim_pays_reward() {
        let module = test_module();
        module.on_trade(ALICE, Asset::Base, 1_000_000).expect("trade");
        module.on_trade(BOB, Asset::Base, 1_000_000).expect("trade");

        // Bob's 500 share spreads over 2M volume; Alice and Bob each
        // pend 250.
        assert_eq!(
            module.pending_reward(ALICE, Asset::Base).expect("pending"),
            250
        );
        assert_eq!(module.on_claim(ALICE, Asset::Base).expect("claim"), 250);
        assert_eq!(module.on_claim(ALICE, Asset::Base).expect("reclaim"), 0);
        assert_eq!(module.on_claim(BOB, Asset::Base).expect("claim"), 250);
    }

    #[test]
    fn test_pending_in_underlying_tracks_yield() {
        let module = test_module();
        module.on_trade(ALICE, Asset::Base, 1_000_000).expect("trade");
        module.on_trade(BOB, Asset::Base, 1_000_000).expect("trade");
        assert_eq!(
            module
                .pending_reward_in_underlying(ALICE, Asset::Base)
                .expect("view"),
            250
        );

        // +10% vault yield: the same 250 reward units are worth 275.
        module.vault().dev_accrue_yield(Asset::Base, 200);
        assert_eq!(
            module
                .pending_reward_in_underlying(ALICE, Asset::Base)
                .expect("view"),
            275
        );
        assert_eq!(
            module.pending_reward(ALICE, Asset::Base).expect("pending"),
            250
        );
    }

    #[test]
    fn test_operator_claim_is_owner_gated() {
        let module = test_module();
        module.on_trade(ALICE, Asset::Base, 1_000_000).expect("trade");

        assert!(matches!(
            module.on_operator_claim(ALICE, Asset::Base),
            Err(ModuleError::NotOwner)
        ));
        assert_eq!(
            module.on_operator_claim(OWNER, Asset::Base).expect("claim"),
            1_000
        );
        assert_eq!(module.operator_accrued(Asset::Base).expect("view"), 0);
        assert_eq!(
            module.on_operator_claim(OWNER, Asset::Base).expect("reclaim"),
            0
        );
    }

    #[test]
    fn test_transfer_ownership_is_immediate() {
        let module = test_module();
        module.on_trade(ALICE, Asset::Base, 1_000_000).expect("trade");

        assert!(matches!(
            module.transfer_ownership(BOB, BOB),
            Err(ModuleError::NotOwner)
        ));
        module.transfer_ownership(OWNER, BOB).expect("transfer");
        assert_eq!(module.owner(), BOB);
        assert!(matches!(
            module.on_operator_claim(OWNER, Asset::Base),
            Err(ModuleError::NotOwner)
        ));
        assert_eq!(
            module.on_operator_claim(BOB, Asset::Base).expect("claim"),
            1_000
        );
    }

    #[test]
    fn test_bind_asset_owner_gated_and_once() {
        let config = ModuleConfig {
            owner: OWNER,
            module_account: MODULE,
            assets: Vec::new(),
        };
        let module = FeeModule::new(StubVault::new(), &config);

        assert!(matches!(
            module.bind_asset(ALICE, Asset::Base, [0x2C; 32]),
            Err(ModuleError::NotOwner)
        ));
        module
            .bind_asset(OWNER, Asset::Base, [0x2C; 32])
            .expect("bind");
        assert_eq!(module.vault_token(Asset::Base).expect("view"), [0x2C; 32]);
        assert!(matches!(
            module.bind_asset(OWNER, Asset::Base, [0x4E; 32]),
            Err(ModuleError::AssetAlreadyBound(Asset::Base))
        ));

        module.on_trade(ALICE, Asset::Base, 1_000_000).expect("trade");
    }

    #[test]
    fn test_vault_failure_halts_asset() {
        let module = test_module();
        module.on_trade(ALICE, Asset::Base, 1_000_000).expect("trade");
        module.on_trade(BOB, Asset::Base, 1_000_000).expect("trade");
        module.on_trade(ALICE, Asset::Quote, 5_000_000).expect("trade");

        module.vault().dev_set_withdrawals_enabled(false);
        assert!(matches!(
            module.on_claim(ALICE, Asset::Base),
            Err(ModuleError::VaultWithdrawalFailed(_))
        ));
        assert!(module.is_halted(Asset::Base).expect("view"));

        // The settlement committed before the failure: the pending
        // amount is gone. This is the documented partial-failure state.
        module.vault().dev_set_withdrawals_enabled(true);

        // The asset stays halted until manual intervention, even after
        // the vault recovers.
        assert!(matches!(
            module.on_trade(ALICE, Asset::Base, 1_000_000),
            Err(ModuleError::AssetHalted(Asset::Base))
        ));
        assert!(matches!(
            module.on_claim(BOB, Asset::Base),
            Err(ModuleError::AssetHalted(Asset::Base))
        ));
        assert!(matches!(
            module.on_operator_claim(OWNER, Asset::Base),
            Err(ModuleError::AssetHalted(Asset::Base))
        ));

        // The other asset is unaffected.
        assert!(!module.is_halted(Asset::Quote).expect("view"));
        module.on_trade(BOB, Asset::Quote, 1_000_000).expect("trade");
    }

    #[test]
    fn test_assets_account_independently() {
        let module = test_module();
        module.on_trade(ALICE, Asset::Base, 1_000_000).expect("trade");
        module.on_trade(ALICE, Asset::Quote, 9_000_000).expect("trade");

        assert_eq!(module.total_fee_accrued(Asset::Base).expect("view"), 1_000);
        assert_eq!(module.total_fee_accrued(Asset::Quote).expect("view"), 9_000);
        assert_eq!(module.vault_shares(Asset::Base).expect("view"), 1_000);
        assert_eq!(module.vault_shares(Asset::Quote).expect("view"), 9_000);
    }

    #[test]
    fn test_sub_fee_trade_moves_no_value() {
        let module = test_module();
        let fees = module.on_trade(ALICE, Asset::Base, 999).expect("trade");
        assert_eq!(fees.fee_total, 0);
        assert_eq!(module.vault_shares(Asset::Base).expect("view"), 0);
        // Volume still counts toward future reward distribution.
        assert_eq!(module.pending_reward(ALICE, Asset::Base).expect("view"), 0);
    }
}
