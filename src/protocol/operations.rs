//! Protocol facade: the caller-facing surface and the owner-gated
//! administrative surface.
//!
//! Wires the position ledger, round engine, redemption controller, and
//! treasury behind one struct. Block heights, timestamps, and oracle prices
//! arrive from the host environment with each call; the facade holds no
//! clock of its own.

use serde::{Deserialize, Serialize};

use crate::core::config::{ControllerParams, ProtocolConfig, ProtocolParams};
use crate::core::position::{Position, PositionId, PositionLedger};
use crate::core::treasury::Treasury;
use crate::error::{Error, Result};
use crate::protocol::events::ProtocolEvent;
use crate::redemption::controller::{RedemptionController, RedemptionState};
use crate::rounds::engine::{LiquidationOutcome, LiquidationRoundEngine, RevealOutcome};
use crate::rounds::keeper::KeeperRecord;
use crate::rounds::round::{LiquidationRound, RoundId};
use crate::scoring::gateway::HiddenScorer;
use crate::utils::constants::{NONCE_LENGTH, PRICE_UNIT};
use crate::utils::crypto::{AccountId, Hash};

/// The assembled fairliq protocol
pub struct Protocol {
    config: ProtocolConfig,
    positions: PositionLedger,
    engine: LiquidationRoundEngine,
    controller: RedemptionController,
    treasury: Treasury,
    scorer: Box<dyn HiddenScorer + Send + Sync>,
    events: Vec<ProtocolEvent>,
}

impl Protocol {
    /// Assemble a protocol with default parameters and the given scoring
    /// capability
    pub fn new(owner: AccountId, scorer: Box<dyn HiddenScorer + Send + Sync>) -> Self {
        Self::with_config(
            ProtocolConfig::new(owner),
            ControllerParams::default(),
            scorer,
        )
    }

    /// Assemble a protocol with explicit configuration
    pub fn with_config(
        config: ProtocolConfig,
        controller_params: ControllerParams,
        scorer: Box<dyn HiddenScorer + Send + Sync>,
    ) -> Self {
        Self {
            config,
            positions: PositionLedger::new(),
            engine: LiquidationRoundEngine::new(),
            controller: RedemptionController::new(controller_params, PRICE_UNIT),
            treasury: Treasury::new(),
            scorer,
            events: Vec::new(),
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // CALLER-FACING SURFACE
    // ═══════════════════════════════════════════════════════════════════════════

    /// Open a position with the given collateral and debt
    pub fn open_position(
        &mut self,
        caller: AccountId,
        collateral: u64,
        debt: u64,
        now: u64,
    ) -> Result<PositionId> {
        let position_id = self.positions.open(caller, collateral, debt, now)?;

        self.push_event(ProtocolEvent::PositionOpened {
            position_id,
            owner: caller,
            collateral,
            debt,
            timestamp: now,
        });

        Ok(position_id)
    }

    /// Open a liquidation round against an active position. Permissionless.
    pub fn start_round(&mut self, position_id: PositionId, height: u64) -> Result<RoundId> {
        let round_id = self.engine.start_round(&self.positions, position_id, height)?;

        self.push_event(ProtocolEvent::RoundStarted {
            round_id,
            position_id,
            height,
        });

        Ok(round_id)
    }

    /// Submit a binding commitment to a round during its commit window
    pub fn commit(
        &mut self,
        caller: AccountId,
        round_id: RoundId,
        commitment: Hash,
        height: u64,
    ) -> Result<()> {
        self.engine
            .commit(&self.config, round_id, caller, commitment, height)?;

        self.push_event(ProtocolEvent::CommitmentStored {
            round_id,
            keeper: caller,
            commitment,
            height,
        });

        Ok(())
    }

    /// Reveal a commitment during the reveal window
    #[allow(clippy::too_many_arguments)]
    pub fn reveal(
        &mut self,
        caller: AccountId,
        round_id: RoundId,
        nonce: [u8; NONCE_LENGTH],
        randomness: [u8; NONCE_LENGTH],
        oracle_price: u64,
        now: u64,
        height: u64,
    ) -> Result<RevealOutcome> {
        let outcome = self.engine.reveal(
            &self.positions,
            &self.config,
            self.scorer.as_ref(),
            round_id,
            caller,
            nonce,
            randomness,
            oracle_price,
            now,
            height,
        )?;

        self.push_event(ProtocolEvent::KeeperRevealed {
            round_id,
            keeper: caller,
            eligible: outcome.eligible,
            height,
        });

        Ok(outcome)
    }

    /// Execute a round once its full length has elapsed. Permissionless.
    pub fn execute_liquidation(
        &mut self,
        round_id: RoundId,
        height: u64,
    ) -> Result<LiquidationOutcome> {
        let outcome = self
            .engine
            .execute(&mut self.positions, &self.config, round_id, height)?;

        self.treasury.credit(outcome.treasury_credit)?;

        self.push_event(ProtocolEvent::RoundExecuted {
            round_id,
            position_id: outcome.position_id,
            penalty: outcome.penalty,
            keeper_payout: outcome.keeper_payout,
            keeper_count: outcome.keepers.len() as u64,
            treasury_credit: outcome.treasury_credit,
            height,
        });

        Ok(outcome)
    }

    /// Fold a market price observation into the redemption controller
    pub fn update_redemption_rate(&mut self, market_price: u64, now: u64) -> Result<i64> {
        let rate = self.controller.update(market_price, now)?;

        self.push_event(ProtocolEvent::RateUpdated {
            market_price,
            rate,
            price: self.controller.state().price,
            timestamp: now,
        });

        Ok(rate)
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // READ-ONLY QUERIES
    // ═══════════════════════════════════════════════════════════════════════════

    /// Position by id
    pub fn position(&self, position_id: PositionId) -> Result<&Position> {
        self.positions.get(position_id)
    }

    /// Round by id
    pub fn round(&self, round_id: RoundId) -> Result<&LiquidationRound> {
        self.engine.round(round_id)
    }

    /// Keeper record, if the keeper ever proved eligibility
    pub fn keeper(&self, keeper: &AccountId) -> Option<&KeeperRecord> {
        self.engine.keepers().get(keeper)
    }

    /// Redemption controller state
    pub fn redemption_state(&self) -> &RedemptionState {
        self.controller.state()
    }

    /// Treasury balance
    pub fn treasury_balance(&self) -> u64 {
        self.treasury.balance()
    }

    /// Protocol parameters
    pub fn params(&self) -> &ProtocolParams {
        &self.config.params
    }

    /// Current per-feature score threshold
    pub fn score_threshold(&self) -> i64 {
        self.config.score_threshold
    }

    /// Event log, oldest first
    pub fn events(&self) -> &[ProtocolEvent] {
        &self.events
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // ADMINISTRATIVE SURFACE (owner-gated)
    // ═══════════════════════════════════════════════════════════════════════════

    /// Set the controller's reference (target) price
    pub fn set_target_price(&mut self, caller: AccountId, target: u64) -> Result<()> {
        self.require_owner(&caller)?;

        let old_target = self.controller.target();
        self.controller.set_target(target);

        self.push_event(ProtocolEvent::TargetPriceChanged {
            old_target,
            new_target: self.controller.target(),
        });

        Ok(())
    }

    /// Set the per-feature score threshold
    pub fn set_score_threshold(&mut self, caller: AccountId, threshold: i64) -> Result<()> {
        self.require_owner(&caller)?;

        let old_threshold = self.config.score_threshold;
        self.config.score_threshold = threshold;

        self.push_event(ProtocolEvent::ThresholdChanged {
            old_threshold,
            new_threshold: threshold,
        });

        Ok(())
    }

    /// Withdraw treasury funds
    pub fn withdraw_treasury(&mut self, caller: AccountId, amount: u64) -> Result<()> {
        self.require_owner(&caller)?;

        self.treasury.withdraw(amount)?;

        self.push_event(ProtocolEvent::TreasuryWithdrawn {
            amount,
            remaining: self.treasury.balance(),
        });

        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // INTERNAL
    // ═══════════════════════════════════════════════════════════════════════════

    fn require_owner(&self, caller: &AccountId) -> Result<()> {
        if *caller != self.config.owner {
            return Err(Error::Unauthorized(
                "only the protocol owner may perform this operation".into(),
            ));
        }
        Ok(())
    }

    /// Append an event, pruning the oldest past the configured cap
    fn push_event(&mut self, event: ProtocolEvent) {
        tracing::info!(event = event.event_type(), "protocol event");
        self.events.push(event);

        let cap = self.config.params.max_event_log;
        if self.events.len() > cap {
            let excess = self.events.len() - cap;
            self.events.drain(0..excess);
        }
    }
}

impl std::fmt::Debug for Protocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Protocol")
            .field("positions", &self.positions.total_count())
            .field("rounds", &self.engine.total_rounds())
            .field("treasury", &self.treasury.balance())
            .finish()
    }
}

/// Serializable protocol snapshot (the scorer capability is external and
/// re-injected on restore)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProtocolSnapshot {
    /// Configuration
    pub config: ProtocolConfig,
    /// Position ledger
    pub positions: PositionLedger,
    /// Round engine
    pub engine: LiquidationRoundEngine,
    /// Controller
    pub controller: RedemptionController,
    /// Treasury
    pub treasury: Treasury,
}

impl Protocol {
    /// Capture a serializable snapshot of all protocol state
    pub fn snapshot(&self) -> ProtocolSnapshot {
        ProtocolSnapshot {
            config: self.config.clone(),
            positions: self.positions.clone(),
            engine: self.engine.clone(),
            controller: self.controller.clone(),
            treasury: self.treasury.clone(),
        }
    }

    /// Restore a protocol from a snapshot, re-injecting the scorer
    pub fn restore(
        snapshot: ProtocolSnapshot,
        scorer: Box<dyn HiddenScorer + Send + Sync>,
    ) -> Self {
        Self {
            config: snapshot.config,
            positions: snapshot.positions,
            engine: snapshot.engine,
            controller: snapshot.controller,
            treasury: snapshot.treasury,
            scorer,
            events: Vec::new(),
        }
    }
}
