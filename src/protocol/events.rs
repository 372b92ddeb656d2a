//! Protocol events for state change notifications.
//!
//! Every significant state change emits one event into the protocol's
//! bounded in-memory log, mirrored through `tracing` for operators.

use serde::{Deserialize, Serialize};

use crate::utils::crypto::{AccountId, Hash};

/// All protocol event types
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ProtocolEvent {
    /// A position was opened
    PositionOpened {
        /// New position id
        position_id: u64,
        /// Owner identity
        owner: AccountId,
        /// Collateral deposited, base units
        collateral: u64,
        /// Debt issued, stable units
        debt: u64,
        /// Creation timestamp
        timestamp: u64,
    },

    /// A liquidation round was opened against a position
    RoundStarted {
        /// New round id
        round_id: u64,
        /// Target position
        position_id: u64,
        /// Block height the round opened at
        height: u64,
    },

    /// A keeper's commitment was stored
    CommitmentStored {
        /// Round the commitment belongs to
        round_id: u64,
        /// Committing keeper
        keeper: AccountId,
        /// The binding commitment hash
        commitment: Hash,
        /// Block height of submission
        height: u64,
    },

    /// A keeper revealed; emitted whether or not eligibility was proven
    KeeperRevealed {
        /// Round the reveal belongs to
        round_id: u64,
        /// Revealing keeper
        keeper: AccountId,
        /// Whether the hidden score cleared the threshold
        eligible: bool,
        /// Block height of the reveal
        height: u64,
    },

    /// A round was executed and the position liquidated
    RoundExecuted {
        /// Executed round
        round_id: u64,
        /// Liquidated position
        position_id: u64,
        /// Total penalty, collateral base units
        penalty: u64,
        /// Identical payout per valid keeper
        keeper_payout: u64,
        /// Number of keepers paid
        keeper_count: u64,
        /// Treasury credit
        treasury_credit: u64,
        /// Block height of execution
        height: u64,
    },

    /// The redemption controller accepted a market observation
    RateUpdated {
        /// Observed market price
        market_price: u64,
        /// New signed rate
        rate: i64,
        /// New redemption price
        price: u64,
        /// Update timestamp
        timestamp: u64,
    },

    /// The owner changed the controller's target price
    TargetPriceChanged {
        /// Previous target
        old_target: u64,
        /// New target
        new_target: u64,
    },

    /// The owner changed the per-feature score threshold
    ThresholdChanged {
        /// Previous threshold
        old_threshold: i64,
        /// New threshold
        new_threshold: i64,
    },

    /// The owner withdrew treasury funds
    TreasuryWithdrawn {
        /// Amount withdrawn
        amount: u64,
        /// Remaining balance
        remaining: u64,
    },
}

impl ProtocolEvent {
    /// Get the event type as a string
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::PositionOpened { .. } => "PositionOpened",
            Self::RoundStarted { .. } => "RoundStarted",
            Self::CommitmentStored { .. } => "CommitmentStored",
            Self::KeeperRevealed { .. } => "KeeperRevealed",
            Self::RoundExecuted { .. } => "RoundExecuted",
            Self::RateUpdated { .. } => "RateUpdated",
            Self::TargetPriceChanged { .. } => "TargetPriceChanged",
            Self::ThresholdChanged { .. } => "ThresholdChanged",
            Self::TreasuryWithdrawn { .. } => "TreasuryWithdrawn",
        }
    }
}
