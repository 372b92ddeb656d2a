//! Liquidation round records and phase arithmetic.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::core::config::ProtocolParams;
use crate::utils::crypto::{AccountId, Hash};

/// Unique identifier for a round, an index into the engine's round arena
pub type RoundId = u64;

// ═══════════════════════════════════════════════════════════════════════════════
// ROUND PHASE
// ═══════════════════════════════════════════════════════════════════════════════

/// Phase of a liquidation round at a given block height
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundPhase {
    /// Commitments accepted: `[start, start + commit_window)`
    Commit,
    /// Reveals accepted: `[start + commit_window, start + round_length)`
    Reveal,
    /// Execution possible: `[start + round_length, ∞)`
    Executable,
}

impl RoundPhase {
    /// Classify the phase for a round started at `start_height`
    pub fn at(start_height: u64, height: u64, params: &ProtocolParams) -> Self {
        let elapsed = height.saturating_sub(start_height);
        if elapsed < params.commit_window {
            RoundPhase::Commit
        } else if elapsed < params.round_length {
            RoundPhase::Reveal
        } else {
            RoundPhase::Executable
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// LIQUIDATION ROUND
// ═══════════════════════════════════════════════════════════════════════════════

/// A liquidation round against one position.
///
/// `revealed` tracks everyone who spent their reveal; `valid_keepers` only
/// those whose reveal proved eligibility. The two diverge whenever a keeper
/// reveals correctly but the hidden score says the position is safe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiquidationRound {
    /// Round identifier
    pub id: RoundId,
    /// Target position
    pub position_id: u64,
    /// Block height the round opened at
    pub start_height: u64,
    /// One binding commitment per keeper
    pub(crate) commitments: HashMap<AccountId, Hash>,
    /// Keepers who have revealed, eligible or not
    pub(crate) revealed: HashSet<AccountId>,
    /// Keepers whose reveal proved eligibility, in reveal order
    pub(crate) valid_keepers: Vec<AccountId>,
    /// True once finalized; terminal
    pub executed: bool,
}

impl LiquidationRound {
    /// Create a fresh round
    pub(crate) fn new(id: RoundId, position_id: u64, start_height: u64) -> Self {
        Self {
            id,
            position_id,
            start_height,
            commitments: HashMap::new(),
            revealed: HashSet::new(),
            valid_keepers: Vec::new(),
            executed: false,
        }
    }

    /// Phase of this round at `height`
    pub fn phase(&self, height: u64, params: &ProtocolParams) -> RoundPhase {
        RoundPhase::at(self.start_height, height, params)
    }

    /// Stored commitment for a keeper, if any
    pub fn commitment_of(&self, keeper: &AccountId) -> Option<&Hash> {
        self.commitments.get(keeper)
    }

    /// Whether a keeper has committed in this round
    pub fn has_committed(&self, keeper: &AccountId) -> bool {
        self.commitments.contains_key(keeper)
    }

    /// Whether a keeper has already revealed in this round
    pub fn has_revealed(&self, keeper: &AccountId) -> bool {
        self.revealed.contains(keeper)
    }

    /// Number of stored commitments
    pub fn commitment_count(&self) -> usize {
        self.commitments.len()
    }

    /// Keepers whose reveal proved eligibility
    pub fn valid_keepers(&self) -> &[AccountId] {
        &self.valid_keepers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_boundaries() {
        let params = ProtocolParams::default().with_windows(10, 20);
        let start = 100;

        assert_eq!(RoundPhase::at(start, 100, &params), RoundPhase::Commit);
        assert_eq!(RoundPhase::at(start, 109, &params), RoundPhase::Commit);
        assert_eq!(RoundPhase::at(start, 110, &params), RoundPhase::Reveal);
        assert_eq!(RoundPhase::at(start, 119, &params), RoundPhase::Reveal);
        assert_eq!(RoundPhase::at(start, 120, &params), RoundPhase::Executable);
        assert_eq!(RoundPhase::at(start, 1_000_000, &params), RoundPhase::Executable);
    }

    #[test]
    fn test_fresh_round_is_empty() {
        let round = LiquidationRound::new(0, 7, 100);
        assert_eq!(round.commitment_count(), 0);
        assert!(round.valid_keepers().is_empty());
        assert!(!round.executed);
    }
}
