//! Liquidation round engine: the commit-reveal state machine.
//!
//! Rounds live in an index-based arena. Every operation either fully
//! applies or rejects before mutating anything; window checks, duplicate
//! guards, and the commitment-digest comparison all happen before the
//! first write.

use serde::{Deserialize, Serialize};

use crate::core::config::ProtocolConfig;
use crate::core::position::PositionLedger;
use crate::error::{Error, Result};
use crate::rounds::keeper::KeeperLedger;
use crate::rounds::round::{LiquidationRound, RoundId, RoundPhase};
use crate::scoring::features::FeatureExtractor;
use crate::scoring::gateway::{HiddenScorer, ALL_ONES_SELECTOR};
use crate::utils::constants::NONCE_LENGTH;
use crate::utils::crypto::{commitment_digest, AccountId, Hash};
use crate::utils::math::{penalty_amount, split_penalty};

// ═══════════════════════════════════════════════════════════════════════════════
// OUTCOMES
// ═══════════════════════════════════════════════════════════════════════════════

/// Result of a reveal, emitted whether or not the keeper proved eligibility
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevealOutcome {
    /// Round the reveal belongs to
    pub round_id: RoundId,
    /// Revealing keeper
    pub keeper: AccountId,
    /// Whether the hidden score cleared the threshold
    pub eligible: bool,
    /// Aggregate hidden-weighted score (the only value the scheme reveals)
    pub score: i64,
}

/// Result of executing a round
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiquidationOutcome {
    /// Executed round
    pub round_id: RoundId,
    /// Liquidated position
    pub position_id: u64,
    /// Total penalty, collateral base units
    pub penalty: u64,
    /// Payout per valid keeper (all payouts are identical)
    pub keeper_payout: u64,
    /// Keepers that were paid, in reveal order
    pub keepers: Vec<AccountId>,
    /// Amount credited to the treasury (30% share plus division dust)
    pub treasury_credit: u64,
    /// Block height of execution
    pub height: u64,
}

// ═══════════════════════════════════════════════════════════════════════════════
// ROUND ENGINE
// ═══════════════════════════════════════════════════════════════════════════════

/// Engine owning every round, commitment, and the keeper ledger
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LiquidationRoundEngine {
    /// Round arena; RoundId is the index
    rounds: Vec<LiquidationRound>,
    /// Keeper success counts and earnings
    keepers: KeeperLedger,
    /// Rounds executed so far
    total_executed: u64,
    /// Sum of penalties across executed rounds
    total_penalties: u64,
}

impl LiquidationRoundEngine {
    /// Create an engine with no rounds
    pub fn new() -> Self {
        Self::default()
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // ROUND LIFECYCLE
    // ═══════════════════════════════════════════════════════════════════════════

    /// Open a liquidation round against an active position.
    ///
    /// Several rounds may target the same position at once; the first to
    /// execute wins and later executions fail against the inactive
    /// position. A liveness trade-off made deliberately: a stranded round
    /// never blocks a fresh attempt.
    pub fn start_round(
        &mut self,
        positions: &PositionLedger,
        position_id: u64,
        height: u64,
    ) -> Result<RoundId> {
        positions.get_active(position_id)?;

        let id = self.rounds.len() as RoundId;
        self.rounds.push(LiquidationRound::new(id, position_id, height));

        tracing::info!(round = id, position = position_id, height, "round started");

        Ok(id)
    }

    /// Store a keeper's binding commitment.
    pub fn commit(
        &mut self,
        config: &ProtocolConfig,
        round_id: RoundId,
        keeper: AccountId,
        commitment: Hash,
        height: u64,
    ) -> Result<()> {
        let round = self.round_mut(round_id)?;

        if round.phase(height, &config.params) != RoundPhase::Commit {
            return Err(Error::WindowClosed {
                closed_at: round.start_height + config.params.commit_window,
                height,
            });
        }

        if round.has_committed(&keeper) {
            return Err(Error::DuplicateCommit(keeper.short()));
        }

        round.commitments.insert(keeper, commitment);

        tracing::debug!(round = round_id, keeper = %keeper.short(), "commitment stored");

        Ok(())
    }

    /// Reveal a commitment and run the hidden eligibility check.
    ///
    /// The digest comparison is the anti-front-running check: a commitment
    /// cannot be altered after submission and the preimage cannot be
    /// guessed without the original nonce. An ineligible reveal is still
    /// consumed; it just earns nothing.
    #[allow(clippy::too_many_arguments)]
    pub fn reveal(
        &mut self,
        positions: &PositionLedger,
        config: &ProtocolConfig,
        scorer: &dyn HiddenScorer,
        round_id: RoundId,
        keeper: AccountId,
        nonce: [u8; NONCE_LENGTH],
        randomness: [u8; NONCE_LENGTH],
        oracle_price: u64,
        now: u64,
        height: u64,
    ) -> Result<RevealOutcome> {
        let round = self
            .rounds
            .get(round_id as usize)
            .ok_or(Error::RoundNotFound(round_id))?;

        match round.phase(height, &config.params) {
            RoundPhase::Commit => {
                return Err(Error::WindowNotOpenYet {
                    opens_at: round.start_height + config.params.commit_window,
                    height,
                })
            }
            RoundPhase::Executable => {
                return Err(Error::WindowClosed {
                    closed_at: round.start_height + config.params.round_length,
                    height,
                })
            }
            RoundPhase::Reveal => {}
        }

        if round.has_revealed(&keeper) {
            return Err(Error::DuplicateReveal(keeper.short()));
        }

        let expected = commitment_digest(round.position_id, &keeper, &nonce);
        match round.commitment_of(&keeper) {
            Some(stored) if *stored == expected => {}
            _ => return Err(Error::InvalidReveal),
        }

        // Eligibility: extract features from public state, score them
        // through the hidden gateway, compare against the aggregate bound.
        let position = positions.get(round.position_id)?;
        let extractor = FeatureExtractor::new(
            config.params.typical_position_value,
            config.params.age_cap_secs,
        );
        let features = extractor.extract(position, oracle_price, now);
        let ciphertext = scorer.encrypt_vector(&features, &randomness);
        let score = scorer.weighted_sum(&ciphertext, &ALL_ONES_SELECTOR)?;
        let eligible = score < config.eligibility_bound();

        // All checks passed; apply.
        let round = &mut self.rounds[round_id as usize];
        round.revealed.insert(keeper);
        if eligible {
            round.valid_keepers.push(keeper);
            self.keepers.record_success(keeper);
        }

        tracing::info!(
            round = round_id,
            keeper = %keeper.short(),
            eligible,
            "reveal verified"
        );

        Ok(RevealOutcome {
            round_id,
            keeper,
            eligible,
            score,
        })
    }

    /// Finalize a round: deactivate the position, split the penalty, pay
    /// the keeper pool, credit the treasury share.
    ///
    /// With zero valid keepers the round is permanently stranded — by
    /// design it must not fall back to a winner-takes-all payout.
    pub fn execute(
        &mut self,
        positions: &mut PositionLedger,
        config: &ProtocolConfig,
        round_id: RoundId,
        height: u64,
    ) -> Result<LiquidationOutcome> {
        let round = self
            .rounds
            .get(round_id as usize)
            .ok_or(Error::RoundNotFound(round_id))?;

        let executable_at = round.start_height + config.params.round_length;
        if height < executable_at {
            return Err(Error::RoundIncomplete {
                executable_at,
                height,
            });
        }

        if round.executed {
            return Err(Error::AlreadyExecuted(round_id));
        }

        if round.valid_keepers.is_empty() {
            return Err(Error::NoValidKeepers(round_id));
        }

        // A concurrent round may have won the race already.
        let position = positions.get_active(round.position_id)?;

        let penalty = penalty_amount(position.collateral, config.params.penalty_bps)?;
        let keeper_count = round.valid_keepers.len() as u64;
        let (keeper_payout, treasury_credit) =
            split_penalty(penalty, config.params.keeper_share_bps, keeper_count)?;

        // All checks and arithmetic done; apply.
        let position_id = round.position_id;
        positions.deactivate(position_id)?;

        let round = &mut self.rounds[round_id as usize];
        round.executed = true;
        let keepers: Vec<AccountId> = round.valid_keepers.clone();

        for keeper in &keepers {
            self.keepers.record_earning(*keeper, keeper_payout);
        }

        self.total_executed += 1;
        self.total_penalties = self.total_penalties.saturating_add(penalty);

        tracing::info!(
            round = round_id,
            position = position_id,
            penalty,
            keeper_payout,
            keeper_count,
            treasury_credit,
            "round executed"
        );

        Ok(LiquidationOutcome {
            round_id,
            position_id,
            penalty,
            keeper_payout,
            keepers,
            treasury_credit,
            height,
        })
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // QUERIES
    // ═══════════════════════════════════════════════════════════════════════════

    /// Get a round by id
    pub fn round(&self, round_id: RoundId) -> Result<&LiquidationRound> {
        self.rounds
            .get(round_id as usize)
            .ok_or(Error::RoundNotFound(round_id))
    }

    /// Keeper ledger, read-only
    pub fn keepers(&self) -> &KeeperLedger {
        &self.keepers
    }

    /// Number of rounds ever started
    pub fn total_rounds(&self) -> u64 {
        self.rounds.len() as u64
    }

    /// Number of rounds executed
    pub fn total_executed(&self) -> u64 {
        self.total_executed
    }

    /// Sum of penalties across executed rounds
    pub fn total_penalties(&self) -> u64 {
        self.total_penalties
    }

    /// Serialize the engine to bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        bincode::serialize(self).map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Deserialize an engine from bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        bincode::deserialize(bytes).map_err(|e| Error::Deserialization(e.to_string()))
    }

    fn round_mut(&mut self, round_id: RoundId) -> Result<&mut LiquidationRound> {
        self.rounds
            .get_mut(round_id as usize)
            .ok_or(Error::RoundNotFound(round_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::gateway::FixedScoreScorer;
    use crate::utils::constants::{COLLATERAL_UNIT, COMMIT_WINDOW, ROUND_LENGTH};
    use crate::utils::crypto::random_nonce;

    const PRICE: u64 = 200_000;

    fn setup() -> (PositionLedger, ProtocolConfig, LiquidationRoundEngine, u64) {
        let mut positions = PositionLedger::new();
        let position_id = positions
            .open(AccountId::derive(b"owner"), COLLATERAL_UNIT, 150_375, 0)
            .unwrap();
        let config = ProtocolConfig::new(AccountId::derive(b"admin"));
        (positions, config, LiquidationRoundEngine::new(), position_id)
    }

    fn keeper(label: &[u8]) -> AccountId {
        AccountId::derive(label)
    }

    /// Commit during the commit window with a well-formed digest
    fn commit_keeper(
        engine: &mut LiquidationRoundEngine,
        config: &ProtocolConfig,
        round_id: RoundId,
        position_id: u64,
        who: AccountId,
    ) -> [u8; NONCE_LENGTH] {
        let nonce = random_nonce();
        let commitment = commitment_digest(position_id, &who, &nonce);
        engine.commit(config, round_id, who, commitment, 0).unwrap();
        nonce
    }

    #[test]
    fn test_start_round_requires_active_position() {
        let (mut positions, _config, mut engine, position_id) = setup();

        let round_id = engine.start_round(&positions, position_id, 0).unwrap();
        assert_eq!(round_id, 0);

        positions.deactivate(position_id).unwrap();
        let err = engine.start_round(&positions, position_id, 1).unwrap_err();
        assert_eq!(err, Error::PositionInactive(position_id));
    }

    #[test]
    fn test_concurrent_rounds_same_position_allowed() {
        let (positions, _config, mut engine, position_id) = setup();

        let a = engine.start_round(&positions, position_id, 0).unwrap();
        let b = engine.start_round(&positions, position_id, 3).unwrap();
        assert_ne!(a, b);
        assert_eq!(engine.total_rounds(), 2);
    }

    #[test]
    fn test_commit_window_enforced() {
        let (positions, config, mut engine, position_id) = setup();
        let round_id = engine.start_round(&positions, position_id, 0).unwrap();
        let who = keeper(b"k1");

        let err = engine
            .commit(&config, round_id, who, Hash::zero(), COMMIT_WINDOW)
            .unwrap_err();
        assert!(matches!(err, Error::WindowClosed { .. }));
        assert_eq!(engine.round(round_id).unwrap().commitment_count(), 0);
    }

    #[test]
    fn test_duplicate_commit_rejected_state_unchanged() {
        let (positions, config, mut engine, position_id) = setup();
        let round_id = engine.start_round(&positions, position_id, 0).unwrap();
        let who = keeper(b"k1");

        let first = commitment_digest(position_id, &who, &random_nonce());
        engine.commit(&config, round_id, who, first, 1).unwrap();

        let second = commitment_digest(position_id, &who, &random_nonce());
        let err = engine.commit(&config, round_id, who, second, 2).unwrap_err();
        assert_eq!(err, Error::DuplicateCommit(who.short()));

        // The original commitment survives
        let round = engine.round(round_id).unwrap();
        assert_eq!(round.commitment_count(), 1);
        assert_eq!(round.commitment_of(&who), Some(&first));
    }

    #[test]
    fn test_reveal_window_boundaries() {
        let (positions, config, mut engine, position_id) = setup();
        let round_id = engine.start_round(&positions, position_id, 0).unwrap();
        let who = keeper(b"k1");
        let nonce = commit_keeper(&mut engine, &config, round_id, position_id, who);
        let scorer = FixedScoreScorer(0);

        // Too early: still in the commit window
        let err = engine
            .reveal(&positions, &config, &scorer, round_id, who, nonce, random_nonce(), PRICE, 0, COMMIT_WINDOW - 1)
            .unwrap_err();
        assert!(matches!(err, Error::WindowNotOpenYet { .. }));

        // Too late: round length elapsed
        let err = engine
            .reveal(&positions, &config, &scorer, round_id, who, nonce, random_nonce(), PRICE, 0, ROUND_LENGTH)
            .unwrap_err();
        assert!(matches!(err, Error::WindowClosed { .. }));

        // In the window it goes through
        let outcome = engine
            .reveal(&positions, &config, &scorer, round_id, who, nonce, random_nonce(), PRICE, 0, COMMIT_WINDOW)
            .unwrap();
        assert!(outcome.eligible);
    }

    #[test]
    fn test_reveal_mismatched_nonce_rejected() {
        let (positions, config, mut engine, position_id) = setup();
        let round_id = engine.start_round(&positions, position_id, 0).unwrap();
        let who = keeper(b"k1");
        let _nonce = commit_keeper(&mut engine, &config, round_id, position_id, who);
        let scorer = FixedScoreScorer(0);

        let err = engine
            .reveal(&positions, &config, &scorer, round_id, who, random_nonce(), random_nonce(), PRICE, 0, COMMIT_WINDOW)
            .unwrap_err();
        assert_eq!(err, Error::InvalidReveal);

        // Round untouched by the failed reveal
        let round = engine.round(round_id).unwrap();
        assert!(!round.has_revealed(&who));
        assert!(round.valid_keepers().is_empty());
    }

    #[test]
    fn test_reveal_without_commitment_rejected() {
        let (positions, config, mut engine, position_id) = setup();
        let round_id = engine.start_round(&positions, position_id, 0).unwrap();
        let who = keeper(b"never-committed");
        let scorer = FixedScoreScorer(0);

        let err = engine
            .reveal(&positions, &config, &scorer, round_id, who, random_nonce(), random_nonce(), PRICE, 0, COMMIT_WINDOW)
            .unwrap_err();
        assert_eq!(err, Error::InvalidReveal);
    }

    #[test]
    fn test_duplicate_reveal_rejected() {
        let (positions, config, mut engine, position_id) = setup();
        let round_id = engine.start_round(&positions, position_id, 0).unwrap();
        let who = keeper(b"k1");
        let nonce = commit_keeper(&mut engine, &config, round_id, position_id, who);
        let scorer = FixedScoreScorer(0);

        engine
            .reveal(&positions, &config, &scorer, round_id, who, nonce, random_nonce(), PRICE, 0, COMMIT_WINDOW)
            .unwrap();

        let err = engine
            .reveal(&positions, &config, &scorer, round_id, who, nonce, random_nonce(), PRICE, 0, COMMIT_WINDOW + 1)
            .unwrap_err();
        assert_eq!(err, Error::DuplicateReveal(who.short()));
    }

    #[test]
    fn test_ineligible_reveal_spends_the_reveal() {
        let (positions, config, mut engine, position_id) = setup();
        let round_id = engine.start_round(&positions, position_id, 0).unwrap();
        let who = keeper(b"k1");
        let nonce = commit_keeper(&mut engine, &config, round_id, position_id, who);

        // Score far above the bound: correct reveal, safe position
        let scorer = FixedScoreScorer(i64::MAX / 2);
        let outcome = engine
            .reveal(&positions, &config, &scorer, round_id, who, nonce, random_nonce(), PRICE, 0, COMMIT_WINDOW)
            .unwrap();

        assert!(!outcome.eligible);
        let round = engine.round(round_id).unwrap();
        assert!(round.has_revealed(&who));
        assert!(round.valid_keepers().is_empty());
        assert!(engine.keepers().get(&who).is_none());

        // And the reveal cannot be retried with a different scorer outcome
        let err = engine
            .reveal(&positions, &config, &FixedScoreScorer(0), round_id, who, nonce, random_nonce(), PRICE, 0, COMMIT_WINDOW + 1)
            .unwrap_err();
        assert_eq!(err, Error::DuplicateReveal(who.short()));
    }

    #[test]
    fn test_execute_requires_round_length() {
        let (mut positions, config, mut engine, position_id) = setup();
        let round_id = engine.start_round(&positions, position_id, 0).unwrap();

        let err = engine
            .execute(&mut positions, &config, round_id, ROUND_LENGTH - 1)
            .unwrap_err();
        assert!(matches!(err, Error::RoundIncomplete { .. }));
    }

    #[test]
    fn test_execute_no_valid_keepers_strands_round() {
        let (mut positions, config, mut engine, position_id) = setup();
        let round_id = engine.start_round(&positions, position_id, 0).unwrap();

        let err = engine
            .execute(&mut positions, &config, round_id, ROUND_LENGTH)
            .unwrap_err();
        assert_eq!(err, Error::NoValidKeepers(round_id));

        // The position survives for a fresh round
        assert!(positions.get_active(position_id).is_ok());
        assert!(engine.start_round(&positions, position_id, ROUND_LENGTH).is_ok());
    }

    #[test]
    fn test_execute_pays_equal_split() {
        let (mut positions, config, mut engine, position_id) = setup();
        let round_id = engine.start_round(&positions, position_id, 0).unwrap();
        let scorer = FixedScoreScorer(0);

        let keepers: Vec<AccountId> = vec![keeper(b"k1"), keeper(b"k2"), keeper(b"k3")];
        let mut nonces = Vec::new();
        for who in &keepers {
            nonces.push(commit_keeper(&mut engine, &config, round_id, position_id, *who));
        }
        for (who, nonce) in keepers.iter().zip(&nonces) {
            engine
                .reveal(&positions, &config, &scorer, round_id, *who, *nonce, random_nonce(), PRICE, 0, COMMIT_WINDOW)
                .unwrap();
        }

        let outcome = engine
            .execute(&mut positions, &config, round_id, ROUND_LENGTH)
            .unwrap();

        // 13% of 1 whole token
        assert_eq!(outcome.penalty, COLLATERAL_UNIT * 1300 / 10_000);
        // Equal non-zero payout per keeper, floor(P * 0.70 / 3)
        let expected_payout = outcome.penalty * 7000 / 10_000 / 3;
        assert_eq!(outcome.keeper_payout, expected_payout);
        assert!(outcome.keeper_payout > 0);
        // Treasury absorbs the 30% share plus the division dust
        assert_eq!(
            outcome.treasury_credit,
            outcome.penalty - outcome.keeper_payout * 3
        );

        // Position is now terminal, earnings are on the ledger
        assert!(!positions.get(position_id).unwrap().active);
        for who in &keepers {
            let record = engine.keepers().get(who).unwrap();
            assert_eq!(record.successes, 1);
            assert_eq!(record.earnings, expected_payout);
        }
    }

    #[test]
    fn test_execute_idempotent_failure() {
        let (mut positions, config, mut engine, position_id) = setup();
        let round_id = engine.start_round(&positions, position_id, 0).unwrap();
        let scorer = FixedScoreScorer(0);
        let who = keeper(b"k1");
        let nonce = commit_keeper(&mut engine, &config, round_id, position_id, who);
        engine
            .reveal(&positions, &config, &scorer, round_id, who, nonce, random_nonce(), PRICE, 0, COMMIT_WINDOW)
            .unwrap();

        engine
            .execute(&mut positions, &config, round_id, ROUND_LENGTH)
            .unwrap();
        let earnings_before = engine.keepers().total_earnings();

        let err = engine
            .execute(&mut positions, &config, round_id, ROUND_LENGTH + 1)
            .unwrap_err();
        assert_eq!(err, Error::AlreadyExecuted(round_id));
        assert_eq!(engine.keepers().total_earnings(), earnings_before);
    }

    #[test]
    fn test_racing_rounds_only_first_pays() {
        let (mut positions, config, mut engine, position_id) = setup();
        let scorer = FixedScoreScorer(0);

        let first = engine.start_round(&positions, position_id, 0).unwrap();
        let second = engine.start_round(&positions, position_id, 0).unwrap();

        for round_id in [first, second] {
            let who = keeper(format!("k{}", round_id).as_bytes());
            let nonce = commit_keeper(&mut engine, &config, round_id, position_id, who);
            engine
                .reveal(&positions, &config, &scorer, round_id, who, nonce, random_nonce(), PRICE, 0, COMMIT_WINDOW)
                .unwrap();
        }

        engine.execute(&mut positions, &config, first, ROUND_LENGTH).unwrap();

        // The losing round cannot pay out a second time
        let err = engine
            .execute(&mut positions, &config, second, ROUND_LENGTH)
            .unwrap_err();
        assert_eq!(err, Error::PositionInactive(position_id));
        assert_eq!(engine.total_executed(), 1);
    }
}
