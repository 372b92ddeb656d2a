//! Position (CDP) records and the position ledger.
//!
//! The ledger exclusively owns every position: creation by owner deposit,
//! read access for the round engine, and a single terminal deactivation
//! when a liquidation round executes.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::utils::crypto::AccountId;
use crate::utils::math::{collateral_ratio_bps, collateral_value};

/// Unique identifier for a position, assigned monotonically from zero
pub type PositionId = u64;

// ═══════════════════════════════════════════════════════════════════════════════
// POSITION
// ═══════════════════════════════════════════════════════════════════════════════

/// An over-collateralized debt position
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    /// Unique identifier
    pub id: PositionId,
    /// Owner identity
    pub owner: AccountId,
    /// Collateral amount in native base units
    pub collateral: u64,
    /// Debt amount in stable units
    pub debt: u64,
    /// Creation timestamp in seconds
    pub opened_at: u64,
    /// False once liquidated; terminal and immutable from then on
    pub active: bool,
}

impl Position {
    /// Collateralization ratio in basis points at the given oracle price
    pub fn ratio_bps(&self, price: u64) -> u64 {
        collateral_ratio_bps(self.collateral, price, self.debt)
    }

    /// Collateral value in stable units at the given oracle price
    pub fn value(&self, price: u64) -> Result<u64> {
        collateral_value(self.collateral, price)
    }

    /// Age of the position in seconds at `now`
    pub fn age_secs(&self, now: u64) -> u64 {
        now.saturating_sub(self.opened_at)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// POSITION LEDGER
// ═══════════════════════════════════════════════════════════════════════════════

/// Ledger owning all positions in the system
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PositionLedger {
    /// All positions indexed by id
    positions: HashMap<PositionId, Position>,
    /// Positions indexed by owner
    owner_positions: HashMap<AccountId, Vec<PositionId>>,
    /// Next id to assign
    next_id: PositionId,
    /// Number of active positions
    active_count: u64,
}

impl PositionLedger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a new position. Both amounts must be strictly positive.
    pub fn open(
        &mut self,
        owner: AccountId,
        collateral: u64,
        debt: u64,
        now: u64,
    ) -> Result<PositionId> {
        if collateral == 0 {
            return Err(Error::InvalidAmount {
                name: "collateral",
                amount: collateral,
            });
        }
        if debt == 0 {
            return Err(Error::InvalidAmount {
                name: "debt",
                amount: debt,
            });
        }

        let id = self.next_id;
        self.next_id += 1;

        let position = Position {
            id,
            owner,
            collateral,
            debt,
            opened_at: now,
            active: true,
        };

        self.positions.insert(id, position);
        self.owner_positions.entry(owner).or_default().push(id);
        self.active_count += 1;

        tracing::debug!(position = id, collateral, debt, "position opened");

        Ok(id)
    }

    /// Get a position by id
    pub fn get(&self, id: PositionId) -> Result<&Position> {
        self.positions.get(&id).ok_or(Error::PositionNotFound(id))
    }

    /// Get a position, requiring it to still be active
    pub fn get_active(&self, id: PositionId) -> Result<&Position> {
        let position = self.get(id)?;
        if !position.active {
            return Err(Error::PositionInactive(id));
        }
        Ok(position)
    }

    /// Deactivate a position. Terminal: a second call fails and nothing
    /// else may mutate the record afterwards. Only the round engine path
    /// invokes this.
    pub(crate) fn deactivate(&mut self, id: PositionId) -> Result<()> {
        let position = self
            .positions
            .get_mut(&id)
            .ok_or(Error::PositionNotFound(id))?;

        if !position.active {
            return Err(Error::AlreadyInactive(id));
        }

        position.active = false;
        self.active_count -= 1;

        tracing::debug!(position = id, "position deactivated");

        Ok(())
    }

    /// All position ids belonging to an owner
    pub fn positions_for(&self, owner: &AccountId) -> Vec<PositionId> {
        self.owner_positions.get(owner).cloned().unwrap_or_default()
    }

    /// Total number of positions ever opened
    pub fn total_count(&self) -> usize {
        self.positions.len()
    }

    /// Number of positions still active
    pub fn active_count(&self) -> u64 {
        self.active_count
    }

    /// Aggregate statistics over active positions
    pub fn statistics(&self, price: u64) -> LedgerStatistics {
        let mut total_collateral = 0u64;
        let mut total_debt = 0u64;

        for position in self.positions.values().filter(|p| p.active) {
            total_collateral = total_collateral.saturating_add(position.collateral);
            total_debt = total_debt.saturating_add(position.debt);
        }

        LedgerStatistics {
            total_positions: self.positions.len() as u64,
            active_positions: self.active_count,
            total_collateral,
            total_debt,
            aggregate_ratio_bps: collateral_ratio_bps(total_collateral, price, total_debt),
        }
    }

    /// Serialize the ledger to bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        bincode::serialize(self).map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Deserialize a ledger from bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        bincode::deserialize(bytes).map_err(|e| Error::Deserialization(e.to_string()))
    }
}

/// Aggregate ledger statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerStatistics {
    /// Positions ever opened
    pub total_positions: u64,
    /// Positions still active
    pub active_positions: u64,
    /// Sum of active collateral, base units
    pub total_collateral: u64,
    /// Sum of active debt, stable units
    pub total_debt: u64,
    /// System-wide collateralization ratio in basis points
    pub aggregate_ratio_bps: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::constants::COLLATERAL_UNIT;

    fn owner() -> AccountId {
        AccountId::derive(b"owner")
    }

    #[test]
    fn test_open_position() {
        let mut ledger = PositionLedger::new();
        let id = ledger.open(owner(), COLLATERAL_UNIT, 100_000, 1000).unwrap();

        let position = ledger.get(id).unwrap();
        assert_eq!(position.collateral, COLLATERAL_UNIT);
        assert_eq!(position.debt, 100_000);
        assert!(position.active);
        assert_eq!(ledger.active_count(), 1);
    }

    #[test]
    fn test_open_rejects_zero_amounts() {
        let mut ledger = PositionLedger::new();

        let err = ledger.open(owner(), 0, 100_000, 1000).unwrap_err();
        assert!(matches!(err, Error::InvalidAmount { name: "collateral", .. }));

        let err = ledger.open(owner(), COLLATERAL_UNIT, 0, 1000).unwrap_err();
        assert!(matches!(err, Error::InvalidAmount { name: "debt", .. }));

        // Nothing was created by the rejected calls
        assert_eq!(ledger.total_count(), 0);
    }

    #[test]
    fn test_ids_monotonic() {
        let mut ledger = PositionLedger::new();
        let a = ledger.open(owner(), 1, 1, 0).unwrap();
        let b = ledger.open(owner(), 1, 1, 0).unwrap();
        let c = ledger.open(owner(), 1, 1, 0).unwrap();
        assert_eq!((a, b, c), (0, 1, 2));
    }

    #[test]
    fn test_get_unknown() {
        let ledger = PositionLedger::new();
        assert_eq!(ledger.get(42).unwrap_err(), Error::PositionNotFound(42));
    }

    #[test]
    fn test_deactivate_once() {
        let mut ledger = PositionLedger::new();
        let id = ledger.open(owner(), COLLATERAL_UNIT, 100_000, 1000).unwrap();

        ledger.deactivate(id).unwrap();
        assert!(!ledger.get(id).unwrap().active);
        assert_eq!(ledger.active_count(), 0);

        // Terminal: second deactivation is rejected
        assert_eq!(ledger.deactivate(id).unwrap_err(), Error::AlreadyInactive(id));

        // And the active getter refuses the record
        assert_eq!(ledger.get_active(id).unwrap_err(), Error::PositionInactive(id));
    }

    #[test]
    fn test_positions_for_owner() {
        let mut ledger = PositionLedger::new();
        let other = AccountId::derive(b"other");

        ledger.open(owner(), 1, 1, 0).unwrap();
        ledger.open(other, 1, 1, 0).unwrap();
        ledger.open(owner(), 1, 1, 0).unwrap();

        assert_eq!(ledger.positions_for(&owner()), vec![0, 2]);
        assert_eq!(ledger.positions_for(&other), vec![1]);
    }

    #[test]
    fn test_statistics() {
        let mut ledger = PositionLedger::new();
        ledger.open(owner(), COLLATERAL_UNIT, 100_000, 0).unwrap();
        let id = ledger.open(owner(), COLLATERAL_UNIT, 100_000, 0).unwrap();
        ledger.deactivate(id).unwrap();

        let stats = ledger.statistics(200_000);
        assert_eq!(stats.total_positions, 2);
        assert_eq!(stats.active_positions, 1);
        assert_eq!(stats.total_collateral, COLLATERAL_UNIT);
        assert_eq!(stats.aggregate_ratio_bps, 20_000);
    }

    #[test]
    fn test_snapshot_roundtrip() {
        let mut ledger = PositionLedger::new();
        ledger.open(owner(), COLLATERAL_UNIT, 100_000, 1000).unwrap();

        let bytes = ledger.to_bytes().unwrap();
        let recovered = PositionLedger::from_bytes(&bytes).unwrap();
        assert_eq!(recovered.total_count(), 1);
        assert_eq!(recovered.get(0).unwrap().debt, 100_000);
    }
}
