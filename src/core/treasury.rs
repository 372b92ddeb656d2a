//! Protocol treasury.
//!
//! Receives the non-keeper share of every liquidation penalty, including
//! the dust from the integer keeper-pool division. Debited only through
//! the owner-gated withdrawal on the protocol surface.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::utils::math::safe_add;

/// Treasury balance in collateral base units
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Treasury {
    balance: u64,
    total_credited: u64,
    total_withdrawn: u64,
}

impl Treasury {
    /// Create an empty treasury
    pub fn new() -> Self {
        Self::default()
    }

    /// Current balance
    pub fn balance(&self) -> u64 {
        self.balance
    }

    /// Lifetime credits
    pub fn total_credited(&self) -> u64 {
        self.total_credited
    }

    /// Lifetime withdrawals
    pub fn total_withdrawn(&self) -> u64 {
        self.total_withdrawn
    }

    /// Credit the treasury (round execution path)
    pub fn credit(&mut self, amount: u64) -> Result<()> {
        self.balance = safe_add(self.balance, amount)?;
        self.total_credited = self.total_credited.saturating_add(amount);
        Ok(())
    }

    /// Withdraw from the treasury. Authorization happens at the protocol
    /// surface; this only enforces the balance.
    pub fn withdraw(&mut self, amount: u64) -> Result<()> {
        if amount > self.balance {
            return Err(Error::InsufficientTreasury {
                requested: amount,
                available: self.balance,
            });
        }
        self.balance -= amount;
        self.total_withdrawn = self.total_withdrawn.saturating_add(amount);
        Ok(())
    }
}
