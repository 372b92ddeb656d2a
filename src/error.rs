//! Error types for the fairliq protocol.
//!
//! Every failure is a local, synchronous rejection of a single call: no
//! operation leaves partial state behind, and nothing is retried by the
//! engine itself.

use thiserror::Error;

/// Result type alias for fairliq operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the fairliq protocol
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    // ═══════════════════════════════════════════════════════════════════
    // Position Errors
    // ═══════════════════════════════════════════════════════════════════

    /// Collateral or debt amount failed validation
    #[error("Invalid {name} amount: {amount}")]
    InvalidAmount {
        /// Which amount was rejected
        name: &'static str,
        /// The rejected value
        amount: u64,
    },

    /// Position id is unknown
    #[error("Position not found: {0}")]
    PositionNotFound(u64),

    /// Position has already been liquidated
    #[error("Position {0} is inactive")]
    PositionInactive(u64),

    /// Deactivation was attempted twice
    #[error("Position {0} is already inactive")]
    AlreadyInactive(u64),

    // ═══════════════════════════════════════════════════════════════════
    // Round Errors
    // ═══════════════════════════════════════════════════════════════════

    /// Round id is unknown
    #[error("Round not found: {0}")]
    RoundNotFound(u64),

    /// Operation attempted before its window opens
    #[error("Window not open yet: opens at height {opens_at}, current {height}")]
    WindowNotOpenYet {
        /// Height at which the window opens
        opens_at: u64,
        /// Current block height
        height: u64,
    },

    /// Operation attempted after its window closed
    #[error("Window closed at height {closed_at}, current {height}")]
    WindowClosed {
        /// Height at which the window closed
        closed_at: u64,
        /// Current block height
        height: u64,
    },

    /// Keeper already committed in this round
    #[error("Duplicate commitment from keeper {0}")]
    DuplicateCommit(String),

    /// Keeper already revealed in this round
    #[error("Duplicate reveal from keeper {0}")]
    DuplicateReveal(String),

    /// Reveal does not match the stored commitment
    #[error("Reveal does not match stored commitment")]
    InvalidReveal,

    /// Round length has not elapsed yet
    #[error("Round incomplete: executable at height {executable_at}, current {height}")]
    RoundIncomplete {
        /// Height at which execution becomes possible
        executable_at: u64,
        /// Current block height
        height: u64,
    },

    /// Round was already finalized
    #[error("Round {0} already executed")]
    AlreadyExecuted(u64),

    /// No keeper revealed a valid eligibility proof; the round is stranded
    #[error("Round {0} has no valid keepers")]
    NoValidKeepers(u64),

    // ═══════════════════════════════════════════════════════════════════
    // Controller Errors
    // ═══════════════════════════════════════════════════════════════════

    /// Controller update attempted before the minimum interval elapsed
    #[error("Too soon: next update allowed at {next_allowed}, current time {now}")]
    TooSoon {
        /// Earliest permitted update time
        next_allowed: u64,
        /// Current time
        now: u64,
    },

    // ═══════════════════════════════════════════════════════════════════
    // Authorization Errors
    // ═══════════════════════════════════════════════════════════════════

    /// Caller is not allowed to perform this action
    #[error("Not authorized: {0}")]
    Unauthorized(String),

    // ═══════════════════════════════════════════════════════════════════
    // Treasury Errors
    // ═══════════════════════════════════════════════════════════════════

    /// Withdrawal exceeds the treasury balance
    #[error("Insufficient treasury: requested {requested}, available {available}")]
    InsufficientTreasury {
        /// Requested amount
        requested: u64,
        /// Available balance
        available: u64,
    },

    // ═══════════════════════════════════════════════════════════════════
    // Arithmetic Errors
    // ═══════════════════════════════════════════════════════════════════

    /// Overflow in calculation
    #[error("Arithmetic overflow in {operation}")]
    Overflow {
        /// Operation that overflowed
        operation: String,
    },

    /// Underflow in calculation
    #[error("Arithmetic underflow in {operation}")]
    Underflow {
        /// Operation that underflowed
        operation: String,
    },

    // ═══════════════════════════════════════════════════════════════════
    // Serialization Errors
    // ═══════════════════════════════════════════════════════════════════

    /// Serialization failed
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Deserialization failed
    #[error("Deserialization error: {0}")]
    Deserialization(String),
}

impl Error {
    /// Returns true if the same call can succeed later without intervention
    /// (the blocking condition clears by height or time progression)
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::WindowNotOpenYet { .. }
                | Error::RoundIncomplete { .. }
                | Error::TooSoon { .. }
        )
    }

    /// Returns true if this is a critical error requiring immediate attention
    pub fn is_critical(&self) -> bool {
        matches!(self, Error::Overflow { .. } | Error::Underflow { .. })
    }

    /// Returns the error code for external systems
    pub fn code(&self) -> u32 {
        match self {
            // Position errors: 1xxx
            Error::InvalidAmount { .. } => 1001,
            Error::PositionNotFound(_) => 1002,
            Error::PositionInactive(_) => 1003,
            Error::AlreadyInactive(_) => 1004,

            // Round errors: 2xxx
            Error::RoundNotFound(_) => 2001,
            Error::WindowNotOpenYet { .. } => 2002,
            Error::WindowClosed { .. } => 2003,
            Error::DuplicateCommit(_) => 2004,
            Error::DuplicateReveal(_) => 2005,
            Error::InvalidReveal => 2006,
            Error::RoundIncomplete { .. } => 2007,
            Error::AlreadyExecuted(_) => 2008,
            Error::NoValidKeepers(_) => 2009,

            // Controller errors: 3xxx
            Error::TooSoon { .. } => 3001,

            // Authorization errors: 4xxx
            Error::Unauthorized(_) => 4001,

            // Treasury errors: 5xxx
            Error::InsufficientTreasury { .. } => 5001,

            // Arithmetic errors: 6xxx
            Error::Overflow { .. } => 6001,
            Error::Underflow { .. } => 6002,

            // Serialization errors: 7xxx
            Error::Serialization(_) => 7001,
            Error::Deserialization(_) => 7002,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_unique() {
        let codes = vec![
            Error::InvalidAmount { name: "collateral", amount: 0 }.code(),
            Error::PositionNotFound(0).code(),
            Error::PositionInactive(0).code(),
            Error::AlreadyInactive(0).code(),
            Error::RoundNotFound(0).code(),
            Error::WindowNotOpenYet { opens_at: 0, height: 0 }.code(),
            Error::WindowClosed { closed_at: 0, height: 0 }.code(),
            Error::DuplicateCommit("".into()).code(),
            Error::DuplicateReveal("".into()).code(),
            Error::InvalidReveal.code(),
            Error::RoundIncomplete { executable_at: 0, height: 0 }.code(),
            Error::AlreadyExecuted(0).code(),
            Error::NoValidKeepers(0).code(),
            Error::TooSoon { next_allowed: 0, now: 0 }.code(),
            Error::Unauthorized("".into()).code(),
            Error::InsufficientTreasury { requested: 0, available: 0 }.code(),
            Error::Overflow { operation: "".into() }.code(),
            Error::Underflow { operation: "".into() }.code(),
            Error::Serialization("".into()).code(),
            Error::Deserialization("".into()).code(),
        ];

        let mut unique_codes = codes.clone();
        unique_codes.sort();
        unique_codes.dedup();

        assert_eq!(codes.len(), unique_codes.len(), "Error codes must be unique");
    }

    #[test]
    fn test_error_display() {
        let err = Error::InsufficientTreasury {
            requested: 1000,
            available: 500,
        };
        assert!(err.to_string().contains("1000"));
        assert!(err.to_string().contains("500"));
    }

    #[test]
    fn test_is_recoverable() {
        assert!(Error::TooSoon { next_allowed: 10, now: 5 }.is_recoverable());
        assert!(Error::RoundIncomplete { executable_at: 20, height: 15 }.is_recoverable());
        // A stranded round never becomes executable again
        assert!(!Error::NoValidKeepers(0).is_recoverable());
        assert!(!Error::InvalidReveal.is_recoverable());
    }

    #[test]
    fn test_is_critical() {
        assert!(Error::Overflow { operation: "test".into() }.is_critical());
        assert!(!Error::PositionNotFound(1).is_critical());
    }
}
