//! Liquidation rounds: the commit-reveal state machine and keeper ledger.
//!
//! A round moves through commit, reveal, and executable phases purely by
//! block-height progression. Keepers commit binding hashes, reveal nonces
//! plus scoring randomness, and the penalty of an executed round is split
//! evenly across every keeper whose reveal proved eligibility.

pub mod engine;
pub mod keeper;
pub mod round;

pub use engine::*;
pub use keeper::*;
pub use round::*;
