//! # fairliq
//!
//! A fair-liquidation engine for over-collateralized debt positions (CDPs).
//!
//! Instead of rewarding whichever liquidator lands first, liquidation runs as
//! a commit-reveal round: keepers submit binding commitments, later reveal
//! them together with the randomness for a hidden-threshold eligibility
//! check, and the liquidation penalty is split evenly across every keeper
//! who proved eligibility. Equal division removes the incentive to race,
//! which is the fairness property the whole mechanism exists for.
//!
//! ## Architecture
//!
//! - **Core**: position ledger, protocol configuration, treasury
//! - **Scoring**: feature extraction and the hidden-scoring capability
//! - **Rounds**: the commit/reveal/execute state machine and keeper ledger
//! - **Redemption**: discrete feedback controller for the floating
//!   redemption price and rate
//! - **Protocol**: caller-facing and owner-gated operations, typed events
//!
//! ## Example
//!
//! ```rust,ignore
//! use fairliq::prelude::*;
//!
//! let mut protocol = Protocol::new(owner, scorer);
//! let position = protocol.open_position(alice, collateral, debt, now)?;
//! let round = protocol.start_round(position, height)?;
//! ```

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    trivial_casts,
    unused_lifetimes,
    unused_qualifications
)]

pub mod core;
pub mod error;
pub mod protocol;
pub mod redemption;
pub mod rounds;
pub mod scoring;
pub mod utils;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::core::{
        config::{ControllerParams, ProtocolConfig, ProtocolParams},
        position::{Position, PositionId, PositionLedger},
        treasury::Treasury,
    };
    pub use crate::error::{Error, Result};
    pub use crate::protocol::{
        events::ProtocolEvent,
        operations::Protocol,
    };
    pub use crate::redemption::controller::{RedemptionController, RedemptionState};
    pub use crate::rounds::{
        engine::{LiquidationOutcome, LiquidationRoundEngine, RevealOutcome},
        keeper::{KeeperLedger, KeeperRecord},
        round::{LiquidationRound, RoundId, RoundPhase},
    };
    pub use crate::scoring::{
        features::{FeatureExtractor, FeatureVector},
        gateway::{HiddenScorer, SealedWeightScorer},
    };
    pub use crate::utils::crypto::{AccountId, Hash};
}

/// Protocol version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Protocol name
pub const PROTOCOL_NAME: &str = "fairliq";
