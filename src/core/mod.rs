//! Core state for the fairliq protocol.
//!
//! - Position ledger: CDP records and their lifecycle
//! - Configuration: immutable parameters and governable settings
//! - Treasury: protocol-side share of liquidation penalties

pub mod config;
pub mod position;
pub mod treasury;

pub use config::*;
pub use position::*;
pub use treasury::*;
