//! Liquidation scoring: feature extraction and the hidden-scoring gateway.
//!
//! The engine never sees individual scoring weights. It extracts a public
//! feature vector from position state, hands it to the injected
//! [`gateway::HiddenScorer`] capability, and receives only the aggregate
//! weighted sum back.

pub mod features;
pub mod gateway;

pub use features::*;
pub use gateway::*;
