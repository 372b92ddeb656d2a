//! Protocol configuration and parameters.
//!
//! Parameters are divided into:
//! - Immutable: fixed at deployment (round windows, penalty split)
//! - Governable: adjustable by the protocol owner (score threshold,
//!   controller target price)

use serde::{Deserialize, Serialize};

use crate::utils::constants::*;
use crate::utils::crypto::AccountId;

// ═══════════════════════════════════════════════════════════════════════════════
// PROTOCOL PARAMETERS
// ═══════════════════════════════════════════════════════════════════════════════

/// Immutable protocol parameters (set at deployment)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProtocolParams {
    /// Protocol version
    pub version: String,

    /// Blocks after round start during which commitments are accepted
    pub commit_window: u64,

    /// Total round length in blocks; execution possible at or past this
    pub round_length: u64,

    /// Liquidation penalty in basis points of position collateral
    pub penalty_bps: u64,

    /// Keeper-pool share of the penalty in basis points
    pub keeper_share_bps: u64,

    /// Collateral value of a typical position, in stable units
    /// (normalizes the size feature)
    pub typical_position_value: u64,

    /// Position age at which the age feature saturates, seconds
    pub age_cap_secs: u64,

    /// Maximum events retained in the protocol event log
    pub max_event_log: usize,
}

impl Default for ProtocolParams {
    fn default() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            commit_window: COMMIT_WINDOW,
            round_length: ROUND_LENGTH,
            penalty_bps: LIQUIDATION_PENALTY_BPS,
            keeper_share_bps: KEEPER_POOL_SHARE_BPS,
            typical_position_value: TYPICAL_POSITION_VALUE,
            age_cap_secs: AGE_CAP_SECS,
            max_event_log: MAX_EVENT_LOG,
        }
    }
}

impl ProtocolParams {
    /// Create with custom round windows (for testing)
    pub fn with_windows(mut self, commit_window: u64, round_length: u64) -> Self {
        self.commit_window = commit_window;
        self.round_length = round_length;
        self
    }

    /// Create with a custom penalty split (for testing)
    pub fn with_split(mut self, penalty_bps: u64, keeper_share_bps: u64) -> Self {
        self.penalty_bps = penalty_bps;
        self.keeper_share_bps = keeper_share_bps;
        self
    }

    /// Validate parameters are consistent
    pub fn validate(&self) -> bool {
        self.commit_window > 0
            && self.commit_window < self.round_length
            && self.penalty_bps <= BPS_DIVISOR
            && self.keeper_share_bps <= BPS_DIVISOR
            && self.typical_position_value > 0
            && self.age_cap_secs > 0
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// CONTROLLER PARAMETERS
// ═══════════════════════════════════════════════════════════════════════════════

/// Tuning parameters for the redemption controller.
/// The divisors are tuning constants, deliberately configuration rather
/// than hardcoded values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControllerParams {
    /// Minimum seconds between updates
    pub min_update_interval: u64,

    /// Divisor for the proportional term
    pub proportional_divisor: i64,

    /// Divisor for the integral term
    pub integral_divisor: i64,

    /// Divisor for the derivative term
    pub derivative_divisor: i64,
}

impl Default for ControllerParams {
    fn default() -> Self {
        Self {
            min_update_interval: MIN_UPDATE_INTERVAL_SECS,
            proportional_divisor: DEFAULT_PROPORTIONAL_DIVISOR,
            integral_divisor: DEFAULT_INTEGRAL_DIVISOR,
            derivative_divisor: DEFAULT_DERIVATIVE_DIVISOR,
        }
    }
}

impl ControllerParams {
    /// Create with a custom update interval (for testing)
    pub fn with_interval(mut self, secs: u64) -> Self {
        self.min_update_interval = secs;
        self
    }

    /// Validate parameters are consistent
    pub fn validate(&self) -> bool {
        self.min_update_interval > 0
            && self.proportional_divisor > 0
            && self.integral_divisor > 0
            && self.derivative_divisor > 0
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// PROTOCOL CONFIGURATION
// ═══════════════════════════════════════════════════════════════════════════════

/// Protocol configuration: immutable params plus owner-governable settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProtocolConfig {
    /// Immutable parameters
    pub params: ProtocolParams,

    /// Protocol owner, sole caller of the administrative surface
    pub owner: AccountId,

    /// Per-feature score threshold; a position is liquidation-eligible when
    /// its aggregate hidden score is below `threshold * FEATURE_DIM`
    pub score_threshold: i64,
}

impl ProtocolConfig {
    /// Create a configuration with default parameters
    pub fn new(owner: AccountId) -> Self {
        Self {
            params: ProtocolParams::default(),
            owner,
            score_threshold: DEFAULT_SCORE_THRESHOLD,
        }
    }

    /// Create with explicit parameters
    pub fn with_params(owner: AccountId, params: ProtocolParams) -> Self {
        Self {
            params,
            owner,
            score_threshold: DEFAULT_SCORE_THRESHOLD,
        }
    }

    /// Aggregate eligibility bound: `threshold * FEATURE_DIM`
    pub fn eligibility_bound(&self) -> i64 {
        self.score_threshold * FEATURE_DIM as i64
    }
}
