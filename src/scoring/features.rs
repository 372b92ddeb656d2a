//! Feature extraction from public position state.
//!
//! A fixed five-dimensional vector, each component an integer scaled to
//! `FEATURE_SCALE` and clamped to its cap so unbounded position values
//! cannot distort the hidden score. Pure function of chain state: no
//! randomness, no memoization.

use serde::{Deserialize, Serialize};

use crate::core::position::Position;
use crate::utils::constants::{
    BPS_DIVISOR, FEATURE_DIM, FEATURE_SCALE, MAX_RATIO_FEATURE, MAX_SIZE_FEATURE,
    MAX_UTILIZATION_FEATURE, VOLATILITY_MIDPOINT,
};
use crate::utils::math::scaled_capped;

// ═══════════════════════════════════════════════════════════════════════════════
// FEATURE VECTOR
// ═══════════════════════════════════════════════════════════════════════════════

/// A fixed-dimension liquidation feature vector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureVector(
    /// Feature components, FEATURE_SCALE fixed point
    pub [u64; FEATURE_DIM],
);

impl FeatureVector {
    /// Feature components as a slice
    pub fn as_slice(&self) -> &[u64; FEATURE_DIM] {
        &self.0
    }

    /// Collateral-ratio feature
    pub fn ratio(&self) -> u64 {
        self.0[0]
    }

    /// Volatility feature (constant placeholder)
    pub fn volatility(&self) -> u64 {
        self.0[1]
    }

    /// Utilization feature
    pub fn utilization(&self) -> u64 {
        self.0[2]
    }

    /// Age feature
    pub fn age(&self) -> u64 {
        self.0[3]
    }

    /// Size feature
    pub fn size(&self) -> u64 {
        self.0[4]
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// FEATURE EXTRACTOR
// ═══════════════════════════════════════════════════════════════════════════════

/// Extractor parameters: what "typical" and "old" mean for normalization
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FeatureExtractor {
    /// Collateral value of a typical position, stable units
    pub typical_position_value: u64,
    /// Age at which the age feature saturates, seconds
    pub age_cap_secs: u64,
}

impl FeatureExtractor {
    /// Create an extractor with explicit normalization parameters
    pub fn new(typical_position_value: u64, age_cap_secs: u64) -> Self {
        Self {
            typical_position_value,
            age_cap_secs,
        }
    }

    /// Derive the feature vector for a position at the given oracle price
    /// and current time.
    ///
    /// Components, in order:
    /// 1. collateral ratio, capped at 3x scale
    /// 2. volatility: constant midpoint (placeholder, no real signal yet)
    /// 3. utilization (debt over collateral value), capped at 1x scale
    /// 4. age, linear up to the cap
    /// 5. size relative to a typical position, capped at 2x scale
    pub fn extract(&self, position: &Position, price: u64, now: u64) -> FeatureVector {
        let value = position
            .value(price)
            .unwrap_or(u64::MAX);

        let ratio = scaled_capped(
            position.ratio_bps(price),
            BPS_DIVISOR,
            FEATURE_SCALE,
            MAX_RATIO_FEATURE,
        );

        let utilization = scaled_capped(
            position.debt,
            value,
            FEATURE_SCALE,
            MAX_UTILIZATION_FEATURE,
        );

        let age = scaled_capped(
            position.age_secs(now),
            self.age_cap_secs,
            FEATURE_SCALE,
            FEATURE_SCALE,
        );

        let size = scaled_capped(
            value,
            self.typical_position_value,
            FEATURE_SCALE,
            MAX_SIZE_FEATURE,
        );

        FeatureVector([ratio, VOLATILITY_MIDPOINT, utilization, age, size])
    }
}
