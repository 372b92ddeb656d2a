//! Protocol constants and magic numbers.
//!
//! All protocol-wide constants are defined here for easy auditing and
//! modification. The controller divisors and the score threshold are
//! tuning defaults; both are exposed as configuration rather than baked in.

// ═══════════════════════════════════════════════════════════════════════════════
// UNIT CONSTANTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Base units per whole collateral token
pub const COLLATERAL_UNIT: u64 = 100_000_000;

/// Stable units per whole stable token (stored as cents)
pub const STABLE_UNIT: u64 = 100;

/// Fixed-point scale for the redemption price (1.0 = PRICE_UNIT)
pub const PRICE_UNIT: u64 = 1_000_000_000;

/// Basis points divisor (10000 = 100%)
pub const BPS_DIVISOR: u64 = 10_000;

// ═══════════════════════════════════════════════════════════════════════════════
// ROUND CONSTANTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Blocks after round start during which commitments are accepted
pub const COMMIT_WINDOW: u64 = 10;

/// Total round length in blocks; reveals are accepted in
/// `[COMMIT_WINDOW, ROUND_LENGTH)` and execution at or after `ROUND_LENGTH`
pub const ROUND_LENGTH: u64 = 20;

/// Liquidation penalty - 13% of position collateral (1300 basis points)
pub const LIQUIDATION_PENALTY_BPS: u64 = 1300;

/// Share of the penalty paid into the keeper pool - 70%
/// The remainder, plus any integer-division dust, goes to the treasury
pub const KEEPER_POOL_SHARE_BPS: u64 = 7000;

// ═══════════════════════════════════════════════════════════════════════════════
// SCORING CONSTANTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Dimension of the liquidation feature vector
pub const FEATURE_DIM: usize = 5;

/// Fixed-point scale for feature values (1.0 = FEATURE_SCALE)
pub const FEATURE_SCALE: u64 = 1000;

/// Collateral-ratio feature cap (3x scale)
pub const MAX_RATIO_FEATURE: u64 = 3 * FEATURE_SCALE;

/// Utilization feature cap (1x scale)
pub const MAX_UTILIZATION_FEATURE: u64 = FEATURE_SCALE;

/// Size feature cap (2x scale)
pub const MAX_SIZE_FEATURE: u64 = 2 * FEATURE_SCALE;

/// Constant midpoint emitted for the volatility feature.
/// Placeholder: not derived from any market signal yet.
pub const VOLATILITY_MIDPOINT: u64 = FEATURE_SCALE / 2;

/// Position age at which the age feature saturates - 30 days
pub const AGE_CAP_SECS: u64 = 30 * 86_400;

/// Collateral value of a "typical" position, in stable units ($10,000)
pub const TYPICAL_POSITION_VALUE: u64 = 10_000 * STABLE_UNIT;

/// Default per-feature score threshold; eligibility compares the aggregate
/// score against `threshold * FEATURE_DIM`
pub const DEFAULT_SCORE_THRESHOLD: i64 = 400;

/// Default sealed scoring weights, FEATURE_SCALE-scaled
pub const DEFAULT_HIDDEN_WEIGHTS: [i64; FEATURE_DIM] = [2000, -1000, -1500, 300, -300];

// ═══════════════════════════════════════════════════════════════════════════════
// REDEMPTION CONTROLLER CONSTANTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Minimum seconds between controller updates - 1 hour
pub const MIN_UPDATE_INTERVAL_SECS: u64 = 3600;

/// Default divisor for the proportional term
pub const DEFAULT_PROPORTIONAL_DIVISOR: i64 = 100;

/// Default divisor for the integral term
pub const DEFAULT_INTEGRAL_DIVISOR: i64 = 1000;

/// Default divisor for the derivative term
pub const DEFAULT_DERIVATIVE_DIVISOR: i64 = 500;

// ═══════════════════════════════════════════════════════════════════════════════
// CRYPTOGRAPHIC CONSTANTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Length of a hash in bytes (SHA256)
pub const HASH_LENGTH: usize = 32;

/// Length of an account identity in bytes
pub const ACCOUNT_ID_LENGTH: usize = 32;

/// Length of a commitment nonce in bytes
pub const NONCE_LENGTH: usize = 32;

// ═══════════════════════════════════════════════════════════════════════════════
// MISC
// ═══════════════════════════════════════════════════════════════════════════════

/// Maximum protocol events retained in the in-memory log
pub const MAX_EVENT_LOG: usize = 1000;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_windows() {
        assert!(COMMIT_WINDOW > 0);
        assert!(COMMIT_WINDOW < ROUND_LENGTH);
    }

    #[test]
    fn test_split_constants() {
        assert!(LIQUIDATION_PENALTY_BPS < BPS_DIVISOR);
        assert!(KEEPER_POOL_SHARE_BPS < BPS_DIVISOR);
    }

    #[test]
    fn test_feature_constants() {
        assert_eq!(DEFAULT_HIDDEN_WEIGHTS.len(), FEATURE_DIM);
        assert!(VOLATILITY_MIDPOINT < FEATURE_SCALE);
        assert!(MAX_UTILIZATION_FEATURE <= MAX_SIZE_FEATURE);
        assert!(MAX_SIZE_FEATURE <= MAX_RATIO_FEATURE);
    }

    #[test]
    fn test_controller_divisors_nonzero() {
        assert!(DEFAULT_PROPORTIONAL_DIVISOR > 0);
        assert!(DEFAULT_INTEGRAL_DIVISOR > 0);
        assert!(DEFAULT_DERIVATIVE_DIVISOR > 0);
    }
}
