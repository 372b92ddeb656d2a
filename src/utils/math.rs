//! Checked arithmetic and protocol math.
//!
//! Safe integer operations with overflow protection, collateral valuation,
//! the penalty split, and the signed fixed-point rate application used by
//! the redemption controller.

use crate::error::{Error, Result};
use crate::utils::constants::{BPS_DIVISOR, COLLATERAL_UNIT, PRICE_UNIT};

// ═══════════════════════════════════════════════════════════════════════════════
// SAFE ARITHMETIC OPERATIONS
// ═══════════════════════════════════════════════════════════════════════════════

/// Safe addition with overflow check
pub fn safe_add(a: u64, b: u64) -> Result<u64> {
    a.checked_add(b).ok_or(Error::Overflow {
        operation: format!("{} + {}", a, b),
    })
}

/// Safe subtraction with underflow check
pub fn safe_sub(a: u64, b: u64) -> Result<u64> {
    a.checked_sub(b).ok_or(Error::Underflow {
        operation: format!("{} - {}", a, b),
    })
}

/// Safe multiplication then division with u128 intermediate
pub fn safe_mul_div(a: u64, b: u64, c: u64) -> Result<u64> {
    if c == 0 {
        return Err(Error::Overflow {
            operation: format!("({} * {}) / 0", a, b),
        });
    }
    let result = (a as u128) * (b as u128) / (c as u128);
    if result > u64::MAX as u128 {
        return Err(Error::Overflow {
            operation: format!("({} * {}) / {}", a, b, c),
        });
    }
    Ok(result as u64)
}

// ═══════════════════════════════════════════════════════════════════════════════
// COLLATERAL VALUATION
// ═══════════════════════════════════════════════════════════════════════════════

/// Value of `collateral` base units at `price` stable units per whole token
pub fn collateral_value(collateral: u64, price: u64) -> Result<u64> {
    safe_mul_div(collateral, price, COLLATERAL_UNIT)
}

/// Collateralization ratio in basis points (10000 = 100%).
/// Returns `u64::MAX` for debt-free positions.
pub fn collateral_ratio_bps(collateral: u64, price: u64, debt: u64) -> u64 {
    if debt == 0 {
        return u64::MAX;
    }

    let numerator = (collateral as u128) * (price as u128) * (BPS_DIVISOR as u128);
    let denominator = (COLLATERAL_UNIT as u128) * (debt as u128);

    let ratio = numerator / denominator;
    ratio.min(u64::MAX as u128) as u64
}

// ═══════════════════════════════════════════════════════════════════════════════
// PENALTY SPLIT
// ═══════════════════════════════════════════════════════════════════════════════

/// Liquidation penalty for a position's collateral, in collateral base units
pub fn penalty_amount(collateral: u64, penalty_bps: u64) -> Result<u64> {
    safe_mul_div(collateral, penalty_bps, BPS_DIVISOR)
}

/// Split a penalty between `keeper_count` valid keepers and the treasury.
///
/// The keeper pool is `keeper_share_bps` of the penalty, divided evenly by
/// integer division; the treasury receives everything else, including the
/// division remainder. Returns `(per_keeper, treasury_credit)`.
pub fn split_penalty(penalty: u64, keeper_share_bps: u64, keeper_count: u64) -> Result<(u64, u64)> {
    if keeper_count == 0 {
        return Err(Error::Overflow {
            operation: "split_penalty with zero keepers".into(),
        });
    }

    let pool = safe_mul_div(penalty, keeper_share_bps, BPS_DIVISOR)?;
    let per_keeper = pool / keeper_count;
    let treasury = safe_sub(penalty, per_keeper * keeper_count)?;

    Ok((per_keeper, treasury))
}

// ═══════════════════════════════════════════════════════════════════════════════
// FIXED-POINT RATE APPLICATION
// ═══════════════════════════════════════════════════════════════════════════════

/// Apply a signed PRICE_UNIT-scaled rate to a price multiplicatively.
///
/// `price * (PRICE_UNIT + rate) / PRICE_UNIT`, floored at 1 so the price
/// never reaches zero.
pub fn apply_rate(price: u64, rate: i64) -> u64 {
    let unit = PRICE_UNIT as i128;
    let factor = (unit + rate as i128).max(0);
    let scaled = (price as i128) * factor / unit;
    scaled.clamp(1, u64::MAX as i128) as u64
}

/// Clamp a value to `[0, cap]` after scaling `numerator / denominator * scale`
pub fn scaled_capped(numerator: u64, denominator: u64, scale: u64, cap: u64) -> u64 {
    if denominator == 0 {
        return cap;
    }
    let scaled = (numerator as u128) * (scale as u128) / (denominator as u128);
    scaled.min(cap as u128) as u64
}
