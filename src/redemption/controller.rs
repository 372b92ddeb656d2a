//! Redemption price controller.
//!
//! A discrete-time PID controller tracking a target price for the stable
//! unit. Each update computes the error against the market price, folds it
//! into proportional, integral, and derivative terms, and applies the
//! resulting signed rate multiplicatively to the redemption price.
//!
//! State is an explicit owned struct threaded through `update`; the
//! controller holds no ambient globals and is independently testable.

use serde::{Deserialize, Serialize};

use crate::core::config::ControllerParams;
use crate::error::{Error, Result};
use crate::utils::constants::PRICE_UNIT;
use crate::utils::math::apply_rate;

// ═══════════════════════════════════════════════════════════════════════════════
// REDEMPTION STATE
// ═══════════════════════════════════════════════════════════════════════════════

/// Controller state: the floating price, current rate, and PID accumulators
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedemptionState {
    /// Redemption price, PRICE_UNIT fixed point (1.0 at genesis)
    pub price: u64,
    /// Current rate of change, signed, PRICE_UNIT scale
    pub rate: i64,
    /// Timestamp of the last accepted update
    pub last_update: u64,
    /// Proportional term from the last update
    pub proportional: i64,
    /// Accumulated integral term
    pub integral: i64,
    /// Error observed at the last update
    pub last_error: i64,
}

impl Default for RedemptionState {
    fn default() -> Self {
        Self {
            price: PRICE_UNIT,
            rate: 0,
            last_update: 0,
            proportional: 0,
            integral: 0,
            last_error: 0,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// REDEMPTION CONTROLLER
// ═══════════════════════════════════════════════════════════════════════════════

/// Discrete PID controller for the redemption price
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedemptionController {
    params: ControllerParams,
    /// Target price the controller steers toward, PRICE_UNIT scale
    target: u64,
    state: RedemptionState,
}

impl Default for RedemptionController {
    fn default() -> Self {
        Self::new(ControllerParams::default(), PRICE_UNIT)
    }
}

impl RedemptionController {
    /// Create a controller with the given tuning and target price
    pub fn new(params: ControllerParams, target: u64) -> Self {
        Self {
            params,
            target,
            state: RedemptionState::default(),
        }
    }

    /// Current controller state
    pub fn state(&self) -> &RedemptionState {
        &self.state
    }

    /// Current target price
    pub fn target(&self) -> u64 {
        self.target
    }

    /// Retarget the controller (owner-gated at the protocol surface)
    pub fn set_target(&mut self, target: u64) {
        self.target = target.max(1);
    }

    /// Fold a market observation into the controller.
    ///
    /// Rejects with `TooSoon` until the minimum interval has elapsed since
    /// the last accepted update; a rejected call changes nothing. Returns
    /// the new rate.
    pub fn update(&mut self, market_price: u64, now: u64) -> Result<i64> {
        let next_allowed = self.state.last_update + self.params.min_update_interval;
        if now < next_allowed {
            return Err(Error::TooSoon { next_allowed, now });
        }

        let error = (self.target as i128 - market_price as i128)
            .clamp(i64::MIN as i128, i64::MAX as i128) as i64;

        let proportional = error / self.params.proportional_divisor;
        let integral = self
            .state
            .integral
            .saturating_add(error / self.params.integral_divisor);
        let derivative = error.saturating_sub(self.state.last_error) / self.params.derivative_divisor;

        let rate = proportional
            .saturating_add(integral)
            .saturating_add(derivative);

        self.state.price = apply_rate(self.state.price, rate);
        self.state.rate = rate;
        self.state.proportional = proportional;
        self.state.integral = integral;
        self.state.last_error = error;
        self.state.last_update = now;

        tracing::debug!(
            market_price,
            error,
            rate,
            price = self.state.price,
            "redemption rate updated"
        );

        Ok(rate)
    }
}
