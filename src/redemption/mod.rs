//! Floating redemption price and its feedback controller.

pub mod controller;

pub use controller::*;
