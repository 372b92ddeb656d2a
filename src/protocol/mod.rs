//! Protocol surface: caller-facing operations, the owner-gated
//! administrative surface, and typed events.

pub mod events;
pub mod operations;

pub use events::*;
pub use operations::*;
