//! Partner stock positions.
//!
//! A position tracks what a partner received (allocated), sold and got back
//! (returned) for one work. Available stock is derived, never stored.
//!
//! # Modules
//!
//! - `position` - Availability calculation and movement validation
//! - `error` - Stock-specific error types

pub mod error;
pub mod position;

#[cfg(test)]
mod position_props;

pub use error::StockError;
pub use position::{
    MovementKind, StockMovement, StockPosition, compute_available, has_sufficient_stock,
};
