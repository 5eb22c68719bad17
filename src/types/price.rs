//! Scalar aliases and tick conversion utilities.
//!
//! ## Overview
//!
//! The engine works exclusively in integer ticks: prices are signed 32-bit
//! tick counts, quantities unsigned 32-bit lots. Integer arithmetic keeps
//! matching deterministic across hardware and avoids floating-point error
//! in the hot path.
//!
//! ## Tick Conversions
//!
//! The venue defines the tick size (e.g. 0.25). Conversion between venue
//! decimal prices and internal ticks happens at the boundary, using
//! `rust_decimal` for exact decimal arithmetic. Prices that do not land on
//! a tick boundary are rejected.
//!
//! ## Examples
//!
//! ```
//! use tickbook::types::price::{to_ticks, from_ticks};
//! use rust_decimal::Decimal;
//!
//! let tick = Decimal::new(25, 2); // 0.25
//! assert_eq!(to_ticks("100.25", tick), Some(401));
//! assert_eq!(from_ticks(401, tick).to_string(), "100.25");
//! ```

use rust_decimal::prelude::*;
use rust_decimal::Decimal;

/// Price in venue-defined ticks. Signed; the book imposes no sign check.
pub type Price = i32;

/// Order quantity in lots.
pub type Quantity = u32;

/// Externally supplied order identifier, unique over the book's lifetime.
pub type OrderId = u64;

/// Convert a decimal price string to ticks.
///
/// Returns `None` if the string does not parse, the tick size is not
/// positive, the price is not a whole multiple of the tick, or the tick
/// count does not fit in [`Price`].
///
/// # Example
///
/// ```
/// use tickbook::types::price::to_ticks;
/// use rust_decimal::Decimal;
///
/// let tick = Decimal::new(25, 2); // 0.25
/// assert_eq!(to_ticks("-1.50", tick), Some(-6));
/// assert_eq!(to_ticks("100.30", tick), None); // off-tick
/// ```
pub fn to_ticks(s: &str, tick: Decimal) -> Option<Price> {
    if tick <= Decimal::ZERO {
        return None;
    }
    let value = Decimal::from_str(s).ok()?;
    let ratio = value.checked_div(tick)?;
    if ratio != ratio.trunc() {
        return None;
    }
    ratio.to_i32()
}

/// Convert a tick count back to a venue decimal price.
pub fn from_ticks(ticks: Price, tick: Decimal) -> Decimal {
    (Decimal::from(ticks) * tick).normalize()
}

/// Render a tick count as a venue price string.
///
/// # Example
///
/// ```
/// use tickbook::types::price::format_ticks;
/// use rust_decimal::Decimal;
///
/// assert_eq!(format_ticks(401, Decimal::new(25, 2)), "100.25");
/// ```
pub fn format_ticks(ticks: Price, tick: Decimal) -> String {
    from_ticks(ticks, tick).to_string()
}

// ============================================================================
// Unit Tests
// ============================================================================
