//! Core data types for the matching engine.
//!
//! All prices are signed 32-bit tick counts, quantities unsigned 32-bit
//! lots, order ids unsigned 64-bit and caller-supplied.
//!
//! ## Types
//!
//! - [`Order`]: a limit order (identity + shrinking remaining quantity)
//! - [`Side`] / [`OrderType`]: Buy/Sell, GoodTillCancel/FillAndKill
//! - [`OrderModify`]: the modify-event carrier
//! - [`Trade`]: an executed match, recorded as a bid leg and an ask leg

mod order;
mod trade;
pub mod price;

pub use order::{Order, OrderModify, OrderType, Side};
pub use price::{OrderId, Price, Quantity};
pub use trade::{Trade, TradeLeg, Trades};
