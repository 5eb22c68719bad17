//! # Tickbook
//!
//! Single-venue, single-threaded limit order book matching engine.
//!
//! ## Architecture
//!
//! - **Types**: order, trade and scalar types (integer ticks throughout)
//! - **OrderBook**: price-time-priority book over pooled storage, with
//!   the matching loop built in
//!
//! ## Design Principles
//!
//! 1. **Determinism**: event order fully determines trades; no clocks,
//!    no floating point in the matching path
//! 2. **Allocation-free events**: orders live in a fixed-capacity pool;
//!    steady-state add/cancel/match touch no allocator
//! 3. **O(1) cancel**: intrusive per-level FIFOs spliced by pool key
//! 4. **Synchronous**: no async, no internal threading; callers serialize
//!
//! ## Example
//!
//! ```
//! use tickbook::{OrderBook, OrderType, Side};
//!
//! let mut book = OrderBook::with_capacity(10_000);
//!
//! book.add(OrderType::GoodTillCancel, 1, Side::Buy, 100, 10);
//! let trades = book.add(OrderType::GoodTillCancel, 2, Side::Sell, 100, 7);
//!
//! assert_eq!(trades.len(), 1);
//! assert_eq!(book.len(), 1);
//! ```

pub mod orderbook;
pub mod types;

pub use orderbook::{BookConfig, BookSnapshot, FakResidual, LevelInfo, OrderBook};
pub use types::{Order, OrderId, OrderModify, OrderType, Price, Quantity, Side, Trade, TradeLeg, Trades};
