//! Trade types: the record emitted when two orders match.

use std::fmt;

use crate::types::price::{OrderId, Price, Quantity};

/// One side of an executed match: which order traded, at its own limit
/// price, for how much.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TradeLeg {
    pub order_id: OrderId,
    pub price: Price,
    pub quantity: Quantity,
}

impl TradeLeg {
    pub fn new(order_id: OrderId, price: Price, quantity: Quantity) -> Self {
        Self {
            order_id,
            price,
            quantity,
        }
    }
}

/// A single match between a bid and an ask.
///
/// Both legs carry the same quantity but each records its own order's
/// limit price; the two differ whenever the incoming order crossed
/// through the book. Which leg's price is the "printed" price is venue
/// policy and left to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Trade {
    pub bid: TradeLeg,
    pub ask: TradeLeg,
}

impl Trade {
    pub fn new(bid: TradeLeg, ask: TradeLeg) -> Self {
        Self { bid, ask }
    }

    /// Quantity transferred (identical on both legs).
    #[inline]
    pub fn quantity(&self) -> Quantity {
        self.bid.quantity
    }
}

impl fmt::Display for Trade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TRADE bid #{} @ {} / ask #{} @ {} x {}",
            self.bid.order_id, self.bid.price, self.ask.order_id, self.ask.price, self.quantity()
        )
    }
}

/// The trades produced by one book operation, in execution order.
pub type Trades = Vec<Trade>;

// ============================================================================
// Unit Tests
// ============================================================================
