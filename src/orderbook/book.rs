//! The limit order book: two price-ordered sides, an ID index, the
//! object pool, and the matching loop.
//!
//! ## Structure
//!
//! - **Pool**: bounded storage for every resting order; stable keys.
//! - **BTreeMap sides**: bids keyed by `Reverse(price)` so the highest
//!   price iterates first, asks keyed by price so the lowest does.
//! - **HashMap index**: order id to pool key, for O(1) cancel.
//!
//! ## Matching
//!
//! Matching runs inside `add`, immediately after the incoming order is
//! installed at the tail of its level. The loop crosses the best bid
//! level against the best ask level head-to-head until the book is no
//! longer crossed, then sweeps a leftover fill-and-kill head per the
//! configured residual policy.
//!
//! ## Example
//!
//! ```
//! use tickbook::orderbook::OrderBook;
//! use tickbook::types::{OrderType, Side};
//!
//! let mut book = OrderBook::with_capacity(1_000);
//!
//! book.add(OrderType::GoodTillCancel, 1, Side::Buy, 100, 10);
//! let trades = book.add(OrderType::GoodTillCancel, 2, Side::Sell, 100, 7);
//!
//! assert_eq!(trades.len(), 1);
//! assert_eq!(trades[0].quantity(), 7);
//! assert_eq!(book.len(), 1); // order 1 rests with 3 remaining
//! ```

use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap};

use tracing::{debug, trace};

use crate::orderbook::{OrderPool, PriceLevel};
use crate::types::{Order, OrderId, OrderModify, OrderType, Price, Quantity, Side, Trade, TradeLeg, Trades};

/// Default pool capacity when none is configured.
pub const DEFAULT_CAPACITY: usize = 100_000;

// ============================================================================
// Configuration
// ============================================================================

/// What to do with a fill-and-kill order that still rests with a positive
/// remainder once matching has finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FakResidual {
    /// Inspect only the head of the best level on each side. This is the
    /// historical behavior this engine reproduces by default.
    #[default]
    BestHeadOnly,

    /// Also cancel the incoming fill-and-kill wherever it rests. The
    /// common exchange semantic; differs from `BestHeadOnly` only in
    /// book states the normal event protocol cannot reach.
    AlwaysCancel,
}

/// Book construction parameters.
#[derive(Debug, Clone, Copy)]
pub struct BookConfig {
    /// Pool capacity: the maximum number of simultaneously resting orders.
    pub capacity: usize,
    pub fak_residual: FakResidual,
}

impl Default for BookConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            fak_residual: FakResidual::default(),
        }
    }
}

// ============================================================================
// Snapshot types
// ============================================================================

/// One aggregated price level: `(price, sum of remaining quantities)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelInfo {
    pub price: Price,
    pub quantity: u64,
}

/// Level aggregation of both sides: bids descending, asks ascending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookSnapshot {
    pub bids: Vec<LevelInfo>,
    pub asks: Vec<LevelInfo>,
}

// ============================================================================
// OrderBook
// ============================================================================

/// A single-venue, single-threaded price-time-priority limit order book.
///
/// All operations are synchronous; ordering between events is defined
/// entirely by call order. Expected anomalies (duplicate id, unknown id,
/// fill-and-kill that cannot cross) are silent no-ops. Pool misuse is a
/// programming error and panics.
#[derive(Debug)]
pub struct OrderBook {
    pool: OrderPool,
    bids: BTreeMap<Reverse<Price>, PriceLevel>,
    asks: BTreeMap<Price, PriceLevel>,
    order_index: HashMap<OrderId, usize>,
    fak_residual: FakResidual,
}

impl Default for OrderBook {
    fn default() -> Self {
        Self::new()
    }
}

impl OrderBook {
    pub fn new() -> Self {
        Self::with_config(BookConfig::default())
    }

    /// Book with `capacity` pool slots and the default residual policy.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_config(BookConfig {
            capacity,
            ..BookConfig::default()
        })
    }

    pub fn with_config(config: BookConfig) -> Self {
        Self {
            pool: OrderPool::new(config.capacity),
            bids: BTreeMap::new(),
            asks: BTreeMap::new(),
            order_index: HashMap::with_capacity(config.capacity),
            fak_residual: config.fak_residual,
        }
    }

    // ========================================================================
    // Public operations
    // ========================================================================

    /// Submit a new order and return the trades it produces.
    ///
    /// A duplicate `id` is silently rejected. A fill-and-kill that cannot
    /// cross at `price` is dropped without touching the book. Otherwise
    /// the order joins the tail of its price level and the matching loop
    /// runs.
    ///
    /// # Panics
    ///
    /// Panics if the pool is exhausted (the book was sized too small for
    /// the workload; continuing would corrupt accounting).
    pub fn add(
        &mut self,
        order_type: OrderType,
        id: OrderId,
        side: Side,
        price: Price,
        quantity: Quantity,
    ) -> Trades {
        if self.order_index.contains_key(&id) {
            debug!(order_id = id, "duplicate order id rejected");
            return Trades::new();
        }

        if order_type == OrderType::FillAndKill && !self.can_match(side, price) {
            debug!(order_id = id, price, "fill-and-kill cannot cross, dropped");
            return Trades::new();
        }

        let order = Order::new(order_type, id, side, price, quantity);
        let key = self.pool.acquire(order).expect("order pool exhausted");

        match side {
            Side::Buy => {
                self.bids
                    .entry(Reverse(price))
                    .or_insert_with(|| PriceLevel::new(price))
                    .push_back(key, &mut self.pool);
            }
            Side::Sell => {
                self.asks
                    .entry(price)
                    .or_insert_with(|| PriceLevel::new(price))
                    .push_back(key, &mut self.pool);
            }
        }

        self.order_index.insert(id, key);
        debug!(order_id = id, side = ?side, price, quantity, "order accepted");

        self.match_orders(id)
    }

    /// Cancel a resting order. Unknown ids are a no-op.
    pub fn cancel(&mut self, id: OrderId) {
        let Some(&key) = self.order_index.get(&id) else {
            return;
        };
        self.order_index.remove(&id);

        let node = self.pool.get(key).expect("indexed order not live in pool");
        let side = node.order.side;
        let price = node.order.price;

        match side {
            Side::Buy => {
                let level = self
                    .bids
                    .get_mut(&Reverse(price))
                    .expect("indexed bid has no level");
                level.remove(key, &mut self.pool);
                if level.is_empty() {
                    self.bids.remove(&Reverse(price));
                }
            }
            Side::Sell => {
                let level = self.asks.get_mut(&price).expect("indexed ask has no level");
                level.remove(key, &mut self.pool);
                if level.is_empty() {
                    self.asks.remove(&price);
                }
            }
        }

        self.pool
            .release(key)
            .expect("cancelled order already released");
        debug!(order_id = id, "order cancelled");
    }

    /// Replace a resting order's side, price and quantity, preserving its
    /// type but not its time priority.
    ///
    /// Implemented as cancel-then-add: the re-submitted order joins the
    /// tail of its target level, and a fill-and-kill that no longer
    /// crosses is dropped. Unknown ids return an empty trade list.
    pub fn modify(&mut self, modify: OrderModify) -> Trades {
        let Some(&key) = self.order_index.get(&modify.id) else {
            return Trades::new();
        };
        let order_type = self
            .pool
            .get(key)
            .expect("indexed order not live in pool")
            .order
            .order_type;

        debug!(order_id = modify.id, "order modified");
        self.cancel(modify.id);
        self.add(
            order_type,
            modify.id,
            modify.side,
            modify.price,
            modify.quantity,
        )
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Number of resting orders.
    #[inline]
    pub fn len(&self) -> usize {
        self.order_index.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.order_index.is_empty()
    }

    #[inline]
    pub fn contains(&self, id: OrderId) -> bool {
        self.order_index.contains_key(&id)
    }

    /// The resting order behind `id`, if any.
    pub fn get(&self, id: OrderId) -> Option<&Order> {
        let &key = self.order_index.get(&id)?;
        self.pool.get(key).map(|node| &node.order)
    }

    /// Highest resting buy price.
    #[inline]
    pub fn best_bid(&self) -> Option<Price> {
        self.bids.keys().next().map(|r| r.0)
    }

    /// Lowest resting sell price.
    #[inline]
    pub fn best_ask(&self) -> Option<Price> {
        self.asks.keys().next().copied()
    }

    /// Best ask minus best bid; `None` unless both sides are populated.
    pub fn spread(&self) -> Option<Price> {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) if ask >= bid => Some(ask - bid),
            _ => None,
        }
    }

    /// Number of non-empty bid price levels.
    #[inline]
    pub fn bid_levels(&self) -> usize {
        self.bids.len()
    }

    /// Number of non-empty ask price levels.
    #[inline]
    pub fn ask_levels(&self) -> usize {
        self.asks.len()
    }

    /// Pool capacity fixed at construction.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.pool.capacity()
    }

    /// Free pool slots. Always `capacity() - len()`.
    #[inline]
    pub fn free_slots(&self) -> usize {
        self.pool.free_slots()
    }

    /// Aggregate each non-empty price into `(price, total remaining)`.
    /// Bids are returned descending by price, asks ascending.
    pub fn snapshot(&self) -> BookSnapshot {
        let pool = &self.pool;
        let aggregate = |level: &PriceLevel| LevelInfo {
            price: level.price,
            quantity: level
                .iter(pool)
                .map(|order| u64::from(order.remaining_quantity))
                .sum(),
        };

        BookSnapshot {
            bids: self.bids.values().map(aggregate).collect(),
            asks: self.asks.values().map(aggregate).collect(),
        }
    }

    // ========================================================================
    // Matching
    // ========================================================================

    /// Peek predicate: would an order on `side` at `price` execute
    /// immediately against the opposite best level?
    fn can_match(&self, side: Side, price: Price) -> bool {
        match side {
            Side::Buy => self.best_ask().is_some_and(|ask| price >= ask),
            Side::Sell => self.best_bid().is_some_and(|bid| price <= bid),
        }
    }

    /// Cross the best bid level against the best ask level until the book
    /// uncrosses, then sweep leftover fill-and-kill heads.
    ///
    /// Entering the loop the just-inserted order sits at the tail of its
    /// level; everything older keeps its arrival priority.
    fn match_orders(&mut self, taker_id: OrderId) -> Trades {
        let mut trades = Trades::new();

        loop {
            let (Some(bid_price), Some(ask_price)) = (self.best_bid(), self.best_ask()) else {
                break;
            };
            if bid_price < ask_price {
                break;
            }

            // Head-to-head within the two best levels.
            loop {
                let bid_key = match self.bids.get(&Reverse(bid_price)).and_then(|l| l.front()) {
                    Some(key) => key,
                    None => break,
                };
                let ask_key = match self.asks.get(&ask_price).and_then(|l| l.front()) {
                    Some(key) => key,
                    None => break,
                };

                let (bid_id, bid_leg_price, bid_remaining) = {
                    let order = &self.pool.get(bid_key).expect("bid head not live").order;
                    (order.id, order.price, order.remaining_quantity)
                };
                let (ask_id, ask_leg_price, ask_remaining) = {
                    let order = &self.pool.get(ask_key).expect("ask head not live").order;
                    (order.id, order.price, order.remaining_quantity)
                };

                let quantity = bid_remaining.min(ask_remaining);

                self.pool
                    .get_mut(bid_key)
                    .expect("bid head not live")
                    .order
                    .fill(quantity);
                self.pool
                    .get_mut(ask_key)
                    .expect("ask head not live")
                    .order
                    .fill(quantity);

                let bid_level = self
                    .bids
                    .get_mut(&Reverse(bid_price))
                    .expect("crossed bid level missing");
                bid_level.reduce_quantity(quantity);
                let bid_filled = quantity == bid_remaining;
                if bid_filled {
                    bid_level.pop_front(&mut self.pool);
                    self.order_index.remove(&bid_id);
                    self.pool
                        .release(bid_key)
                        .expect("filled bid already released");
                }

                let ask_level = self
                    .asks
                    .get_mut(&ask_price)
                    .expect("crossed ask level missing");
                ask_level.reduce_quantity(quantity);
                let ask_filled = quantity == ask_remaining;
                if ask_filled {
                    ask_level.pop_front(&mut self.pool);
                    self.order_index.remove(&ask_id);
                    self.pool
                        .release(ask_key)
                        .expect("filled ask already released");
                }

                trades.push(Trade::new(
                    TradeLeg::new(bid_id, bid_leg_price, quantity),
                    TradeLeg::new(ask_id, ask_leg_price, quantity),
                ));
                trace!(bid_id, ask_id, quantity, "trade");

                let bids_emptied = self
                    .bids
                    .get(&Reverse(bid_price))
                    .map_or(true, |l| l.is_empty());
                let asks_emptied = self.asks.get(&ask_price).map_or(true, |l| l.is_empty());

                if bids_emptied {
                    self.bids.remove(&Reverse(bid_price));
                }
                if asks_emptied {
                    self.asks.remove(&ask_price);
                }
                if bids_emptied || asks_emptied {
                    break;
                }
            }
        }

        self.sweep_fill_and_kill(taker_id);
        trades
    }

    /// Retire fill-and-kill remainders after matching.
    ///
    /// The head of the best level on each side is always inspected; under
    /// [`FakResidual::AlwaysCancel`] the incoming order is also retired
    /// wherever it rests.
    fn sweep_fill_and_kill(&mut self, taker_id: OrderId) {
        if let Some(id) = self.best_head_fill_and_kill(Side::Buy) {
            self.cancel(id);
        }
        if let Some(id) = self.best_head_fill_and_kill(Side::Sell) {
            self.cancel(id);
        }

        if self.fak_residual == FakResidual::AlwaysCancel {
            if let Some(order) = self.get(taker_id) {
                if order.order_type == OrderType::FillAndKill {
                    self.cancel(taker_id);
                }
            }
        }
    }

    /// Id of the best level's head on `side` if it is a fill-and-kill.
    fn best_head_fill_and_kill(&self, side: Side) -> Option<OrderId> {
        let key = match side {
            Side::Buy => self.bids.values().next()?.front()?,
            Side::Sell => self.asks.values().next()?.front()?,
        };
        let order = &self.pool.get(key)?.order;
        (order.order_type == OrderType::FillAndKill).then_some(order.id)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
