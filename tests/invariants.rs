//! Property tests: random event traces against a shadow model.
//!
//! The shadow is a flat map of the orders that should be resting. It is
//! updated from the trades the book reports, never from re-implemented
//! matching, so the checks catch disagreement between the book's
//! bookkeeping (index, levels, pool) and its own trade output.

use std::collections::{BTreeMap, HashMap};

use proptest::prelude::*;

use tickbook::{OrderBook, OrderId, OrderModify, OrderType, Price, Quantity, Side, Trades};

#[derive(Debug, Clone)]
enum Event {
    Add {
        order_type: OrderType,
        id: OrderId,
        side: Side,
        price: Price,
        quantity: Quantity,
    },
    Cancel {
        id: OrderId,
    },
    Modify {
        id: OrderId,
        side: Side,
        price: Price,
        quantity: Quantity,
    },
}

/// Expected resting state: id -> (side, price, remaining).
type Shadow = HashMap<OrderId, (Side, Price, Quantity)>;

fn shadow_best(shadow: &Shadow, side: Side) -> Option<Price> {
    let prices = shadow
        .values()
        .filter(|(s, _, _)| *s == side)
        .map(|(_, p, _)| *p);
    match side {
        Side::Buy => prices.max(),
        Side::Sell => prices.min(),
    }
}

fn shadow_crosses(shadow: &Shadow, side: Side, price: Price) -> bool {
    match side {
        Side::Buy => shadow_best(shadow, Side::Sell).is_some_and(|ask| price >= ask),
        Side::Sell => shadow_best(shadow, Side::Buy).is_some_and(|bid| price <= bid),
    }
}

/// Apply the book's reported trades to the shadow, checking each leg.
fn settle_trades(shadow: &mut Shadow, trades: &Trades) {
    for trade in trades {
        assert_eq!(trade.bid.quantity, trade.ask.quantity);
        // The bid leg never pays less than the ask leg asks.
        assert!(trade.bid.price >= trade.ask.price);

        for leg in [trade.bid, trade.ask] {
            let entry = shadow
                .get_mut(&leg.order_id)
                .expect("trade names an order that should not be resting");
            assert_eq!(entry.1, leg.price, "leg price is the order's own limit");
            assert!(leg.quantity <= entry.2, "leg exceeds remaining quantity");
            entry.2 -= leg.quantity;
        }
    }
    shadow.retain(|_, (_, _, remaining)| *remaining > 0);
}

fn apply_add(
    book: &mut OrderBook,
    shadow: &mut Shadow,
    order_type: OrderType,
    id: OrderId,
    side: Side,
    price: Price,
    quantity: Quantity,
) {
    let duplicate = shadow.contains_key(&id);
    let crosses = shadow_crosses(shadow, side, price);

    let trades = book.add(order_type, id, side, price, quantity);

    if duplicate {
        assert!(trades.is_empty(), "duplicate id must be a silent no-op");
        return;
    }
    if order_type == OrderType::FillAndKill && !crosses {
        assert!(trades.is_empty(), "uncrossable FAK must produce no trades");
        assert!(!book.contains(id), "uncrossable FAK must not be inserted");
        return;
    }

    shadow.insert(id, (side, price, quantity));
    settle_trades(shadow, &trades);

    // Conservation for the incoming order: filled + resting == submitted.
    let filled: u64 = trades
        .iter()
        .flat_map(|t| [t.bid, t.ask])
        .filter(|leg| leg.order_id == id)
        .map(|leg| u64::from(leg.quantity))
        .sum();
    let resting = book.get(id).map_or(0, |o| u64::from(o.remaining_quantity));
    if order_type == OrderType::GoodTillCancel {
        assert_eq!(filled + resting, u64::from(quantity));
    } else {
        // FAK never rests, whatever was left after matching.
        assert!(!book.contains(id));
        shadow.remove(&id);
    }
}

fn apply_event(book: &mut OrderBook, shadow: &mut Shadow, event: &Event) {
    match *event {
        Event::Add {
            order_type,
            id,
            side,
            price,
            quantity,
        } => apply_add(book, shadow, order_type, id, side, price, quantity),
        Event::Cancel { id } => {
            book.cancel(id);
            shadow.remove(&id);
        }
        Event::Modify {
            id,
            side,
            price,
            quantity,
        } => {
            if !shadow.contains_key(&id) {
                assert!(book.modify(OrderModify::new(id, side, price, quantity)).is_empty());
                return;
            }
            // Only GTC orders ever rest, so the preserved type is GTC.
            shadow.remove(&id);
            let trades = book.modify(OrderModify::new(id, side, price, quantity));
            shadow.insert(id, (side, price, quantity));
            settle_trades(shadow, &trades);
            if !book.contains(id) {
                // Fully filled on re-entry.
                assert!(!shadow.contains_key(&id));
            }
        }
    }
}

/// Check every universal invariant the public surface can observe.
fn check_invariants(book: &OrderBook, shadow: &Shadow) {
    // Index cardinality and pool accounting.
    assert_eq!(book.len(), shadow.len());
    assert_eq!(book.free_slots() + book.len(), book.capacity());

    // Every expected order rests with the expected fields.
    for (&id, &(side, price, remaining)) in shadow {
        let order = book.get(id).expect("shadow order missing from book");
        assert_eq!(order.id, id);
        assert_eq!(order.side, side);
        assert_eq!(order.price, price);
        assert_eq!(order.remaining_quantity, remaining);
        assert!(order.remaining_quantity <= order.initial_quantity);
    }

    // No crossed book at rest.
    if let (Some(bid), Some(ask)) = (book.best_bid(), book.best_ask()) {
        assert!(bid < ask, "book rests crossed: bid {bid} >= ask {ask}");
    }
    assert_eq!(book.best_bid(), shadow_best(shadow, Side::Buy));
    assert_eq!(book.best_ask(), shadow_best(shadow, Side::Sell));

    // Snapshot: strict ordering, no empty levels, totals agree.
    let snapshot = book.snapshot();
    for pair in snapshot.bids.windows(2) {
        assert!(pair[0].price > pair[1].price);
    }
    for pair in snapshot.asks.windows(2) {
        assert!(pair[0].price < pair[1].price);
    }

    let mut bid_totals: BTreeMap<Price, u64> = BTreeMap::new();
    let mut ask_totals: BTreeMap<Price, u64> = BTreeMap::new();
    for &(side, price, remaining) in shadow.values() {
        let totals = match side {
            Side::Buy => &mut bid_totals,
            Side::Sell => &mut ask_totals,
        };
        *totals.entry(price).or_default() += u64::from(remaining);
    }
    assert_eq!(snapshot.bids.len(), bid_totals.len());
    assert_eq!(snapshot.asks.len(), ask_totals.len());
    for level in snapshot.bids.iter().chain(&snapshot.asks) {
        assert!(level.quantity > 0, "empty level stored at {}", level.price);
    }
    for level in &snapshot.bids {
        assert_eq!(Some(&level.quantity), bid_totals.get(&level.price));
    }
    for level in &snapshot.asks {
        assert_eq!(Some(&level.quantity), ask_totals.get(&level.price));
    }
}

// Narrow price and id bands so traces cross, revisit levels, and hit
// duplicate ids and cancels of live orders often.
fn event_strategy() -> impl Strategy<Value = Event> {
    let side = any::<bool>().prop_map(|buy| if buy { Side::Buy } else { Side::Sell });
    let add = (0u8..5, 1u64..=60, side.clone(), 95i32..=105, 1u32..=20).prop_map(
        |(fak, id, side, price, quantity)| Event::Add {
            order_type: if fak == 0 {
                OrderType::FillAndKill
            } else {
                OrderType::GoodTillCancel
            },
            id,
            side,
            price,
            quantity,
        },
    );
    let cancel = (1u64..=60).prop_map(|id| Event::Cancel { id });
    let modify = (1u64..=60, side, 95i32..=105, 1u32..=20).prop_map(
        |(id, side, price, quantity)| Event::Modify {
            id,
            side,
            price,
            quantity,
        },
    );

    prop_oneof![4 => add, 1 => cancel, 1 => modify]
}

proptest! {
    #[test]
    fn random_traces_preserve_invariants(
        events in proptest::collection::vec(event_strategy(), 1..250)
    ) {
        let mut book = OrderBook::with_capacity(1_024);
        let mut shadow = Shadow::new();

        for event in &events {
            apply_event(&mut book, &mut shadow, event);
            check_invariants(&book, &shadow);
        }
    }

    #[test]
    fn add_then_cancel_is_identity(
        id in 1u64..=1_000,
        price in 95i32..=105,
        quantity in 1u32..=20,
    ) {
        let mut book = OrderBook::with_capacity(64);
        book.add(OrderType::GoodTillCancel, 5_000, Side::Buy, 90, 10);

        let len_before = book.len();
        let free_before = book.free_slots();

        book.add(OrderType::GoodTillCancel, id, Side::Sell, price, quantity);
        book.cancel(id);

        prop_assert_eq!(book.len(), len_before);
        prop_assert_eq!(book.free_slots(), free_before);
    }
}
