//! Demo binary: drives a short event sequence through the book.

use tracing::Level;

use tickbook::{OrderBook, OrderModify, OrderType, Side};

fn main() {
    tracing_subscriber::fmt().with_max_level(Level::DEBUG).init();

    let mut book = OrderBook::with_capacity(100_000);

    book.add(OrderType::GoodTillCancel, 1, Side::Buy, 100, 10);
    book.add(OrderType::GoodTillCancel, 2, Side::Buy, 99, 20);
    book.add(OrderType::GoodTillCancel, 3, Side::Sell, 101, 15);
    println!("resting orders: {}", book.len());

    let trades = book.add(OrderType::GoodTillCancel, 4, Side::Sell, 100, 7);
    for trade in &trades {
        println!("{trade}");
    }

    book.modify(OrderModify::new(2, Side::Buy, 100, 20));
    book.cancel(1);
    println!("resting orders: {}", book.len());

    let snapshot = book.snapshot();
    for level in &snapshot.bids {
        println!("bid {} x {}", level.price, level.quantity);
    }
    for level in &snapshot.asks {
        println!("ask {} x {}", level.price, level.quantity);
    }
}
