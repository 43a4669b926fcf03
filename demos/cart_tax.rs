//! # Example: cart_tax
//!
//! Two stores reacting to the same action, one of them waiting on the other.
//!
//! Demonstrates how to:
//! - Build table-routed stores with [`ActionStore`].
//! - Declare a wait from inside a handler with `cx.wait_for`.
//! - Watch the pass through the built-in [`LogWriter`] subscriber.
//!
//! ## Flow
//! ```text
//! dispatch(cart/add)
//!     ├─► Tax.receive()      ─► wait_for(["Cart"])   (publish WaitRegistered)
//!     ├─► Cart.receive()     ─► total += price       (publish StoreReceived)
//!     └─► round 1
//!           └─► Tax continuation ─► tax = total * rate (publish StoreResumed)
//! ```
//!
//! ## Run
//! ```bash
//! RUST_LOG=debug cargo run --example cart_tax --features logging
//! ```

use std::sync::Arc;

use serde_json::json;
use storevisor::{Action, ActionStore, Config, Dispatcher, LogWriter, Subscribe};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Route `tracing` output to stderr (LogWriter renders events through it)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // 2. Cart sums the prices of added items
    let cart = ActionStore::new(0u64).on("cart/add", |total, payload, _, _| {
        *total += payload["price"].as_u64().unwrap_or(0);
        Ok(())
    });

    // 3. Tax needs the updated cart total, so it waits for "Cart"
    let tax = ActionStore::new(0u64)
        .with_options(json!({ "rate_percent": 20 }))
        .on("cart/add", |_, _, _, cx| {
            cx.wait_for(["Cart"], |tax: &mut ActionStore<u64>, progress| {
                let total = progress
                    .dispatcher()
                    .with_store("Cart", |cart: &ActionStore<u64>| *cart.state())
                    .unwrap_or(0);
                let rate = tax.options()["rate_percent"].as_u64().unwrap_or(0);
                *tax.state_mut() = total * rate / 100;
                Ok(())
            })?;
            Ok(())
        });

    // 4. Tax is registered first on purpose: the wait reorders the work
    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
    let dispatcher = Dispatcher::builder(Config::default())
        .with_store("Tax", tax)
        .with_store("Cart", cart)
        .with_subscribers(subs)
        .build()?;

    for price in [250, 100] {
        dispatcher.dispatch(&Action::new("cart/add", json!({ "price": price })))?;
    }

    let total = dispatcher.with_store("Cart", |c: &ActionStore<u64>| *c.state());
    let tax = dispatcher.with_store("Tax", |t: &ActionStore<u64>| *t.state());
    println!("cart total: {total:?}, tax: {tax:?}");
    Ok(())
}
