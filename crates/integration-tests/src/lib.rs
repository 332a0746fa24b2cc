//! Integration tests for the Go Marketplace cart store.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p gomarketplace-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart_operations` - Merge rules and lenient handling of unknown ids
//! - `cart_durability` - Write-through counts and simulated restarts
//! - `cart_invariants` - Property tests over random operation sequences
//!
//! This crate holds the shared fixtures.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;

use gomarketplace_cart::{CartSnapshot, CartStore, DEFAULT_STORAGE_KEY, DurableSlot, LogFormat};
use gomarketplace_core::{NewLineItem, Price};

/// Install a test subscriber once; honours `RUST_LOG`.
pub fn init_tracing() {
    let _ = gomarketplace_cart::telemetry::init(LogFormat::Text);
}

/// A catalog product with a deterministic title, image and price.
#[must_use]
pub fn product(id: &str) -> NewLineItem {
    let price = id.bytes().map(i64::from).sum::<i64>() * 10;
    NewLineItem::new(
        id,
        format!("Product {id}"),
        format!("https://cdn.gomarketplace.test/{id}.png"),
        Price::from(price),
    )
}

/// Build and activate a store on `slot` under the default key.
pub async fn start_store(slot: Arc<dyn DurableSlot>) -> CartStore {
    let store = CartStore::with_key(slot, DEFAULT_STORAGE_KEY);
    store.load().await;
    store
}

/// Simulate a process restart: drain and stop `store`, then bring up a fresh
/// store on the same slot and return what it loaded.
pub async fn restart(store: CartStore, slot: Arc<dyn DurableSlot>) -> (CartStore, CartSnapshot) {
    store.shutdown().await;
    let fresh = CartStore::with_key(slot, store.key());
    let loaded = fresh.load().await;
    (fresh, loaded)
}
