//! Integration tests for write-through persistence.
//!
//! Each test mutates a store, simulates a restart on the same durable slot,
//! and checks what the next process would see.

use std::sync::Arc;

use gomarketplace_cart::{
    CartStore, DEFAULT_STORAGE_KEY, DurableSlot, FileSlot, MemorySlot, codec,
};
use gomarketplace_core::{NewLineItem, Price};
use gomarketplace_integration_tests::{init_tracing, product, restart, start_store};

// =============================================================================
// Restart
// =============================================================================

#[tokio::test]
async fn test_restart_reproduces_cart() {
    init_tracing();
    let slot: Arc<dyn DurableSlot> = Arc::new(MemorySlot::new());
    let store = start_store(Arc::clone(&slot)).await;

    store.add_to_cart(product("a"));
    store.add_to_cart(product("b"));
    store.add_to_cart(product("a"));
    store.increment("b");
    store.decrement("a");
    store.remove_from_cart("b");
    store.add_to_cart(product("c"));
    let expected = store.snapshot();

    let (_, loaded) = restart(store, slot).await;
    assert_eq!(loaded.cart(), expected.cart());
}

#[tokio::test]
async fn test_restart_keeps_prices_exact() {
    let slot: Arc<dyn DurableSlot> = Arc::new(MemorySlot::new());
    let store = start_store(Arc::clone(&slot)).await;
    let precise: Price = "19.990000000000000000000001".parse().expect("price");
    let huge: Price = "1e30".parse().expect("price");

    store.add_to_cart(NewLineItem::new("a", "Mug", "mug.png", precise.clone()));
    store.add_to_cart(NewLineItem::new("b", "Yacht", "yacht.png", huge.clone()));
    let expected = store.snapshot();

    let (_, loaded) = restart(store, slot).await;
    assert_eq!(loaded.cart(), expected.cart());
    assert_eq!(loaded.get("a").expect("line a").price, precise);
    assert_eq!(loaded.get("b").expect("line b").price, huge);
}

#[tokio::test]
async fn test_load_keeps_every_line_when_one_price_exceeds_decimal() {
    let raw = r#"[{"id":"a","title":"Mug","image_url":"mug.png","price":10,"quantity":3},{"id":"b","title":"Yacht","image_url":"yacht.png","price":1e30,"quantity":1}]"#;
    let memory = MemorySlot::with_value(DEFAULT_STORAGE_KEY, raw);
    let store = start_store(Arc::new(memory.clone())).await;

    let snapshot = store.snapshot();
    assert_eq!(snapshot.len(), 2);
    assert_eq!(snapshot.get("a").expect("line a").quantity, 3);
    assert_eq!(snapshot.summary().subtotal, None);

    store.increment("a");
    store.flush().await;
    let rewritten = memory.value(DEFAULT_STORAGE_KEY).expect("snapshot written");
    assert!(rewritten.contains(r#""price":1e30"#));
}

#[tokio::test]
async fn test_restart_on_file_slot() {
    let dir = tempfile::tempdir().expect("tempdir");
    let slot: Arc<dyn DurableSlot> = Arc::new(FileSlot::open(dir.path()).await.expect("open"));
    let store = start_store(Arc::clone(&slot)).await;

    store.add_to_cart(NewLineItem::new("a", "Mug", "mug.png", 10));
    store.increment("a");
    let expected = store.snapshot();
    store.shutdown().await;

    // A new slot instance on the same directory stands in for a new process.
    let reopened: Arc<dyn DurableSlot> =
        Arc::new(FileSlot::open(dir.path()).await.expect("reopen"));
    let fresh = start_store(reopened).await;

    assert_eq!(fresh.snapshot().cart(), expected.cart());
    assert_eq!(fresh.snapshot().get("a").map(|line| line.quantity), Some(2));
}

#[tokio::test]
async fn test_restart_after_failed_write_keeps_last_good_snapshot() {
    let memory = MemorySlot::new();
    let slot: Arc<dyn DurableSlot> = Arc::new(memory.clone());
    let store = start_store(Arc::clone(&slot)).await;

    store.add_to_cart(product("a"));
    store.flush().await;
    let last_good = store.snapshot();

    memory.fail_writes(true);
    store.add_to_cart(product("b"));
    assert!(store.snapshot().contains("b"));

    let (_, loaded) = restart(store, slot).await;
    assert_eq!(loaded.cart(), last_good.cart());
}

#[tokio::test]
async fn test_malformed_snapshot_is_replaced_on_first_write() {
    let memory = MemorySlot::with_value(DEFAULT_STORAGE_KEY, r#"[{"id": 1}]"#);
    let slot: Arc<dyn DurableSlot> = Arc::new(memory.clone());
    let store = start_store(slot).await;
    assert!(store.snapshot().is_empty());

    store.add_to_cart(product("a"));
    store.flush().await;

    let raw = memory.value(DEFAULT_STORAGE_KEY).expect("snapshot written");
    let persisted = codec::decode(&raw).expect("well-formed");
    assert_eq!(&persisted, store.snapshot().cart());
}

#[tokio::test]
async fn test_custom_key_is_isolated() {
    let memory = MemorySlot::new();
    let slot: Arc<dyn DurableSlot> = Arc::new(memory.clone());
    let store = CartStore::with_key(slot, "@gomarketplace:wishlist");
    store.load().await;

    store.add_to_cart(product("a"));
    store.flush().await;

    assert!(memory.value("@gomarketplace:wishlist").is_some());
    assert!(memory.value(DEFAULT_STORAGE_KEY).is_none());
}

// =============================================================================
// Write Counts
// =============================================================================

#[tokio::test]
async fn test_write_count_matches_effective_removals() {
    let memory = MemorySlot::new();
    let slot: Arc<dyn DurableSlot> = Arc::new(memory.clone());
    let store = start_store(slot).await;

    store.add_to_cart(product("a"));
    store.add_to_cart(product("b"));
    store.flush().await;
    let after_adds = memory.write_count();
    assert_eq!(after_adds, 2);

    let calls = ["a", "a", "missing", "b", "b"];
    let effective = calls
        .iter()
        .filter(|id| store.remove_from_cart(id))
        .count();
    store.flush().await;

    assert_eq!(effective, 2);
    assert_eq!(memory.write_count() - after_adds, effective);
}

#[tokio::test]
async fn test_unknown_increment_and_decrement_still_write() {
    let memory = MemorySlot::new();
    let slot: Arc<dyn DurableSlot> = Arc::new(memory.clone());
    let store = start_store(slot).await;

    store.increment("missing");
    store.decrement("missing");
    store.flush().await;

    assert_eq!(memory.write_count(), 2);
    assert_eq!(memory.value(DEFAULT_STORAGE_KEY).as_deref(), Some("[]"));
}

#[tokio::test]
async fn test_load_does_not_write() {
    let memory = MemorySlot::with_value(DEFAULT_STORAGE_KEY, "[]");
    let slot: Arc<dyn DurableSlot> = Arc::new(memory.clone());
    let store = start_store(slot).await;
    store.flush().await;

    assert_eq!(memory.write_count(), 0);
}

// =============================================================================
// Snapshot Format
// =============================================================================

#[tokio::test]
async fn test_snapshot_is_json_array_in_cart_order() {
    let memory = MemorySlot::new();
    let slot: Arc<dyn DurableSlot> = Arc::new(memory.clone());
    let store = start_store(slot).await;

    store.add_to_cart(NewLineItem::new("b", "Bag", "bag.png", 30));
    store.add_to_cart(NewLineItem::new("a", "Mug", "mug.png", 10));
    store.flush().await;

    let raw = memory.value(DEFAULT_STORAGE_KEY).expect("snapshot written");
    let value: serde_json::Value = serde_json::from_str(&raw).expect("json");
    let lines = value.as_array().expect("array");

    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["id"], "b");
    assert_eq!(lines[1]["id"], "a");
    assert_eq!(lines[1]["quantity"], 1);
}
