//! Go Marketplace Cart - Write-through cart store.
//!
//! Holds the shopping cart in memory for fast reads and mirrors it to a single
//! durable key-value slot after every mutation, so a restart restores the last
//! known cart.
//!
//! # Architecture
//!
//! - [`CartStore`] - Cloneable handle owning the cart. Mutations are
//!   synchronous and publish a new snapshot atomically; durable writes run on
//!   a background task in mutation order.
//! - [`DurableSlot`] - Storage collaborator (`get`/`set` on one key). Backends:
//!   [`MemorySlot`], [`FileSlot`], and `PgSlot` (feature `postgres`).
//! - [`codec`] - JSON encoding of the durable snapshot.
//! - [`config`] - Environment-driven backend selection.
//!
//! # Usage
//!
//! ```rust,no_run
//! use gomarketplace_cart::{CartStore, MemorySlot};
//! use gomarketplace_core::NewLineItem;
//!
//! # async fn demo() {
//! let store = CartStore::new(MemorySlot::new());
//! store.load().await;
//!
//! store.add_to_cart(NewLineItem::new("sku-1", "Sneakers", "https://img/1.png", 200));
//! store.increment("sku-1");
//! assert_eq!(store.snapshot().get("sku-1").map(|line| line.quantity), Some(2));
//!
//! store.shutdown().await;
//! # }
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod codec;
pub mod config;
pub mod error;
pub mod slot;
pub mod store;
pub mod telemetry;
mod writer;

pub use config::{CartConfig, ConfigError, LogFormat, StorageBackend};
pub use error::{CodecError, StorageError};
#[cfg(feature = "postgres")]
pub use slot::PgSlot;
pub use slot::{DurableSlot, FileSlot, MemorySlot, open_slot};
pub use store::{CartSnapshot, CartStore, DEFAULT_STORAGE_KEY};
