//! The write-through cart store.
//!
//! [`CartStore`] holds the cart in memory and mirrors it to one key of a
//! [`DurableSlot`] after every mutation.
//!
//! # Lifecycle
//!
//! 1. [`CartStore::new`] builds an inactive handle.
//! 2. [`CartStore::load`] seeds the cart from the durable snapshot (or leaves
//!    it empty) and starts the background writer. The store is now active.
//! 3. Mutations and reads. Each mutation publishes a new snapshot atomically
//!    and queues a full write of the cart; it never waits for storage.
//! 4. [`CartStore::shutdown`] drains queued writes and deactivates the store.
//!
//! Reading or mutating an inactive store is a wiring bug and panics.
//!
//! # Persistence rules
//!
//! `add_to_cart`, `increment` and `decrement` always write, even when the id
//! is unknown. `remove_from_cart` writes only when it removed something.

use std::ops::Deref;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use gomarketplace_core::{Cart, CartSummary, NewLineItem};
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

use crate::codec;
use crate::config::CartConfig;
use crate::error::StorageError;
use crate::slot::{DurableSlot, open_slot};
use crate::writer::SnapshotWriter;

/// Key the cart is stored under unless configured otherwise.
pub const DEFAULT_STORAGE_KEY: &str = "@gomarketplace:products";

const INACTIVE_STORE: &str =
    "CartStore used outside an active store: call `load()` before reading or mutating the cart";

/// An immutable view of the cart at one point in time.
///
/// Cheap to clone. `version` starts at 0 and goes up by one every time the
/// cart's contents change, so consumers can tell whether to recompute.
#[derive(Debug, Clone, Default)]
pub struct CartSnapshot {
    version: u64,
    cart: Arc<Cart>,
}

impl CartSnapshot {
    /// Change counter of this snapshot.
    #[must_use]
    pub const fn version(&self) -> u64 {
        self.version
    }

    /// The cart contents.
    #[must_use]
    pub fn cart(&self) -> &Cart {
        &self.cart
    }
}

impl Deref for CartSnapshot {
    type Target = Cart;

    fn deref(&self) -> &Self::Target {
        &self.cart
    }
}

/// Handle to the write-through cart store.
///
/// Cloning the handle is cheap (`Arc`); all clones share one cart. The store
/// assumes a single logical writer.
#[derive(Clone)]
pub struct CartStore {
    inner: Arc<CartStoreInner>,
}

struct CartStoreInner {
    key: String,
    slot: Arc<dyn DurableSlot>,
    state: watch::Sender<CartSnapshot>,
    /// `Some` while the store is active.
    writer: Mutex<Option<SnapshotWriter>>,
}

impl CartStore {
    /// Create an inactive store persisting under [`DEFAULT_STORAGE_KEY`].
    #[must_use]
    pub fn new(slot: impl DurableSlot) -> Self {
        Self::with_key(Arc::new(slot), DEFAULT_STORAGE_KEY)
    }

    /// Create an inactive store persisting under `key`.
    #[must_use]
    pub fn with_key(slot: Arc<dyn DurableSlot>, key: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(CartStoreInner {
                key: key.into(),
                slot,
                state: watch::Sender::new(CartSnapshot::default()),
                writer: Mutex::new(None),
            }),
        }
    }

    /// Open the configured backend and create an inactive store on it.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be opened.
    pub async fn open(config: &CartConfig) -> Result<Self, StorageError> {
        let slot = open_slot(config).await?;
        Ok(Self::with_key(slot, config.storage_key.clone()))
    }

    /// Key of the durable slot.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.inner.key
    }

    /// Whether the store is between `load()` and `shutdown()`.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.lock_writer().is_some()
    }

    /// Activate the store, seeding the cart from the durable snapshot.
    ///
    /// A missing snapshot leaves the cart empty. A malformed or unreadable
    /// snapshot is logged and also leaves the cart empty; it never fails.
    /// Calling `load()` on an active store does nothing.
    ///
    /// Must be called from within a tokio runtime.
    #[instrument(skip(self), fields(key = %self.inner.key, backend = self.inner.slot.backend()))]
    pub async fn load(&self) -> CartSnapshot {
        if self.is_active() {
            warn!("Cart store already active, ignoring repeated load");
            return self.snapshot();
        }

        let cart = self.read_durable().await;

        {
            let mut writer = self.lock_writer();
            if writer.is_none() {
                let lines = cart.len();
                self.publish(cart);
                *writer = Some(SnapshotWriter::spawn(
                    Arc::clone(&self.inner.slot),
                    self.inner.key.clone(),
                ));
                info!(lines, "Cart store activated");
            } else {
                warn!("Cart store activated concurrently, discarding loaded snapshot");
            }
        }

        self.snapshot()
    }

    /// Add one unit of `item` to the cart.
    ///
    /// An existing line with the same id gets its quantity increased by one
    /// and its title, image and price replaced by `item`'s. Otherwise the item
    /// is appended with quantity 1. Returns the line's new quantity.
    ///
    /// # Panics
    ///
    /// Panics if the store is not active.
    #[track_caller]
    pub fn add_to_cart(&self, item: NewLineItem) -> i64 {
        let id = item.id.clone();
        let quantity = self.mutate(true, |cart| (true, cart.add(item)));
        debug!(id = %id, quantity, "Added to cart");
        quantity
    }

    /// Add one unit to the line with `id`.
    ///
    /// Unknown ids leave the cart unchanged. The cart is persisted either
    /// way. Returns whether a line was found.
    ///
    /// # Panics
    ///
    /// Panics if the store is not active.
    #[track_caller]
    pub fn increment(&self, id: &str) -> bool {
        let found = self.mutate(true, |cart| {
            let found = cart.increment(id);
            (found, found)
        });
        debug!(id, found, "Incremented cart line");
        found
    }

    /// Take one unit from the line with `id`.
    ///
    /// The quantity is not clamped and can go to zero or below; guarding
    /// against that is the caller's job. Unknown ids leave the cart
    /// unchanged. The cart is persisted either way. Returns whether a line
    /// was found.
    ///
    /// # Panics
    ///
    /// Panics if the store is not active.
    #[track_caller]
    pub fn decrement(&self, id: &str) -> bool {
        let found = self.mutate(true, |cart| {
            let found = cart.decrement(id);
            (found, found)
        });
        debug!(id, found, "Decremented cart line");
        found
    }

    /// Remove the line with `id`.
    ///
    /// Persists only if a line was removed. Returns whether one was.
    ///
    /// # Panics
    ///
    /// Panics if the store is not active.
    #[track_caller]
    pub fn remove_from_cart(&self, id: &str) -> bool {
        let removed = self.mutate(false, |cart| {
            let removed = cart.remove(id).is_some();
            (removed, removed)
        });
        debug!(id, removed, "Removed from cart");
        removed
    }

    /// The cart as of the most recently completed mutation.
    ///
    /// # Panics
    ///
    /// Panics if the store is not active.
    #[must_use]
    #[track_caller]
    pub fn snapshot(&self) -> CartSnapshot {
        self.ensure_active();
        self.inner.state.borrow().clone()
    }

    /// Current change counter.
    ///
    /// # Panics
    ///
    /// Panics if the store is not active.
    #[must_use]
    #[track_caller]
    pub fn version(&self) -> u64 {
        self.ensure_active();
        self.inner.state.borrow().version
    }

    /// Derived values of the current cart.
    ///
    /// # Panics
    ///
    /// Panics if the store is not active.
    #[must_use]
    #[track_caller]
    pub fn summary(&self) -> CartSummary {
        self.snapshot().summary()
    }

    /// Receive a notification every time the cart changes.
    ///
    /// Unlike the read operations this may be called before `load()`, so a
    /// consumer can observe the initial seeding.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CartSnapshot> {
        self.inner.state.subscribe()
    }

    /// Wait until every durable write queued so far has been attempted.
    ///
    /// # Panics
    ///
    /// Panics if the store is not active.
    pub async fn flush(&self) {
        let flusher = self.lock_writer().as_ref().map(SnapshotWriter::flusher);
        let Some(flusher) = flusher else {
            panic!("{INACTIVE_STORE}");
        };
        flusher.flush().await;
    }

    /// Drain queued writes, stop the writer and deactivate the store.
    ///
    /// Does nothing on an inactive store. A later `load()` re-reads the
    /// durable snapshot.
    #[instrument(skip(self), fields(key = %self.inner.key))]
    pub async fn shutdown(&self) {
        let writer = self.lock_writer().take();
        match writer {
            Some(writer) => {
                writer.close().await;
                info!("Cart store shut down");
            }
            None => debug!("Cart store already inactive"),
        }
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn lock_writer(&self) -> MutexGuard<'_, Option<SnapshotWriter>> {
        self.inner
            .writer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    #[track_caller]
    fn ensure_active(&self) {
        assert!(self.is_active(), "{INACTIVE_STORE}");
    }

    /// Apply `apply` to a copy of the cart and publish it if it changed.
    ///
    /// `apply` returns whether it changed the cart, plus a result. The cart is
    /// queued for writing if it changed or if `always_persist` is set. The
    /// writer lock is held throughout, so mutations never interleave.
    #[track_caller]
    fn mutate<R>(&self, always_persist: bool, apply: impl FnOnce(&mut Cart) -> (bool, R)) -> R {
        let writer = self.lock_writer();
        let Some(writer) = writer.as_ref() else {
            panic!("{INACTIVE_STORE}");
        };

        let mut cart = Cart::clone(&self.inner.state.borrow().cart);
        let (changed, result) = apply(&mut cart);

        if changed {
            self.inner.state.send_modify(|snapshot| {
                snapshot.cart = Arc::new(cart);
                snapshot.version += 1;
            });
        }

        if changed || always_persist {
            writer.enqueue(Arc::clone(&self.inner.state.borrow().cart));
        }

        result
    }

    /// Replace the cart wholesale, bumping the version if contents differ.
    fn publish(&self, cart: Cart) {
        self.inner.state.send_if_modified(|snapshot| {
            if *snapshot.cart == cart {
                return false;
            }
            snapshot.cart = Arc::new(cart);
            snapshot.version += 1;
            true
        });
    }

    async fn read_durable(&self) -> Cart {
        match self.inner.slot.get(&self.inner.key).await {
            Ok(Some(raw)) => codec::decode(&raw).unwrap_or_else(|e| {
                warn!(error = %e, "Ignoring malformed durable snapshot, starting with an empty cart");
                Cart::new()
            }),
            Ok(None) => {
                debug!("No durable snapshot, starting with an empty cart");
                Cart::new()
            }
            Err(e) => {
                warn!(error = %e, "Failed to read durable snapshot, starting with an empty cart");
                Cart::new()
            }
        }
    }
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("key", &self.inner.key)
            .field("backend", &self.inner.slot.backend())
            .field("active", &self.is_active())
            .field("version", &self.inner.state.borrow().version)
            .finish()
    }
}
