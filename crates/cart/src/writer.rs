//! Background snapshot writer.
//!
//! Mutations hand the full cart to this task over an unbounded channel and
//! return immediately. The task writes snapshots one at a time in the order
//! they were enqueued, so the slot always ends up holding the cart as of the
//! last write that succeeded. Failures are logged and dropped.

use std::sync::Arc;

use gomarketplace_core::Cart;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::codec;
use crate::slot::DurableSlot;

enum WriteCommand {
    Persist(Arc<Cart>),
    Flush(oneshot::Sender<()>),
}

/// Handle to the writer task. Dropping it lets the task drain and exit.
pub(crate) struct SnapshotWriter {
    tx: mpsc::UnboundedSender<WriteCommand>,
    task: JoinHandle<()>,
}

impl SnapshotWriter {
    /// Spawn the writer task on the current tokio runtime.
    pub(crate) fn spawn(slot: Arc<dyn DurableSlot>, key: String) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(run(slot, key, rx));
        Self { tx, task }
    }

    /// Queue a write of `cart`. Never blocks.
    pub(crate) fn enqueue(&self, cart: Arc<Cart>) {
        if self.tx.send(WriteCommand::Persist(cart)).is_err() {
            error!("Snapshot writer has stopped, dropping durable write");
        }
    }

    /// A clone of the command sender, for flushing without holding a lock.
    pub(crate) fn flusher(&self) -> Flusher {
        Flusher {
            tx: self.tx.clone(),
        }
    }

    /// Stop accepting writes and wait for queued ones to finish.
    pub(crate) async fn close(self) {
        let Self { tx, task } = self;
        drop(tx);
        if let Err(e) = task.await {
            error!(error = %e, "Snapshot writer task failed");
        }
    }
}

/// Waits for every write queued before [`Flusher::flush`] was called.
pub(crate) struct Flusher {
    tx: mpsc::UnboundedSender<WriteCommand>,
}

impl Flusher {
    pub(crate) async fn flush(self) {
        let (ack_tx, ack_rx) = oneshot::channel();
        if self.tx.send(WriteCommand::Flush(ack_tx)).is_err() {
            return;
        }
        // An Err means the task exited, and with it every queued write.
        let _ = ack_rx.await;
    }
}

async fn run(
    slot: Arc<dyn DurableSlot>,
    key: String,
    mut rx: mpsc::UnboundedReceiver<WriteCommand>,
) {
    info!(backend = slot.backend(), key = %key, "Snapshot writer started");

    while let Some(command) = rx.recv().await {
        match command {
            WriteCommand::Persist(cart) => persist(slot.as_ref(), &key, &cart).await,
            WriteCommand::Flush(ack) => {
                let _ = ack.send(());
            }
        }
    }

    debug!(key = %key, "Snapshot writer stopped");
}

async fn persist(slot: &dyn DurableSlot, key: &str, cart: &Cart) {
    let raw = match codec::encode(cart) {
        Ok(raw) => raw,
        Err(e) => {
            error!(error = %e, key, "Failed to encode cart snapshot");
            return;
        }
    };

    match slot.set(key, raw).await {
        Ok(()) => debug!(key, lines = cart.len(), "Durable snapshot written"),
        Err(e) => error!(error = %e, key, "Failed to write durable snapshot"),
    }
}
