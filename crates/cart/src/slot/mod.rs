//! Durable key-value slots.
//!
//! A slot persists one opaque string per key, byte for byte. The cart store
//! owns the encoding; backends never look inside the value.
//!
//! ## Provided backends
//! - [`MemorySlot`]: in-process map (tests, ephemeral carts).
//! - [`FileSlot`]: one JSON file per key in a data directory.
//! - `PgSlot` (feature `postgres`): `cart_snapshots` table in `PostgreSQL`.

mod file;
mod memory;
#[cfg(feature = "postgres")]
mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

pub use file::FileSlot;
pub use memory::MemorySlot;
#[cfg(feature = "postgres")]
pub use postgres::PgSlot;

use crate::config::{CartConfig, StorageBackend};
use crate::error::StorageError;

/// Persistent storage addressed by string keys.
///
/// Implementations must be `Send + Sync`: the store writes from a background
/// task while the owner keeps its handle.
#[async_trait]
pub trait DurableSlot: Send + Sync + 'static {
    /// Read the value stored under `key`, or `None` if it was never written.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: String) -> Result<(), StorageError>;

    /// Short backend name for logs.
    fn backend(&self) -> &'static str;
}

/// Open the slot selected by `config`.
///
/// # Errors
///
/// Returns an error if the backend cannot be opened, or if `postgres` is
/// selected without the `postgres` feature.
pub async fn open_slot(config: &CartConfig) -> Result<Arc<dyn DurableSlot>, StorageError> {
    let slot: Arc<dyn DurableSlot> = match config.storage {
        StorageBackend::Memory => Arc::new(MemorySlot::new()),
        StorageBackend::File => Arc::new(FileSlot::open(&config.data_dir).await?),
        StorageBackend::Postgres => open_postgres(config).await?,
    };

    info!(backend = slot.backend(), "Durable slot opened");
    Ok(slot)
}

#[cfg(feature = "postgres")]
async fn open_postgres(config: &CartConfig) -> Result<Arc<dyn DurableSlot>, StorageError> {
    let url = config
        .database_url
        .as_ref()
        .ok_or_else(|| StorageError::Unavailable("postgres: no database URL".to_string()))?;
    let slot = PgSlot::connect(url).await?;
    slot.run_migrations().await?;
    Ok(Arc::new(slot))
}

#[cfg(not(feature = "postgres"))]
#[allow(clippy::unused_async)]
async fn open_postgres(_config: &CartConfig) -> Result<Arc<dyn DurableSlot>, StorageError> {
    Err(StorageError::Unavailable(
        "postgres (build with the `postgres` feature)".to_string(),
    ))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_memory_slot() {
        let config = CartConfig {
            storage: StorageBackend::Memory,
            ..CartConfig::default()
        };
        let slot = open_slot(&config).await.unwrap();
        assert_eq!(slot.backend(), "memory");
        assert!(slot.get("k").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_open_file_slot_creates_dir() {
        let dir = tempfile::tempdir().unwrap();
        let config = CartConfig {
            storage: StorageBackend::File,
            data_dir: dir.path().join("nested"),
            ..CartConfig::default()
        };
        let slot = open_slot(&config).await.unwrap();
        assert_eq!(slot.backend(), "file");
        assert!(dir.path().join("nested").is_dir());
    }

    #[cfg(not(feature = "postgres"))]
    #[tokio::test]
    async fn test_open_postgres_without_feature() {
        let config = CartConfig {
            storage: StorageBackend::Postgres,
            ..CartConfig::default()
        };
        assert!(matches!(
            open_slot(&config).await,
            Err(StorageError::Unavailable(_))
        ));
    }
}
