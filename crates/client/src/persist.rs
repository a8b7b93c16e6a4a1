//! Cart persistence across page reloads.
//!
//! One durable record keyed to the cart, holding the full line detail so a
//! reloaded page renders without a catalog refetch. `load` is infallible
//! by contract: absent or corrupt data is the empty cart, never an error.

use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use thiserror::Error;

use shopsync_core::CartLine;

/// Error writing the persisted cart.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Serialize error: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("Write error: {0}")]
    Io(#[from] std::io::Error),
}

/// Durable storage for the cart slice of the store.
///
/// `save` overwrites the previous record; it is invoked synchronously after
/// every committed cart mutation, including rollbacks, so the persisted
/// state always matches the current in-memory state.
pub trait CartStorage: Send + Sync {
    /// Serialize and store the cart, replacing any prior value.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the record cannot be written.
    fn save(&self, lines: &[CartLine]) -> Result<(), StorageError>;

    /// Load the last saved cart. Absent or unparseable data yields the
    /// empty cart.
    fn load(&self) -> Vec<CartLine>;
}

impl<S: CartStorage + ?Sized> CartStorage for std::sync::Arc<S> {
    fn save(&self, lines: &[CartLine]) -> Result<(), StorageError> {
        (**self).save(lines)
    }

    fn load(&self) -> Vec<CartLine> {
        (**self).load()
    }
}

fn decode(bytes: &[u8]) -> Vec<CartLine> {
    match serde_json::from_slice(bytes) {
        Ok(lines) => lines,
        Err(e) => {
            tracing::warn!(error = %e, "Persisted cart is corrupt, starting empty");
            Vec::new()
        }
    }
}

/// File-backed storage: one JSON file holding the cart record.
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    /// Create storage backed by the given file path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CartStorage for JsonFileStorage {
    fn save(&self, lines: &[CartLine]) -> Result<(), StorageError> {
        let bytes = serde_json::to_vec(lines)?;
        std::fs::write(&self.path, bytes)?;
        Ok(())
    }

    fn load(&self) -> Vec<CartLine> {
        match std::fs::read(&self.path) {
            Ok(bytes) => decode(&bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read persisted cart, starting empty");
                Vec::new()
            }
        }
    }
}

/// In-memory storage for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryStorage {
    record: Mutex<Option<Vec<u8>>>,
}

impl MemoryStorage {
    /// Create empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite the raw stored bytes. Lets tests simulate corruption.
    pub fn set_raw(&self, bytes: Vec<u8>) {
        *self.lock() = Some(bytes);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<Vec<u8>>> {
        self.record.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl CartStorage for MemoryStorage {
    fn save(&self, lines: &[CartLine]) -> Result<(), StorageError> {
        let bytes = serde_json::to_vec(lines)?;
        *self.lock() = Some(bytes);
        Ok(())
    }

    fn load(&self) -> Vec<CartLine> {
        self.lock().as_deref().map_or_else(Vec::new, decode)
    }
}
