mod json_file;
#[cfg(feature = "sqlite")]
mod sqlite;

pub use json_file::JsonFileStore;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStore;

use thiserror::Error;

use crate::catalog::CatalogState;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("another process holds the migration lock")]
    Contention,
    #[error("store io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("catalog serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("{0}")]
    Backend(String),
}

/// Durable home of the catalog and the applied-migration log.
///
/// `commit_applied` and `commit_reverted` persist the catalog snapshot and
/// the log change as one atomic step: after a crash the store never holds
/// a log entry without the matching catalog state, or vice versa.
pub trait CatalogStore {
    fn load_catalog(&mut self) -> Result<CatalogState, StoreError>;

    /// Applied migration identifiers in application order.
    fn applied_migrations(&mut self) -> Result<Vec<String>, StoreError>;

    fn commit_applied(&mut self, catalog: &CatalogState, name: &str) -> Result<(), StoreError>;

    fn commit_reverted(&mut self, catalog: &CatalogState, name: &str) -> Result<(), StoreError>;

    /// Acquire the exclusive run lock. `Contention` if already held.
    fn try_lock(&mut self) -> Result<(), StoreError>;

    fn unlock(&mut self) -> Result<(), StoreError>;
}

#[derive(Default)]
pub struct MemoryStore {
    catalog: CatalogState,
    applied: Vec<String>,
    locked: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(catalog: CatalogState, applied: Vec<String>) -> Self {
        Self {
            catalog,
            applied,
            locked: false,
        }
    }
}

impl CatalogStore for MemoryStore {
    fn load_catalog(&mut self) -> Result<CatalogState, StoreError> {
        Ok(self.catalog.clone())
    }

    fn applied_migrations(&mut self) -> Result<Vec<String>, StoreError> {
        Ok(self.applied.clone())
    }

    fn commit_applied(&mut self, catalog: &CatalogState, name: &str) -> Result<(), StoreError> {
        self.catalog = catalog.clone();
        if !self.applied.iter().any(|n| n == name) {
            self.applied.push(name.to_string());
        }
        Ok(())
    }

    fn commit_reverted(&mut self, catalog: &CatalogState, name: &str) -> Result<(), StoreError> {
        self.catalog = catalog.clone();
        self.applied.retain(|n| n != name);
        Ok(())
    }

    fn try_lock(&mut self) -> Result<(), StoreError> {
        if self.locked {
            return Err(StoreError::Contention);
        }
        self.locked = true;
        Ok(())
    }

    fn unlock(&mut self) -> Result<(), StoreError> {
        self.locked = false;
        Ok(())
    }
}
