use std::collections::BTreeMap;

use thiserror::Error;

use crate::catalog::{CatalogError, CatalogState};
use crate::operation::Operation;

/// One versioned, reversible schema change.
///
/// Identifiers take the form `<unixtime>_<description>` with a fixed-width
/// seconds timestamp, so lexicographic order equals chronological order.
/// A migration is authored once; amending history is a new migration.
pub struct Migration {
    pub name: &'static str,
    forward: Vec<Box<dyn Operation>>,
    backward: Option<Vec<Box<dyn Operation>>>,
}

impl std::fmt::Debug for Migration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Migration")
            .field("name", &self.name)
            .field("forward", &format!("[{} operations]", self.forward.len()))
            .field(
                "backward",
                &self
                    .backward
                    .as_ref()
                    .map(|b| format!("[{} operations]", b.len())),
            )
            .finish()
    }
}

impl Migration {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            forward: Vec::new(),
            backward: None,
        }
    }

    /// Add an operation with automatic reverse derivation.
    /// The backward direction is derived from each operation's `revert()`.
    pub fn operation(mut self, op: impl Operation + 'static) -> Self {
        self.forward.push(Box::new(op));
        self
    }

    /// Set forward operations (replaces any existing).
    /// Use with `backward_ops()` for explicit control over both directions.
    pub fn forward_ops(mut self, ops: Vec<Box<dyn Operation>>) -> Self {
        self.forward = ops;
        self
    }

    /// Set explicit backward operations (replaces automatic derivation).
    /// When set, these operations run in order (not reversed) during revert.
    pub fn backward_ops(mut self, ops: Vec<Box<dyn Operation>>) -> Self {
        self.backward = Some(ops);
        self
    }

    /// Leading unix timestamp of the identifier, if well-formed.
    pub fn timestamp(&self) -> Option<u64> {
        self.name.split('_').next()?.parse().ok()
    }

    pub fn is_reversible(&self) -> bool {
        if self.backward.is_some() {
            return true;
        }
        self.forward.iter().all(|op| op.is_reversible())
    }

    /// Run the forward operations in order against the catalog.
    pub fn apply(&self, catalog: &mut CatalogState) -> Result<(), CatalogError> {
        for op in &self.forward {
            op.apply(catalog)?;
        }
        Ok(())
    }

    /// Undo this migration against the catalog.
    /// Returns `None` if not reversible.
    pub fn revert(&self, catalog: &mut CatalogState) -> Option<Result<(), CatalogError>> {
        if let Some(ref backward) = self.backward {
            // Explicit backward ops: run in order (not reversed)
            for op in backward {
                if let Err(e) = op.apply(catalog) {
                    return Some(Err(e));
                }
            }
            Some(Ok(()))
        } else {
            if !self.is_reversible() {
                return None;
            }
            for op in self.forward.iter().rev() {
                match op.revert(catalog) {
                    Some(Ok(())) => {}
                    Some(Err(e)) => return Some(Err(e)),
                    None => return None,
                }
            }
            Some(Ok(()))
        }
    }

    pub fn forward_operations(&self) -> &[Box<dyn Operation>] {
        &self.forward
    }

    pub fn backward_operations(&self) -> Option<&[Box<dyn Operation>]> {
        self.backward.as_deref()
    }
}

/// Holds migrations keyed by identifier. Application order is always
/// identifier order, never registration order.
#[derive(Default)]
pub struct MigrationRegistry {
    migrations: BTreeMap<&'static str, Migration>,
}

impl MigrationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, migration: Migration) -> Result<(), MigrationError> {
        let name = migration.name;
        if self.migrations.contains_key(name) {
            return Err(MigrationError::DuplicateIdentifier(name.to_string()));
        }
        self.migrations.insert(name, migration);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Migration> {
        self.migrations.get(name)
    }

    /// All migrations in identifier order.
    pub fn all(&self) -> impl Iterator<Item = &Migration> {
        self.migrations.values()
    }

    /// Identifiers sorted lexicographically, which for well-formed
    /// fixed-width timestamps is chronological order.
    pub fn ordered_identifiers(&self) -> Vec<&'static str> {
        self.migrations.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.migrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.migrations.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MigrationError {
    #[error("duplicate migration identifier: {0}")]
    DuplicateIdentifier(String),
    #[error("migration not found: {0}")]
    NotFound(String),
    #[error("migration is not reversible: {0}")]
    NotReversible(String),
    #[error("no applied migrations to revert")]
    NothingApplied,
    #[error("migration {migration} failed to apply: {source}")]
    ForwardFailed {
        migration: String,
        source: CatalogError,
        /// Identifiers committed earlier in the same run, in order.
        completed: Vec<String>,
    },
    #[error("migration {migration} failed to revert: {source}")]
    BackwardFailed {
        migration: String,
        source: CatalogError,
    },
    #[error("catalog does not match the applied migration log: {0}")]
    InconsistentState(String),
    #[error("another migration run holds the catalog lock")]
    LockContention,
    #[error("store error during {context}: {message}")]
    Store { context: String, message: String },
}
