use rusqlite::Connection;

use crate::catalog::CatalogState;
use crate::store::{CatalogStore, StoreError};

/// SQLite-backed store: the catalog as one JSON document row, the applied
/// log as a table ordered by insertion. Each commit writes both inside a
/// single transaction.
pub struct SqliteStore<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteStore<'a> {
    pub fn new(conn: &'a Connection) -> Result<Self, StoreError> {
        let store = Self { conn };
        store.ensure_tables()?;
        Ok(store)
    }

    fn ensure_tables(&self) -> Result<(), StoreError> {
        self.conn
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS catalog_state (
                    id INTEGER PRIMARY KEY CHECK (id = 1),
                    document TEXT NOT NULL
                 );
                 CREATE TABLE IF NOT EXISTS applied_migrations (
                    name TEXT PRIMARY KEY
                 );
                 CREATE TABLE IF NOT EXISTS migration_lock (
                    id INTEGER PRIMARY KEY CHECK (id = 1)
                 );",
            )
            .map_err(backend)?;
        Ok(())
    }

    fn write_catalog(&self, catalog: &CatalogState) -> Result<(), StoreError> {
        let document = serde_json::to_string(catalog)?;
        self.conn
            .execute(
                "INSERT INTO catalog_state (id, document) VALUES (1, ?1)
                 ON CONFLICT(id) DO UPDATE SET document = excluded.document",
                [&document],
            )
            .map_err(backend)?;
        Ok(())
    }

    fn in_transaction<F>(&self, f: F) -> Result<(), StoreError>
    where
        F: FnOnce() -> Result<(), StoreError>,
    {
        self.conn.execute_batch("BEGIN IMMEDIATE").map_err(backend)?;
        match f() {
            Ok(()) => self.conn.execute_batch("COMMIT").map_err(backend),
            Err(e) => {
                let _ = self.conn.execute_batch("ROLLBACK");
                Err(e)
            }
        }
    }
}

fn backend(e: rusqlite::Error) -> StoreError {
    StoreError::Backend(e.to_string())
}

impl CatalogStore for SqliteStore<'_> {
    fn load_catalog(&mut self) -> Result<CatalogState, StoreError> {
        let document: Option<String> = self
            .conn
            .query_row("SELECT document FROM catalog_state WHERE id = 1", [], |row| {
                row.get(0)
            })
            .map(Some)
            .or_else(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => Ok(None),
                other => Err(backend(other)),
            })?;

        match document {
            Some(document) => Ok(serde_json::from_str(&document)?),
            None => Ok(CatalogState::new()),
        }
    }

    fn applied_migrations(&mut self) -> Result<Vec<String>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM applied_migrations ORDER BY rowid")
            .map_err(backend)?;

        let names = stmt
            .query_map([], |row| row.get(0))
            .map_err(backend)?
            .collect::<Result<Vec<String>, _>>()
            .map_err(backend)?;

        Ok(names)
    }

    fn commit_applied(&mut self, catalog: &CatalogState, name: &str) -> Result<(), StoreError> {
        self.in_transaction(|| {
            self.write_catalog(catalog)?;
            self.conn
                .execute(
                    "INSERT OR IGNORE INTO applied_migrations (name) VALUES (?1)",
                    [name],
                )
                .map_err(backend)?;
            Ok(())
        })
    }

    fn commit_reverted(&mut self, catalog: &CatalogState, name: &str) -> Result<(), StoreError> {
        self.in_transaction(|| {
            self.write_catalog(catalog)?;
            self.conn
                .execute("DELETE FROM applied_migrations WHERE name = ?1", [name])
                .map_err(backend)?;
            Ok(())
        })
    }

    fn try_lock(&mut self) -> Result<(), StoreError> {
        match self
            .conn
            .execute("INSERT INTO migration_lock (id) VALUES (1)", [])
        {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Err(StoreError::Contention)
            }
            Err(e) => Err(backend(e)),
        }
    }

    fn unlock(&mut self) -> Result<(), StoreError> {
        self.conn
            .execute("DELETE FROM migration_lock WHERE id = 1", [])
            .map_err(backend)?;
        Ok(())
    }
}
