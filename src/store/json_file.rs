use std::fs::{self, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::catalog::CatalogState;
use crate::store::{CatalogStore, StoreError};

/// Catalog and applied log in a single JSON document on disk.
///
/// Writes go to a temp sibling and are renamed into place, so the document
/// is always either the old state or the new state, never half of each.
/// The run lock is a `.lock` sibling created with `create_new`.
pub struct JsonFileStore {
    path: PathBuf,
    lock_path: PathBuf,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreDocument {
    catalog: CatalogState,
    applied: Vec<String>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let lock_path = sibling(&path, "lock");
        Self { path, lock_path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_document(&self) -> Result<StoreDocument, StoreError> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(StoreDocument::default()),
            Err(e) => Err(e.into()),
        }
    }

    fn write_document(&self, document: &StoreDocument) -> Result<(), StoreError> {
        let tmp = sibling(&self.path, "tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(document)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".");
    name.push(suffix);
    path.with_file_name(name)
}

impl CatalogStore for JsonFileStore {
    fn load_catalog(&mut self) -> Result<CatalogState, StoreError> {
        Ok(self.read_document()?.catalog)
    }

    fn applied_migrations(&mut self) -> Result<Vec<String>, StoreError> {
        Ok(self.read_document()?.applied)
    }

    fn commit_applied(&mut self, catalog: &CatalogState, name: &str) -> Result<(), StoreError> {
        let mut document = self.read_document()?;
        document.catalog = catalog.clone();
        if !document.applied.iter().any(|n| n == name) {
            document.applied.push(name.to_string());
        }
        self.write_document(&document)
    }

    fn commit_reverted(&mut self, catalog: &CatalogState, name: &str) -> Result<(), StoreError> {
        let mut document = self.read_document()?;
        document.catalog = catalog.clone();
        document.applied.retain(|n| n != name);
        self.write_document(&document)
    }

    fn try_lock(&mut self) -> Result<(), StoreError> {
        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&self.lock_path)
        {
            Ok(_) => Ok(()),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Err(StoreError::Contention),
            Err(e) => Err(e.into()),
        }
    }

    fn unlock(&mut self) -> Result<(), StoreError> {
        match fs::remove_file(&self.lock_path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
