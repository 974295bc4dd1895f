use crate::catalog::{CatalogError, CatalogState};
use crate::operation::Operation;

#[derive(Debug, Clone)]
pub struct AddIndex {
    pub collection: String,
    pub index: String,
}

impl AddIndex {
    pub fn new(collection: impl Into<String>, index: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            index: index.into(),
        }
    }
}

impl Operation for AddIndex {
    fn apply(&self, catalog: &mut CatalogState) -> Result<(), CatalogError> {
        catalog.add_index(&self.collection, &self.index)
    }

    fn revert(&self, catalog: &mut CatalogState) -> Option<Result<(), CatalogError>> {
        Some(catalog.remove_index(&self.collection, &self.index))
    }

    fn describe(&self) -> String {
        format!("Add index {} to {}", self.index, self.collection)
    }
}

#[derive(Debug, Clone)]
pub struct RemoveIndex {
    pub collection: String,
    pub index: String,
}

impl RemoveIndex {
    pub fn new(collection: impl Into<String>, index: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            index: index.into(),
        }
    }
}

impl Operation for RemoveIndex {
    fn apply(&self, catalog: &mut CatalogState) -> Result<(), CatalogError> {
        catalog.remove_index(&self.collection, &self.index)
    }

    fn revert(&self, catalog: &mut CatalogState) -> Option<Result<(), CatalogError>> {
        Some(catalog.add_index(&self.collection, &self.index))
    }

    fn describe(&self) -> String {
        format!("Remove index {} from {}", self.index, self.collection)
    }
}
