use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::collection::{Collection, RuleOp};
use crate::field::Field;

/// The full set of defined collections, keyed by name.
///
/// Mutated only through the methods below; the migration runner never
/// edits a `Collection` in place from outside. A `BTreeMap` keeps the
/// serialized form stable across runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogState {
    collections: BTreeMap<String, Collection>,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CatalogError {
    #[error("collection already exists: {0}")]
    CollectionExists(String),
    #[error("unknown collection: {0}")]
    UnknownCollection(String),
    #[error("field {field} already exists on {collection}")]
    FieldExists { collection: String, field: String },
    #[error("unknown field {field} on {collection}")]
    UnknownField { collection: String, field: String },
    #[error("index {index} already exists on {collection}")]
    IndexExists { collection: String, index: String },
    #[error("unknown index {index} on {collection}")]
    UnknownIndex { collection: String, index: String },
}

impl CatalogState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_collection(&mut self, collection: Collection) -> Result<(), CatalogError> {
        if self.collections.contains_key(&collection.name) {
            return Err(CatalogError::CollectionExists(collection.name));
        }
        self.collections.insert(collection.name.clone(), collection);
        Ok(())
    }

    /// Removes a collection, returning its definition.
    pub fn delete_collection(&mut self, name: &str) -> Result<Collection, CatalogError> {
        self.collections
            .remove(name)
            .ok_or_else(|| CatalogError::UnknownCollection(name.to_string()))
    }

    pub fn rename_collection(&mut self, old_name: &str, new_name: &str) -> Result<(), CatalogError> {
        if self.collections.contains_key(new_name) {
            return Err(CatalogError::CollectionExists(new_name.to_string()));
        }
        let mut collection = self.delete_collection(old_name)?;
        collection.name = new_name.to_string();
        self.collections.insert(new_name.to_string(), collection);
        Ok(())
    }

    pub fn find_collection(&self, name: &str) -> Option<&Collection> {
        self.collections.get(name)
    }

    fn collection_mut(&mut self, name: &str) -> Result<&mut Collection, CatalogError> {
        self.collections
            .get_mut(name)
            .ok_or_else(|| CatalogError::UnknownCollection(name.to_string()))
    }

    pub fn add_field(&mut self, collection: &str, field: Field) -> Result<(), CatalogError> {
        let target = self.collection_mut(collection)?;
        if target.field(&field.name).is_some() {
            return Err(CatalogError::FieldExists {
                collection: collection.to_string(),
                field: field.name,
            });
        }
        target.fields.push(field);
        Ok(())
    }

    /// Removes a field, returning its definition.
    pub fn remove_field(&mut self, collection: &str, field_name: &str) -> Result<Field, CatalogError> {
        let target = self.collection_mut(collection)?;
        let position = target
            .fields
            .iter()
            .position(|f| f.name == field_name)
            .ok_or_else(|| CatalogError::UnknownField {
                collection: collection.to_string(),
                field: field_name.to_string(),
            })?;
        Ok(target.fields.remove(position))
    }

    pub fn rename_field(
        &mut self,
        collection: &str,
        old_name: &str,
        new_name: &str,
    ) -> Result<(), CatalogError> {
        let target = self.collection_mut(collection)?;
        if target.field(new_name).is_some() {
            return Err(CatalogError::FieldExists {
                collection: collection.to_string(),
                field: new_name.to_string(),
            });
        }
        let field = target
            .fields
            .iter_mut()
            .find(|f| f.name == old_name)
            .ok_or_else(|| CatalogError::UnknownField {
                collection: collection.to_string(),
                field: old_name.to_string(),
            })?;
        field.name = new_name.to_string();
        Ok(())
    }

    pub fn add_index(&mut self, collection: &str, index: &str) -> Result<(), CatalogError> {
        let target = self.collection_mut(collection)?;
        if target.indexes.iter().any(|i| i == index) {
            return Err(CatalogError::IndexExists {
                collection: collection.to_string(),
                index: index.to_string(),
            });
        }
        target.indexes.push(index.to_string());
        Ok(())
    }

    pub fn remove_index(&mut self, collection: &str, index: &str) -> Result<(), CatalogError> {
        let target = self.collection_mut(collection)?;
        let position = target
            .indexes
            .iter()
            .position(|i| i == index)
            .ok_or_else(|| CatalogError::UnknownIndex {
                collection: collection.to_string(),
                index: index.to_string(),
            })?;
        target.indexes.remove(position);
        Ok(())
    }

    pub fn set_rule(
        &mut self,
        collection: &str,
        op: RuleOp,
        rule: Option<String>,
    ) -> Result<(), CatalogError> {
        let target = self.collection_mut(collection)?;
        target.rules.set(op, rule);
        Ok(())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.collections.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.collections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collections.is_empty()
    }
}
