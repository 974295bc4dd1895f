use crate::catalog::{CatalogError, CatalogState};
use crate::field::Field;
use crate::operation::Operation;

#[derive(Debug, Clone)]
pub struct AddField {
    pub collection: String,
    pub field: Field,
}

impl AddField {
    pub fn new(collection: impl Into<String>, field: Field) -> Self {
        Self {
            collection: collection.into(),
            field,
        }
    }
}

impl Operation for AddField {
    fn apply(&self, catalog: &mut CatalogState) -> Result<(), CatalogError> {
        catalog.add_field(&self.collection, self.field.clone())
    }

    fn revert(&self, catalog: &mut CatalogState) -> Option<Result<(), CatalogError>> {
        Some(
            catalog
                .remove_field(&self.collection, &self.field.name)
                .map(|_| ()),
        )
    }

    fn describe(&self) -> String {
        format!("Add field {} to {}", self.field.name, self.collection)
    }
}

#[derive(Debug, Clone)]
pub struct RemoveField {
    pub collection: String,
    pub field_name: String,
    pub field: Option<Field>,
}

impl RemoveField {
    pub fn new(collection: impl Into<String>, field_name: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            field_name: field_name.into(),
            field: None,
        }
    }

    /// Supplying the removed definition makes this operation reversible.
    pub fn with_definition(mut self, field: Field) -> Self {
        self.field = Some(field);
        self
    }
}

impl Operation for RemoveField {
    fn apply(&self, catalog: &mut CatalogState) -> Result<(), CatalogError> {
        catalog
            .remove_field(&self.collection, &self.field_name)
            .map(|_| ())
    }

    fn revert(&self, catalog: &mut CatalogState) -> Option<Result<(), CatalogError>> {
        self.field
            .as_ref()
            .map(|field| catalog.add_field(&self.collection, field.clone()))
    }

    fn describe(&self) -> String {
        format!("Remove field {} from {}", self.field_name, self.collection)
    }

    fn is_reversible(&self) -> bool {
        self.field.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct RenameField {
    pub collection: String,
    pub old_name: String,
    pub new_name: String,
}

impl RenameField {
    pub fn new(
        collection: impl Into<String>,
        old_name: impl Into<String>,
        new_name: impl Into<String>,
    ) -> Self {
        Self {
            collection: collection.into(),
            old_name: old_name.into(),
            new_name: new_name.into(),
        }
    }
}

impl Operation for RenameField {
    fn apply(&self, catalog: &mut CatalogState) -> Result<(), CatalogError> {
        catalog.rename_field(&self.collection, &self.old_name, &self.new_name)
    }

    fn revert(&self, catalog: &mut CatalogState) -> Option<Result<(), CatalogError>> {
        Some(catalog.rename_field(&self.collection, &self.new_name, &self.old_name))
    }

    fn describe(&self) -> String {
        format!(
            "Rename field {} to {} on {}",
            self.old_name, self.new_name, self.collection
        )
    }
}
