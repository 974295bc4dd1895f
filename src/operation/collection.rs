use crate::catalog::{CatalogError, CatalogState};
use crate::collection::{AccessRules, Collection};
use crate::field::{Field, FieldType};
use crate::operation::Operation;

#[derive(Debug, Clone)]
pub struct CreateCollection {
    pub collection: Collection,
}

impl CreateCollection {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            collection: Collection::new(name),
        }
    }

    pub fn from_definition(collection: Collection) -> Self {
        Self { collection }
    }

    pub fn field(mut self, name: impl Into<String>, field_type: FieldType) -> Self {
        self.collection.fields.push(Field::new(name, field_type));
        self
    }

    pub fn add_field(mut self, field: Field) -> Self {
        self.collection.fields.push(field);
        self
    }

    pub fn add_index(mut self, index: impl Into<String>) -> Self {
        self.collection.indexes.push(index.into());
        self
    }

    pub fn rules(mut self, rules: AccessRules) -> Self {
        self.collection.rules = rules;
        self
    }
}

impl Operation for CreateCollection {
    fn apply(&self, catalog: &mut CatalogState) -> Result<(), CatalogError> {
        catalog.create_collection(self.collection.clone())
    }

    fn revert(&self, catalog: &mut CatalogState) -> Option<Result<(), CatalogError>> {
        Some(catalog.delete_collection(&self.collection.name).map(|_| ()))
    }

    fn describe(&self) -> String {
        format!("Create collection {}", self.collection.name)
    }
}

#[derive(Debug, Clone)]
pub struct DeleteCollection {
    pub name: String,
    pub definition: Option<Collection>,
}

impl DeleteCollection {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            definition: None,
        }
    }

    /// Supplying the deleted definition makes this operation reversible.
    pub fn with_definition(mut self, definition: Collection) -> Self {
        self.definition = Some(definition);
        self
    }
}

impl Operation for DeleteCollection {
    fn apply(&self, catalog: &mut CatalogState) -> Result<(), CatalogError> {
        catalog.delete_collection(&self.name).map(|_| ())
    }

    fn revert(&self, catalog: &mut CatalogState) -> Option<Result<(), CatalogError>> {
        self.definition
            .as_ref()
            .map(|definition| catalog.create_collection(definition.clone()))
    }

    fn describe(&self) -> String {
        format!("Delete collection {}", self.name)
    }

    fn is_reversible(&self) -> bool {
        self.definition.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct RenameCollection {
    pub old_name: String,
    pub new_name: String,
}

impl RenameCollection {
    pub fn new(old_name: impl Into<String>, new_name: impl Into<String>) -> Self {
        Self {
            old_name: old_name.into(),
            new_name: new_name.into(),
        }
    }
}

impl Operation for RenameCollection {
    fn apply(&self, catalog: &mut CatalogState) -> Result<(), CatalogError> {
        catalog.rename_collection(&self.old_name, &self.new_name)
    }

    fn revert(&self, catalog: &mut CatalogState) -> Option<Result<(), CatalogError>> {
        Some(catalog.rename_collection(&self.new_name, &self.old_name))
    }

    fn describe(&self) -> String {
        format!("Rename collection {} to {}", self.old_name, self.new_name)
    }
}
