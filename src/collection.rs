use serde::{Deserialize, Serialize};

use crate::field::Field;

/// The record operations an access rule can gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleOp {
    List,
    View,
    Create,
    Update,
    Delete,
}

impl RuleOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleOp::List => "list",
            RuleOp::View => "view",
            RuleOp::Create => "create",
            RuleOp::Update => "update",
            RuleOp::Delete => "delete",
        }
    }
}

/// Per-operation access rules. `None` means unrestricted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccessRules {
    #[serde(default)]
    pub list: Option<String>,
    #[serde(default)]
    pub view: Option<String>,
    #[serde(default)]
    pub create: Option<String>,
    #[serde(default)]
    pub update: Option<String>,
    #[serde(default)]
    pub delete: Option<String>,
}

impl AccessRules {
    pub fn unrestricted() -> Self {
        Self::default()
    }

    pub fn get(&self, op: RuleOp) -> Option<&str> {
        match op {
            RuleOp::List => self.list.as_deref(),
            RuleOp::View => self.view.as_deref(),
            RuleOp::Create => self.create.as_deref(),
            RuleOp::Update => self.update.as_deref(),
            RuleOp::Delete => self.delete.as_deref(),
        }
    }

    pub fn set(&mut self, op: RuleOp, rule: Option<String>) {
        let slot = match op {
            RuleOp::List => &mut self.list,
            RuleOp::View => &mut self.view,
            RuleOp::Create => &mut self.create,
            RuleOp::Update => &mut self.update,
            RuleOp::Delete => &mut self.delete,
        };
        *slot = rule;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<Field>,
    /// Named secondary indexes over this collection's records.
    #[serde(default)]
    pub indexes: Vec<String>,
    #[serde(default)]
    pub rules: AccessRules,
}

impl Collection {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            indexes: Vec::new(),
            rules: AccessRules::unrestricted(),
        }
    }

    pub fn add_field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    pub fn add_index(mut self, index: impl Into<String>) -> Self {
        self.indexes.push(index.into());
        self
    }

    pub fn rules(mut self, rules: AccessRules) -> Self {
        self.rules = rules;
        self
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldType;

    #[test]
    fn collection_builder() {
        let collection = Collection::new("market_data")
            .add_field(Field::new("contract_id", FieldType::number()))
            .add_field(Field::new("is_snapshot", FieldType::Bool))
            .add_index("idx_contract_id");

        assert_eq!(collection.name, "market_data");
        assert_eq!(collection.fields.len(), 2);
        assert_eq!(collection.indexes, vec!["idx_contract_id"]);
        assert_eq!(collection.rules, AccessRules::unrestricted());
    }

    #[test]
    fn field_lookup_by_name() {
        let collection =
            Collection::new("market_data").add_field(Field::new("trades", FieldType::json(1024)));

        assert!(collection.field("trades").is_some());
        assert!(collection.field("missing").is_none());
    }

    #[test]
    fn rules_get_and_set() {
        let mut rules = AccessRules::unrestricted();
        assert_eq!(rules.get(RuleOp::List), None);

        rules.set(RuleOp::List, Some("@request.auth.id != ''".to_string()));
        assert_eq!(rules.get(RuleOp::List), Some("@request.auth.id != ''"));

        rules.set(RuleOp::List, None);
        assert_eq!(rules.get(RuleOp::List), None);
    }

    #[test]
    fn rule_op_names() {
        assert_eq!(RuleOp::List.as_str(), "list");
        assert_eq!(RuleOp::View.as_str(), "view");
        assert_eq!(RuleOp::Create.as_str(), "create");
        assert_eq!(RuleOp::Update.as_str(), "update");
        assert_eq!(RuleOp::Delete.as_str(), "delete");
    }

    #[test]
    fn collection_serde_round_trip() {
        let collection = Collection::new("market_data")
            .add_field(Field::new("timestamp", FieldType::date()))
            .add_index("idx_timestamp");

        let json = serde_json::to_string(&collection).unwrap();
        let back: Collection = serde_json::from_str(&json).unwrap();
        assert_eq!(back, collection);
    }

    #[test]
    fn collection_deserializes_with_defaults() {
        let collection: Collection = serde_json::from_str("{\"name\":\"events\"}").unwrap();

        assert_eq!(collection.name, "events");
        assert!(collection.fields.is_empty());
        assert!(collection.indexes.is_empty());
        assert_eq!(collection.rules, AccessRules::unrestricted());
    }
}
