use crate::catalog::{CatalogError, CatalogState};
use crate::collection::RuleOp;
use crate::operation::Operation;

/// Sets one access rule on a collection. `None` clears the rule back to
/// unrestricted. Reversible only when the previous rule is recorded via
/// `with_previous`.
#[derive(Debug, Clone)]
pub struct SetRule {
    pub collection: String,
    pub op: RuleOp,
    pub rule: Option<String>,
    pub previous: Option<Option<String>>,
}

impl SetRule {
    pub fn new(collection: impl Into<String>, op: RuleOp, rule: Option<String>) -> Self {
        Self {
            collection: collection.into(),
            op,
            rule,
            previous: None,
        }
    }

    pub fn with_previous(mut self, previous: Option<String>) -> Self {
        self.previous = Some(previous);
        self
    }
}

impl Operation for SetRule {
    fn apply(&self, catalog: &mut CatalogState) -> Result<(), CatalogError> {
        catalog.set_rule(&self.collection, self.op, self.rule.clone())
    }

    fn revert(&self, catalog: &mut CatalogState) -> Option<Result<(), CatalogError>> {
        self.previous
            .as_ref()
            .map(|previous| catalog.set_rule(&self.collection, self.op, previous.clone()))
    }

    fn describe(&self) -> String {
        match &self.rule {
            Some(rule) => format!(
                "Set {} rule on {} to {:?}",
                self.op.as_str(),
                self.collection,
                rule
            ),
            None => format!("Clear {} rule on {}", self.op.as_str(), self.collection),
        }
    }

    fn is_reversible(&self) -> bool {
        self.previous.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::Collection;

    fn catalog_with_market_data() -> CatalogState {
        let mut catalog = CatalogState::new();
        catalog
            .create_collection(Collection::new("market_data"))
            .unwrap();
        catalog
    }

    #[test]
    fn set_rule_applies() {
        let op = SetRule::new(
            "market_data",
            RuleOp::List,
            Some("@request.auth.id != ''".to_string()),
        );
        let mut catalog = catalog_with_market_data();

        op.apply(&mut catalog).unwrap();
        assert_eq!(
            catalog
                .find_collection("market_data")
                .unwrap()
                .rules
                .get(RuleOp::List),
            Some("@request.auth.id != ''")
        );
    }

    #[test]
    fn set_rule_without_previous_not_reversible() {
        let op = SetRule::new("market_data", RuleOp::List, None);
        assert!(!op.is_reversible());

        let mut catalog = catalog_with_market_data();
        assert!(op.revert(&mut catalog).is_none());
    }

    #[test]
    fn set_rule_with_previous_round_trips() {
        let op = SetRule::new(
            "market_data",
            RuleOp::Delete,
            Some("@request.auth.id != ''".to_string()),
        )
        .with_previous(None);

        let mut catalog = catalog_with_market_data();
        op.apply(&mut catalog).unwrap();
        op.revert(&mut catalog).unwrap().unwrap();

        assert_eq!(
            catalog
                .find_collection("market_data")
                .unwrap()
                .rules
                .get(RuleOp::Delete),
            None
        );
    }

    #[test]
    fn describe_distinguishes_set_and_clear() {
        let set = SetRule::new("market_data", RuleOp::View, Some("x = 1".to_string()));
        assert_eq!(set.describe(), "Set view rule on market_data to \"x = 1\"");

        let clear = SetRule::new("market_data", RuleOp::View, None);
        assert_eq!(clear.describe(), "Clear view rule on market_data");
    }
}
