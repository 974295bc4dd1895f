mod collection;
mod field;
mod index;
mod rules;

pub use collection::{CreateCollection, DeleteCollection, RenameCollection};
pub use field::{AddField, RemoveField, RenameField};
pub use index::{AddIndex, RemoveIndex};
pub use rules::SetRule;

use crate::catalog::{CatalogError, CatalogState};

/// One reversible schema change, expressed as a pure transformation of
/// `CatalogState`.
pub trait Operation: Send + Sync {
    fn apply(&self, catalog: &mut CatalogState) -> Result<(), CatalogError>;

    /// Undo this operation. Returns `None` when the operation does not
    /// carry enough information to be reversed.
    fn revert(&self, catalog: &mut CatalogState) -> Option<Result<(), CatalogError>>;

    fn describe(&self) -> String;

    fn is_reversible(&self) -> bool {
        true
    }
}
