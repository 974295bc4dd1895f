pub mod catalog;
pub mod cli;
pub mod collection;
pub mod field;
pub mod migration;
pub mod operation;
pub mod runner;
pub mod store;

pub mod prelude {
    pub use crate::catalog::{CatalogError, CatalogState};
    pub use crate::cli::{Cli, Command};
    pub use crate::collection::{AccessRules, Collection, RuleOp};
    pub use crate::field::{Field, FieldType};
    pub use crate::migration::{Migration, MigrationError, MigrationRegistry};
    pub use crate::operation::{
        AddField, AddIndex, CreateCollection, DeleteCollection, Operation, RemoveField,
        RemoveIndex, RenameCollection, RenameField, SetRule,
    };
    pub use crate::runner::Runner;
    pub use crate::store::{CatalogStore, JsonFileStore, MemoryStore};

    #[cfg(feature = "sqlite")]
    pub use crate::store::SqliteStore;
}
