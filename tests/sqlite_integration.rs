#![cfg(feature = "sqlite")]

use cadastre::prelude::*;
use rusqlite::Connection;

fn market_data_registry() -> MigrationRegistry {
    let mut registry = MigrationRegistry::new();

    registry
        .register(
            Migration::new("1739788064_created_market_data").operation(
                CreateCollection::new("market_data")
                    .field("contract_id", FieldType::number())
                    .field("is_snapshot", FieldType::Bool)
                    .field("corrections", FieldType::json(2_000_000))
                    .field("market_values", FieldType::json(2_000_000))
                    .field("trades", FieldType::json(2_000_000))
                    .field("timestamp", FieldType::date()),
            ),
        )
        .unwrap();

    registry
        .register(
            Migration::new("1739800000_add_contract_index").operation(AddIndex::new(
                "market_data",
                "idx_market_data_contract_id",
            )),
        )
        .unwrap();

    registry
}

#[test]
fn apply_and_revert_against_sqlite() {
    let conn = Connection::open_in_memory().unwrap();
    let registry = market_data_registry();

    let store = SqliteStore::new(&conn).unwrap();
    let mut runner = Runner::new(&registry, store);

    let applied = runner.apply_all().unwrap();
    assert_eq!(applied.len(), 2);

    let catalog = runner.store_mut().load_catalog().unwrap();
    let collection = catalog.find_collection("market_data").unwrap();
    assert_eq!(collection.fields.len(), 6);
    assert_eq!(collection.indexes, vec!["idx_market_data_contract_id"]);

    let name = runner.revert_last().unwrap();
    assert_eq!(name, "1739800000_add_contract_index");

    let catalog = runner.store_mut().load_catalog().unwrap();
    assert!(catalog
        .find_collection("market_data")
        .unwrap()
        .indexes
        .is_empty());
}

#[test]
fn rerun_against_sqlite_is_a_no_op() {
    let conn = Connection::open_in_memory().unwrap();
    let registry = market_data_registry();

    {
        let store = SqliteStore::new(&conn).unwrap();
        let mut runner = Runner::new(&registry, store);
        runner.apply_all().unwrap();
    }

    // Second runner over the same database applies nothing.
    let store = SqliteStore::new(&conn).unwrap();
    let mut runner = Runner::new(&registry, store);
    assert!(runner.apply_all().unwrap().is_empty());

    let catalog = runner.store_mut().load_catalog().unwrap();
    assert_eq!(catalog.len(), 1);
}

#[test]
fn lock_row_blocks_second_runner() {
    let conn = Connection::open_in_memory().unwrap();
    let registry = market_data_registry();

    let mut holder = SqliteStore::new(&conn).unwrap();
    holder.try_lock().unwrap();

    let store = SqliteStore::new(&conn).unwrap();
    let mut runner = Runner::new(&registry, store);
    assert_eq!(runner.apply_all(), Err(MigrationError::LockContention));

    holder.unlock().unwrap();
    assert_eq!(runner.apply_all().unwrap().len(), 2);
}
