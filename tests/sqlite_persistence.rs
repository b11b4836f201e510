use tempfile::TempDir;

use stockwatch::{
    config::{StorageConfig, open_store},
    core::store::{MaterialStore, StoreError},
    material::MaterialDraft,
    persist::sqlite::SqliteBackend,
};

fn draft(name: &str, quantity: i64) -> MaterialDraft {
    MaterialDraft {
        name: name.to_string(),
        description: "shelf B".to_string(),
        quantity,
        minimum_quantity: 2,
        unit: "box".to_string(),
        category: "packaging".to_string(),
    }
}

#[test]
fn reopened_database_round_trips_every_field() {
    let tmp = TempDir::new().expect("tmp");
    let db_path = tmp.path().join("materials.db");

    let mut store = MaterialStore::new(SqliteBackend::open(&db_path).expect("open"));
    store.initialize().expect("initialize");
    let a = store.create(draft("Bubble wrap", 3)).expect("create a");
    let b = store.create(draft("Cartons", 0)).expect("create b");
    store.set_quantity(a, 9).expect("set");
    store.increment(b).expect("inc");
    let expected = store.list().expect("list");
    drop(store);

    let mut reopened = MaterialStore::new(SqliteBackend::open(&db_path).expect("reopen"));
    reopened.initialize().expect("initialize again");
    assert_eq!(reopened.list().expect("list"), expected);
    assert_eq!(reopened.backend().count().expect("count"), 2);
}

#[test]
fn config_selected_sqlite_store_sees_prior_writes() {
    let tmp = TempDir::new().expect("tmp");
    let storage = StorageConfig::Sqlite {
        path: tmp.path().join("inv.db"),
    };

    let mut first = open_store(&storage).expect("open");
    let id = first.create(draft("Tape", 4)).expect("create");
    drop(first);

    let second = open_store(&storage).expect("reopen");
    assert_eq!(second.get(id).expect("get").quantity, 4);
}

#[test]
fn unopenable_path_is_storage_unavailable() {
    let tmp = TempDir::new().expect("tmp");
    let storage = StorageConfig::Sqlite {
        path: tmp.path().join("no-such-dir").join("inv.db"),
    };
    assert!(matches!(
        open_store(&storage),
        Err(StoreError::StorageUnavailable(_))
    ));
}

#[test]
fn timestamps_are_stored_as_sortable_text() {
    let tmp = TempDir::new().expect("tmp");
    let db_path = tmp.path().join("ts.db");

    let mut store = MaterialStore::new(SqliteBackend::open(&db_path).expect("open"));
    store.initialize().expect("initialize");
    let id = store.create(draft("Pallets", 1)).expect("create");
    store.increment(id).expect("inc");
    drop(store);

    let conn = rusqlite::Connection::open(&db_path).expect("raw open");
    let (created, updated): (String, String) = conn
        .query_row(
            "SELECT createdAt, updatedAt FROM materials WHERE id = ?1",
            [id.to_string()],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .expect("row");
    assert_eq!(created.len(), "2024-01-01T00:00:00.000000Z".len());
    assert!(created.ends_with('Z'));
    assert!(updated > created);
}
