use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use tempfile::TempDir;

use stockwatch::{
    core::store::{MaterialStore, StoreError},
    material::MaterialDraft,
    persist::{
        PersistError, PersistResult,
        document::{BlobStore, DocumentBackend, FileBlobStore, MemoryBlobStore},
    },
};

/// Memory blob store whose writes can be switched off.
struct FlakyBlobStore {
    inner: MemoryBlobStore,
    fail_writes: Arc<AtomicBool>,
}

impl BlobStore for FlakyBlobStore {
    fn get(&self, key: &str) -> PersistResult<Option<Vec<u8>>> {
        self.inner.get(key)
    }

    fn put(&mut self, key: &str, bytes: &[u8]) -> PersistResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(PersistError::Message("disk full".to_string()));
        }
        self.inner.put(key, bytes)
    }
}

fn draft(name: &str, quantity: i64) -> MaterialDraft {
    MaterialDraft {
        name: name.to_string(),
        quantity,
        ..MaterialDraft::default()
    }
}

#[test]
fn failed_writes_leave_previous_collection_intact() {
    let fail_writes = Arc::new(AtomicBool::new(false));
    let blobs = FlakyBlobStore {
        inner: MemoryBlobStore::new(),
        fail_writes: Arc::clone(&fail_writes),
    };
    let mut store = MaterialStore::new(DocumentBackend::new(blobs));
    store.initialize().expect("initialize");
    let id = store.create(draft("Gloves", 6)).expect("create");
    let before = store.list().expect("list");

    fail_writes.store(true, Ordering::SeqCst);
    assert!(matches!(
        store.create(draft("Masks", 1)),
        Err(StoreError::StorageWrite(_))
    ));
    assert!(matches!(store.set_quantity(id, 1), Err(StoreError::StorageWrite(_))));
    assert!(matches!(store.increment(id), Err(StoreError::StorageWrite(_))));
    assert!(matches!(store.remove(id), Err(StoreError::StorageWrite(_))));
    let mut edited = before[0].clone();
    edited.name = "Nitrile gloves".to_string();
    assert!(matches!(store.update(edited), Err(StoreError::StorageWrite(_))));
    assert_eq!(store.list().expect("list"), before);

    fail_writes.store(false, Ordering::SeqCst);
    assert_eq!(store.increment(id).expect("inc"), 7);
}

#[test]
fn file_document_survives_reopen_and_leaves_no_temp_files() {
    let tmp = TempDir::new().expect("tmp");

    let blobs = FileBlobStore::open(tmp.path()).expect("blobs");
    let mut store = MaterialStore::new(DocumentBackend::with_key(blobs, "warehouse"));
    store.initialize().expect("initialize");
    let keep = store.create(draft("Helmets", 2)).expect("create");
    let gone = store.create(draft("Vests", 5)).expect("create");
    store.remove(gone).expect("remove");
    store.decrement(keep).expect("dec");
    let expected = store.list().expect("list");
    drop(store);

    let entries: Vec<String> = std::fs::read_dir(tmp.path())
        .expect("read dir")
        .map(|e| e.expect("entry").file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(entries, vec!["warehouse.json".to_string()]);

    let blobs = FileBlobStore::open(tmp.path()).expect("blobs");
    let mut reopened = MaterialStore::new(DocumentBackend::with_key(blobs, "warehouse"));
    reopened.initialize().expect("initialize");
    assert_eq!(reopened.list().expect("list"), expected);
    assert_eq!(expected[0].quantity, 1);
}

#[test]
fn corrupt_document_is_storage_unavailable() {
    let tmp = TempDir::new().expect("tmp");
    std::fs::write(tmp.path().join("materials_db.json"), b"{not json").expect("write");

    let blobs = FileBlobStore::open(tmp.path()).expect("blobs");
    let mut store = MaterialStore::new(DocumentBackend::new(blobs));
    assert!(matches!(
        store.initialize(),
        Err(StoreError::StorageUnavailable(PersistError::Serde(_)))
    ));
}
