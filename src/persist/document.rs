//! Flat-document adapter: the whole collection is one JSON blob under a key.
//!
//! Every mutation reads the document, edits it in memory, and writes it back in one
//! [`BlobStore::put`]. Atomicity of that put is the blob store's job; [`FileBlobStore`]
//! writes a temp file in the same directory and renames it over the target.

use std::{
    fs,
    io::{ErrorKind, Write},
    path::PathBuf,
};

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::{
    material::Material,
    types::{DEFAULT_DOCUMENT_KEY, MaterialId, Timestamp},
};

use super::{MaterialBackend, PersistError, PersistResult};

const DOCUMENT_FORMAT_VERSION: u16 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct DocumentEnvelope {
    format_version: u16,
    materials: Vec<Material>,
}

/// Key-value byte storage holding whole documents.
pub trait BlobStore: Send {
    /// Current value under `key`, `None` when never written.
    fn get(&self, key: &str) -> PersistResult<Option<Vec<u8>>>;
    /// Replaces the value under `key`. On error the previous value must survive.
    fn put(&mut self, key: &str, bytes: &[u8]) -> PersistResult<()>;
}

/// One `<key>.json` file per key inside a root directory.
#[derive(Debug, Clone)]
pub struct FileBlobStore {
    root: PathBuf,
}

impl FileBlobStore {
    /// Uses `root`, creating the directory if needed.
    pub fn open(root: impl Into<PathBuf>) -> PersistResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Path of the file backing `key`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }
}

impl BlobStore for FileBlobStore {
    fn get(&self, key: &str) -> PersistResult<Option<Vec<u8>>> {
        match fs::read(self.path_for(key)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn put(&mut self, key: &str, bytes: &[u8]) -> PersistResult<()> {
        let mut tmp = NamedTempFile::new_in(&self.root)?;
        tmp.write_all(bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(self.path_for(key))
            .map_err(|e| PersistError::Io(e.error))?;
        sync_dir(&self.root)?;
        Ok(())
    }
}

// The rename is only durable once the directory entry is.
#[cfg(unix)]
fn sync_dir(dir: &std::path::Path) -> PersistResult<()> {
    fs::File::open(dir)?.sync_all()?;
    Ok(())
}

#[cfg(not(unix))]
fn sync_dir(_dir: &std::path::Path) -> PersistResult<()> {
    Ok(())
}

/// Process-local blob store.
#[derive(Debug, Clone, Default)]
pub struct MemoryBlobStore {
    entries: HashMap<String, Vec<u8>>,
}

impl MemoryBlobStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl BlobStore for MemoryBlobStore {
    fn get(&self, key: &str) -> PersistResult<Option<Vec<u8>>> {
        Ok(self.entries.get(key).cloned())
    }

    fn put(&mut self, key: &str, bytes: &[u8]) -> PersistResult<()> {
        self.entries.insert(key.to_string(), bytes.to_vec());
        Ok(())
    }
}

/// Document implementation of [`crate::persist::MaterialBackend`].
pub struct DocumentBackend<S> {
    blobs: S,
    key: String,
}

impl<S: BlobStore> DocumentBackend<S> {
    /// Keeps the collection under [`DEFAULT_DOCUMENT_KEY`].
    pub fn new(blobs: S) -> Self {
        Self::with_key(blobs, DEFAULT_DOCUMENT_KEY)
    }

    /// Keeps the collection under `key`.
    pub fn with_key(blobs: S, key: impl Into<String>) -> Self {
        Self {
            blobs,
            key: key.into(),
        }
    }

    /// Underlying blob store.
    pub fn blobs(&self) -> &S {
        &self.blobs
    }

    fn read(&self) -> PersistResult<Vec<Material>> {
        let Some(bytes) = self.blobs.get(&self.key)? else {
            return Ok(Vec::new());
        };
        decode_document(&bytes)
    }

    fn write(&mut self, materials: Vec<Material>) -> PersistResult<()> {
        let env = DocumentEnvelope {
            format_version: DOCUMENT_FORMAT_VERSION,
            materials,
        };
        let bytes = serde_json::to_vec(&env)?;
        self.blobs.put(&self.key, &bytes)
    }

    fn modify<F>(&mut self, id: MaterialId, edit: F) -> PersistResult<bool>
    where
        F: FnOnce(&mut Material),
    {
        let mut materials = self.read()?;
        let Some(slot) = materials.iter_mut().find(|m| m.id == id) else {
            return Ok(false);
        };
        edit(slot);
        self.write(materials)?;
        Ok(true)
    }
}

impl<S: BlobStore> MaterialBackend for DocumentBackend<S> {
    fn initialize(&mut self) -> PersistResult<()> {
        match self.blobs.get(&self.key)? {
            Some(bytes) => decode_document(&bytes).map(|_| ()),
            None => self.write(Vec::new()),
        }
    }

    fn load_all(&self) -> PersistResult<Vec<Material>> {
        self.read()
    }

    fn insert(&mut self, material: &Material) -> PersistResult<()> {
        let mut materials = self.read()?;
        if materials.iter().any(|m| m.id == material.id) {
            return Err(PersistError::Message(format!(
                "duplicate material id {}",
                material.id
            )));
        }
        materials.push(material.clone());
        self.write(materials)
    }

    fn update(&mut self, material: &Material) -> PersistResult<bool> {
        self.modify(material.id, |slot| {
            let created_at = slot.created_at;
            *slot = material.clone();
            slot.created_at = created_at;
        })
    }

    fn delete(&mut self, id: MaterialId) -> PersistResult<bool> {
        let mut materials = self.read()?;
        let before = materials.len();
        materials.retain(|m| m.id != id);
        if materials.len() == before {
            return Ok(false);
        }
        self.write(materials)?;
        Ok(true)
    }

    fn set_quantity(
        &mut self,
        id: MaterialId,
        quantity: i64,
        updated_at: Timestamp,
    ) -> PersistResult<bool> {
        self.modify(id, |slot| {
            slot.quantity = quantity;
            slot.updated_at = updated_at;
        })
    }
}

fn decode_document(bytes: &[u8]) -> PersistResult<Vec<Material>> {
    let env: DocumentEnvelope = serde_json::from_slice(bytes)?;
    if env.format_version != DOCUMENT_FORMAT_VERSION {
        return Err(PersistError::Message(format!(
            "unsupported document format version: {}",
            env.format_version
        )));
    }
    Ok(env.materials)
}
