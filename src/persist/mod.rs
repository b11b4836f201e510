//! Storage adapters behind the material store.

/// Flat-document adapter over a blob store.
pub mod document;
/// Relational adapter over SQLite.
pub mod sqlite;

use thiserror::Error;

use crate::{
    material::Material,
    types::{MaterialId, Timestamp},
};

/// Failure inside a storage adapter.
#[derive(Debug, Error)]
pub enum PersistError {
    /// SQLite statement or connection failure.
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// Document encode or decode failure.
    #[error("serde: {0}")]
    Serde(#[from] serde_json::Error),
    /// Filesystem failure.
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    /// Any other adapter failure.
    #[error("{0}")]
    Message(String),
}

/// Result alias for adapter calls.
pub type PersistResult<T> = Result<T, PersistError>;

/// Storage adapter behind [`crate::core::store::MaterialStore`].
///
/// Mutators return `Ok(false)` when no record carries the id. A mutator that returns
/// `Err` must leave the previously persisted collection intact.
pub trait MaterialBackend: Send {
    /// Creates the empty collection if absent. Must be idempotent.
    fn initialize(&mut self) -> PersistResult<()>;
    /// Every persisted record, in no particular order.
    fn load_all(&self) -> PersistResult<Vec<Material>>;
    /// The record with `id`, if any.
    fn get(&self, id: MaterialId) -> PersistResult<Option<Material>> {
        Ok(self.load_all()?.into_iter().find(|m| m.id == id))
    }
    /// Adds a new record.
    fn insert(&mut self, material: &Material) -> PersistResult<()>;
    /// Overwrites every field of the record with `material.id`.
    fn update(&mut self, material: &Material) -> PersistResult<bool>;
    /// Deletes the record with `id`.
    fn delete(&mut self, id: MaterialId) -> PersistResult<bool>;
    /// Writes `quantity` and `updated_at` on the record with `id`.
    fn set_quantity(
        &mut self,
        id: MaterialId,
        quantity: i64,
        updated_at: Timestamp,
    ) -> PersistResult<bool>;
}

impl<B: MaterialBackend + ?Sized> MaterialBackend for Box<B> {
    fn initialize(&mut self) -> PersistResult<()> {
        (**self).initialize()
    }

    fn load_all(&self) -> PersistResult<Vec<Material>> {
        (**self).load_all()
    }

    fn get(&self, id: MaterialId) -> PersistResult<Option<Material>> {
        (**self).get(id)
    }

    fn insert(&mut self, material: &Material) -> PersistResult<()> {
        (**self).insert(material)
    }

    fn update(&mut self, material: &Material) -> PersistResult<bool> {
        (**self).update(material)
    }

    fn delete(&mut self, id: MaterialId) -> PersistResult<bool> {
        (**self).delete(id)
    }

    fn set_quantity(
        &mut self,
        id: MaterialId,
        quantity: i64,
        updated_at: Timestamp,
    ) -> PersistResult<bool> {
        (**self).set_quantity(id, quantity, updated_at)
    }
}
