use chrono::Utc;
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{
    material::{Material, MaterialDraft},
    persist::{MaterialBackend, PersistError},
    policy,
    types::{MaterialId, Timestamp, stamp_resolution, truncate_timestamp},
};

use super::validate::{ValidationError, validate_draft_fields, validate_quantity};

/// Typed failure of a store operation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Caller-correctable field problems.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// No material carries the id.
    #[error("material {0} not found")]
    NotFound(MaterialId),
    /// Storage could not be opened or read, or the store is not initialized.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(#[source] PersistError),
    /// A write failed; the previously persisted collection is intact.
    #[error("storage write failed: {0}")]
    StorageWrite(#[source] PersistError),
}

impl StoreError {
    /// True for [`StoreError::NotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// True for [`StoreError::Validation`].
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

/// Authoritative owner of the material collection.
///
/// Every operation goes through the backend; nothing is cached, so two stores over the
/// same medium observe each other's writes. Removing an unknown id is `NotFound`.
pub struct MaterialStore<B> {
    backend: B,
    initialized: bool,
    last_stamp: Option<Timestamp>,
}

impl<B: MaterialBackend> MaterialStore<B> {
    /// Wraps `backend`; call [`MaterialStore::initialize`] before anything else.
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            initialized: false,
            last_stamp: None,
        }
    }

    /// Underlying adapter.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// True once [`MaterialStore::initialize`] has succeeded.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Ensures the backing collection exists. Safe to repeat.
    pub fn initialize(&mut self) -> Result<(), StoreError> {
        self.backend.initialize().map_err(|err| {
            warn!(error = %err, "material storage initialization failed");
            StoreError::StorageUnavailable(err)
        })?;
        self.initialized = true;
        debug!("material storage ready");
        Ok(())
    }

    /// All materials sorted by name, then creation time, then id.
    pub fn list(&self) -> Result<Vec<Material>, StoreError> {
        self.ensure_initialized()?;
        let mut materials = self
            .backend
            .load_all()
            .map_err(StoreError::StorageUnavailable)?;
        materials.sort_by(|a, b| {
            a.name
                .cmp(&b.name)
                .then(a.created_at.cmp(&b.created_at))
                .then(a.id.cmp(&b.id))
        });
        Ok(materials)
    }

    /// The material with `id`.
    pub fn get(&self, id: MaterialId) -> Result<Material, StoreError> {
        self.ensure_initialized()?;
        self.backend
            .get(id)
            .map_err(StoreError::StorageUnavailable)?
            .ok_or(StoreError::NotFound(id))
    }

    /// Validates and persists a new material, returning its fresh id.
    pub fn create(&mut self, draft: MaterialDraft) -> Result<MaterialId, StoreError> {
        self.ensure_initialized()?;
        validate_draft_fields(&draft)?;

        let id = Uuid::new_v4();
        let stamp = self.next_stamp(None);
        let material = Material::from_draft(id, draft, stamp);
        self.backend.insert(&material).map_err(|err| {
            warn!(%id, error = %err, "material insert failed");
            StoreError::StorageWrite(err)
        })?;
        debug!(%id, name = %material.name, quantity = material.quantity, "material created");
        Ok(id)
    }

    /// Overwrites the mutable fields of an existing material.
    ///
    /// `created_at` and `updated_at` on the argument are ignored.
    pub fn update(&mut self, material: Material) -> Result<(), StoreError> {
        self.ensure_initialized()?;
        validate_draft_fields(&material.to_draft())?;

        let current = self.get(material.id)?;
        let stamp = self.next_stamp(Some(current.updated_at));
        let id = material.id;
        let next = Material {
            created_at: current.created_at,
            updated_at: stamp,
            ..material
        };
        let found = self.backend.update(&next).map_err(|err| {
            warn!(%id, error = %err, "material update failed");
            StoreError::StorageWrite(err)
        })?;
        if !found {
            return Err(StoreError::NotFound(id));
        }
        debug!(%id, "material updated");
        Ok(())
    }

    /// Deletes the material with `id`.
    pub fn remove(&mut self, id: MaterialId) -> Result<(), StoreError> {
        self.ensure_initialized()?;
        let found = self.backend.delete(id).map_err(|err| {
            warn!(%id, error = %err, "material delete failed");
            StoreError::StorageWrite(err)
        })?;
        if !found {
            return Err(StoreError::NotFound(id));
        }
        debug!(%id, "material removed");
        Ok(())
    }

    /// The only quantity mutator; increment and decrement go through here.
    pub fn set_quantity(&mut self, id: MaterialId, quantity: i64) -> Result<(), StoreError> {
        self.ensure_initialized()?;
        validate_quantity(quantity)?;

        let current = self.get(id)?;
        let stamp = self.next_stamp(Some(current.updated_at));
        let found = self
            .backend
            .set_quantity(id, quantity, stamp)
            .map_err(|err| {
                warn!(%id, quantity, error = %err, "quantity write failed");
                StoreError::StorageWrite(err)
            })?;
        if !found {
            return Err(StoreError::NotFound(id));
        }
        debug!(%id, from = current.quantity, to = quantity, "quantity set");
        Ok(())
    }

    /// Adds one unit and returns the new quantity.
    pub fn increment(&mut self, id: MaterialId) -> Result<i64, StoreError> {
        let next = self.get(id)?.quantity.saturating_add(1);
        self.set_quantity(id, next)?;
        Ok(next)
    }

    /// Removes one unit if any are left and returns the resulting quantity.
    ///
    /// At zero this is a no-op: nothing is written and `updated_at` does not move.
    pub fn decrement(&mut self, id: MaterialId) -> Result<i64, StoreError> {
        let current = self.get(id)?.quantity;
        if current <= 0 {
            return Ok(current);
        }
        self.set_quantity(id, current - 1)?;
        Ok(current - 1)
    }

    /// Materials at or below their minimum, in listing order.
    pub fn low_stock(&self) -> Result<Vec<Material>, StoreError> {
        Ok(policy::low_stock(&self.list()?))
    }

    fn ensure_initialized(&self) -> Result<(), StoreError> {
        if self.initialized {
            Ok(())
        } else {
            Err(StoreError::StorageUnavailable(PersistError::Message(
                "store not initialized".to_string(),
            )))
        }
    }

    // Strictly after both the previous stamp issued here and `floor`.
    fn next_stamp(&mut self, floor: Option<Timestamp>) -> Timestamp {
        let step = stamp_resolution();
        let mut stamp = truncate_timestamp(Utc::now());
        for bound in [self.last_stamp, floor].into_iter().flatten() {
            if stamp <= bound {
                stamp = bound + step;
            }
        }
        self.last_stamp = Some(stamp);
        stamp
    }
}
