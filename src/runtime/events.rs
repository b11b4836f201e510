//! Runtime event stream payloads.

use crate::types::MaterialId;

/// Mutation notices emitted by the writer after each successful change.
///
/// Low-stock membership is not pushed; subscribers re-evaluate it themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MaterialEvent {
    /// A material was created.
    Created {
        /// New material id.
        id: MaterialId,
    },
    /// A material's fields were overwritten.
    Updated {
        /// Updated material id.
        id: MaterialId,
    },
    /// A material's quantity was written.
    QuantityChanged {
        /// Material id.
        id: MaterialId,
        /// Quantity after the write.
        quantity: i64,
    },
    /// A material was deleted.
    Removed {
        /// Deleted material id.
        id: MaterialId,
    },
}
