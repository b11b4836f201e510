//! Material record and draft types.

use serde::{Deserialize, Serialize};

use crate::types::{
    DEFAULT_MINIMUM_QUANTITY, DEFAULT_UNIT, MaterialId, Timestamp, timestamp_format,
    truncate_timestamp,
};

/// Fully materialized, persisted material record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Material {
    /// Store-assigned identifier.
    pub id: MaterialId,
    /// Display name; non-empty after trimming.
    pub name: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Units currently in stock.
    #[serde(default)]
    pub quantity: i64,
    /// Low-stock threshold.
    #[serde(default = "default_minimum_quantity")]
    pub minimum_quantity: i64,
    /// Unit symbol.
    #[serde(default = "default_unit")]
    pub unit: String,
    /// Free-form category label.
    #[serde(default)]
    pub category: String,
    /// Creation instant, never changed afterwards.
    #[serde(with = "timestamp_format")]
    pub created_at: Timestamp,
    /// Instant of the latest successful mutation.
    #[serde(with = "timestamp_format")]
    pub updated_at: Timestamp,
}

impl Material {
    /// Materializes a draft with the given identity and stamp.
    ///
    /// The stamp is truncated to microseconds, the precision every backend persists.
    pub fn from_draft(id: MaterialId, draft: MaterialDraft, stamp: Timestamp) -> Self {
        let stamp = truncate_timestamp(stamp);
        Self {
            id,
            name: draft.name,
            description: draft.description,
            quantity: draft.quantity,
            minimum_quantity: draft.minimum_quantity,
            unit: draft.unit,
            category: draft.category,
            created_at: stamp,
            updated_at: stamp,
        }
    }

    /// Returns the mutable fields as a draft.
    pub fn to_draft(&self) -> MaterialDraft {
        MaterialDraft {
            name: self.name.clone(),
            description: self.description.clone(),
            quantity: self.quantity,
            minimum_quantity: self.minimum_quantity,
            unit: self.unit.clone(),
            category: self.category.clone(),
        }
    }

    /// True when stock is at or below the threshold.
    pub fn is_low_stock(&self) -> bool {
        crate::policy::is_low_stock(self.quantity, self.minimum_quantity)
    }
}

/// Creation payload: a material without identity or timestamps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MaterialDraft {
    /// Display name.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// Initial stock.
    pub quantity: i64,
    /// Low-stock threshold.
    pub minimum_quantity: i64,
    /// Unit symbol.
    pub unit: String,
    /// Free-form category label.
    pub category: String,
}

impl MaterialDraft {
    /// Draft named `name` with every other field at its default.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

impl Default for MaterialDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            quantity: 0,
            minimum_quantity: DEFAULT_MINIMUM_QUANTITY,
            unit: DEFAULT_UNIT.to_string(),
            category: String::new(),
        }
    }
}

fn default_minimum_quantity() -> i64 {
    DEFAULT_MINIMUM_QUANTITY
}

fn default_unit() -> String {
    DEFAULT_UNIT.to_string()
}
