//! Material inventory store with pluggable relational and document persistence.
//!
//! # Examples
//!
//! Direct use of [`core::store::MaterialStore`] over an in-memory document:
//! ```
//! use stockwatch::{
//!     core::store::MaterialStore,
//!     material::MaterialDraft,
//!     persist::document::{DocumentBackend, MemoryBlobStore},
//! };
//!
//! let mut store = MaterialStore::new(DocumentBackend::new(MemoryBlobStore::new()));
//! store.initialize().expect("initialize");
//! let id = store.create(MaterialDraft {
//!     name: "Paper".to_string(),
//!     quantity: 5,
//!     minimum_quantity: 10,
//!     ..MaterialDraft::default()
//! }).expect("create");
//! assert_eq!(store.low_stock().expect("low stock")[0].id, id);
//!
//! store.set_quantity(id, 11).expect("restock");
//! assert!(store.low_stock().expect("low stock").is_empty());
//! ```
//!
//! Runtime usage with a SQLite table:
//! ```no_run
//! use stockwatch::{
//!     config::{open_store, StorageConfig},
//!     material::MaterialDraft,
//!     runtime::handle::{spawn_inventory, RuntimeConfig},
//! };
//!
//! # #[tokio::main]
//! # async fn main() {
//! let store = open_store(&StorageConfig::Sqlite { path: "materials.db".into() }).expect("open");
//! let handle = spawn_inventory(store, RuntimeConfig::default()).expect("spawn");
//! let id = handle.create(MaterialDraft::named("Gloves")).await.expect("create");
//! handle.increment(id).await.expect("increment");
//! handle.shutdown().await.expect("shutdown");
//! # }
//! ```
#![warn(missing_docs)]

/// Layered configuration and backend selection.
pub mod config;
/// Authoritative store and validation rules.
pub mod core;
/// Material records and drafts.
pub mod material;
/// Storage adapter trait with SQLite and document implementations.
pub mod persist;
/// Low-stock alert policy.
pub mod policy;
/// Single-writer runtime handle and events.
pub mod runtime;
/// Tracing subscriber setup.
pub mod telemetry;
/// Shared identifiers, timestamps, and defaults.
pub mod types;
