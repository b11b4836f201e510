//! Layered configuration and backend selection.
//!
//! Sources, later ones winning: built-in defaults, an optional TOML file, then
//! `STOCKWATCH_`-prefixed environment variables with `__` separating nested keys
//! (`STOCKWATCH_STORAGE__BACKEND=document`).

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    core::store::{MaterialStore, StoreError},
    persist::{
        MaterialBackend,
        document::{DocumentBackend, FileBlobStore, MemoryBlobStore},
        sqlite::SqliteBackend,
    },
    runtime::handle::RuntimeConfig,
    types::DEFAULT_DOCUMENT_KEY,
};

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "STOCKWATCH_";

/// Configuration could not be assembled.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A source failed to parse or the merged value did not fit.
    #[error("failed to load config: {0}")]
    Load(#[from] Box<figment::Error>),
}

/// Which adapter backs the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "snake_case")]
pub enum StorageConfig {
    /// Relational table in a SQLite file.
    Sqlite {
        /// Database file.
        path: PathBuf,
    },
    /// One JSON document in a directory.
    Document {
        /// Directory holding `<key>.json`.
        dir: PathBuf,
        /// Document key.
        #[serde(default = "default_document_key")]
        key: String,
    },
    /// Process-local document, lost on exit.
    Memory,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::Sqlite {
            path: PathBuf::from("materials.db"),
        }
    }
}

fn default_document_key() -> String {
    DEFAULT_DOCUMENT_KEY.to_string()
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub log_level: String,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json: false,
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InventoryConfig {
    /// Backend selection.
    pub storage: StorageConfig,
    /// Writer runtime tuning.
    pub runtime: RuntimeConfig,
    /// Logging.
    pub telemetry: TelemetryConfig,
}

impl InventoryConfig {
    /// Loads defaults, then `file` if given and present, then the environment.
    pub fn load(file: Option<&Path>) -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(file) = file {
            figment = figment.merge(Toml::file(file));
        }
        Self::extract(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    /// Parses a TOML string over the defaults, ignoring the environment.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        Self::extract(Figment::from(Serialized::defaults(Self::default())).merge(Toml::string(raw)))
    }

    fn extract(figment: Figment) -> Result<Self, ConfigError> {
        figment.extract().map_err(|e| ConfigError::Load(Box::new(e)))
    }
}

/// Builds the configured backend. The store still needs [`MaterialStore::initialize`].
pub fn open_backend(storage: &StorageConfig) -> Result<Box<dyn MaterialBackend>, StoreError> {
    let backend: Box<dyn MaterialBackend> = match storage {
        StorageConfig::Sqlite { path } => Box::new(
            SqliteBackend::open(path).map_err(StoreError::StorageUnavailable)?,
        ),
        StorageConfig::Document { dir, key } => {
            let blobs = FileBlobStore::open(dir).map_err(StoreError::StorageUnavailable)?;
            Box::new(DocumentBackend::with_key(blobs, key.clone()))
        }
        StorageConfig::Memory => Box::new(DocumentBackend::new(MemoryBlobStore::new())),
    };
    Ok(backend)
}

/// Opens and initializes a store over the configured backend.
pub fn open_store(
    storage: &StorageConfig,
) -> Result<MaterialStore<Box<dyn MaterialBackend>>, StoreError> {
    let mut store = MaterialStore::new(open_backend(storage)?);
    store.initialize()?;
    Ok(store)
}

#[cfg(test)]
mod tests {
    use figment::Jail;

    use super::*;

    #[test]
    fn defaults_select_sqlite() {
        let cfg = InventoryConfig::from_toml_str("").unwrap();
        assert_eq!(cfg, InventoryConfig::default());
        assert_eq!(
            cfg.storage,
            StorageConfig::Sqlite {
                path: PathBuf::from("materials.db")
            }
        );
    }

    #[test]
    fn toml_selects_document_backend_with_default_key() {
        let cfg = InventoryConfig::from_toml_str(
            r#"
            [storage]
            backend = "document"
            dir = "/var/lib/stockwatch"

            [runtime]
            command_queue_bound = 8
            "#,
        )
        .unwrap();
        assert_eq!(
            cfg.storage,
            StorageConfig::Document {
                dir: PathBuf::from("/var/lib/stockwatch"),
                key: "materials_db".to_string(),
            }
        );
        assert_eq!(cfg.runtime.command_queue_bound, 8);
        assert_eq!(cfg.runtime.event_capacity, 1024);
    }

    #[test]
    fn environment_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "stockwatch.toml",
                r#"
                [telemetry]
                log_level = "debug"
                "#,
            )?;
            jail.set_env("STOCKWATCH_TELEMETRY__JSON", "true");
            jail.set_env("STOCKWATCH_STORAGE__BACKEND", "memory");

            let cfg = InventoryConfig::load(Some(Path::new("stockwatch.toml")))
                .map_err(|e| e.to_string())?;
            assert_eq!(cfg.telemetry.log_level, "debug");
            assert!(cfg.telemetry.json);
            assert_eq!(cfg.storage, StorageConfig::Memory);
            Ok(())
        });
    }

    #[test]
    fn unknown_backend_is_a_load_error() {
        let err = InventoryConfig::from_toml_str("[storage]\nbackend = \"tape\"").unwrap_err();
        assert!(err.to_string().starts_with("failed to load config"));
    }

    #[test]
    fn memory_store_opens_initialized() {
        let store = open_store(&StorageConfig::Memory).unwrap();
        assert!(store.is_initialized());
        assert!(store.list().unwrap().is_empty());
    }
}
