//! Persisted layer metadata
//!
//! Each layer has a sibling `<layer>.toml`:
//!
//! ```toml
//! launch = true
//! build = true
//! cache = true
//!
//! [metadata]
//! fingerprint = "9f86d0..."
//! installed_at = "2024-01-15T10:00:00+00:00"
//! ```
//!
//! The store only reads and writes keys inside `[metadata]`; every other key
//! in the file is carried over untouched on each write.

use crate::atomic::write_atomic;
use crate::error::{ComposerError, ComposerResult};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use toml::{Table, Value};

/// Metadata keys written by this buildpack
pub mod keys {
    /// Fingerprint of the inputs of the last successful install
    pub const FINGERPRINT: &str = "fingerprint";
    /// When the last successful install finished (RFC3339)
    pub const INSTALLED_AT: &str = "installed_at";
}

const METADATA_TABLE: &str = "metadata";

/// Key/value store for layer metadata
#[async_trait]
pub trait MetadataStore: Send + Sync {
    /// Read a value; `None` if the key or the whole record is missing
    async fn get(&self, key: &str) -> ComposerResult<Option<String>>;

    /// Write a value, replacing any previous one
    async fn put(&self, key: &str, value: &str) -> ComposerResult<()>;
}

/// Layer availability flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerFlags {
    pub launch: bool,
    pub build: bool,
    pub cache: bool,
}

/// Metadata store backed by the layer's TOML file
#[derive(Debug, Clone)]
pub struct FileMetadataStore {
    path: PathBuf,
}

impl FileMetadataStore {
    /// Store for the layer `name` inside `layers_dir`
    pub fn for_layer(layers_dir: &Path, name: &str) -> Self {
        Self {
            path: layers_dir.join(format!("{}.toml", name)),
        }
    }

    /// Path of the backing TOML file
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_table(&self) -> ComposerResult<Table> {
        if !self.path.exists() {
            return Ok(Table::new());
        }

        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| ComposerError::io(format!("reading {}", self.path.display()), e))?;

        content.parse::<Table>().map_err(|e| ComposerError::LayerMetadata {
            path: self.path.clone(),
            reason: e.to_string(),
        })
    }

    async fn write_table(&self, table: &Table) -> ComposerResult<()> {
        let content = toml::to_string_pretty(table)?;
        write_atomic(&self.path, content.as_bytes()).await
    }

    /// Set the top-level layer flags, keeping `[metadata]` as is
    pub async fn set_flags(&self, flags: LayerFlags) -> ComposerResult<()> {
        let mut table = self.read_table().await?;
        table.insert("launch".to_string(), Value::Boolean(flags.launch));
        table.insert("build".to_string(), Value::Boolean(flags.build));
        table.insert("cache".to_string(), Value::Boolean(flags.cache));
        self.write_table(&table).await
    }

    /// Read the top-level layer flags, if all are present
    pub async fn flags(&self) -> ComposerResult<Option<LayerFlags>> {
        let table = self.read_table().await?;
        let flag = |name: &str| table.get(name).and_then(Value::as_bool);

        Ok(match (flag("launch"), flag("build"), flag("cache")) {
            (Some(launch), Some(build), Some(cache)) => Some(LayerFlags {
                launch,
                build,
                cache,
            }),
            _ => None,
        })
    }
}

#[async_trait]
impl MetadataStore for FileMetadataStore {
    async fn get(&self, key: &str) -> ComposerResult<Option<String>> {
        let table = self.read_table().await?;

        Ok(table
            .get(METADATA_TABLE)
            .and_then(Value::as_table)
            .and_then(|metadata| metadata.get(key))
            .and_then(Value::as_str)
            .map(str::to_string))
    }

    async fn put(&self, key: &str, value: &str) -> ComposerResult<()> {
        let mut table = self.read_table().await?;

        let metadata = table
            .entry(METADATA_TABLE.to_string())
            .or_insert_with(|| Value::Table(Table::new()));

        let Value::Table(metadata) = metadata else {
            return Err(ComposerError::LayerMetadata {
                path: self.path.clone(),
                reason: format!("'{}' is not a table", METADATA_TABLE),
            });
        };

        metadata.insert(key.to_string(), Value::String(value.to_string()));
        self.write_table(&table).await
    }
}

/// In-memory store, for tests and dry runs
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with one entry
    pub fn with_entry(key: &str, value: &str) -> Self {
        let store = Self::new();
        store.insert(key, value);
        store
    }

    fn insert(&self, key: &str, value: &str) {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(key.to_string(), value.to_string());
    }
}

#[async_trait]
impl MetadataStore for MemoryStore {
    async fn get(&self, key: &str) -> ComposerResult<Option<String>> {
        Ok(self
            .entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(key)
            .cloned())
    }

    async fn put(&self, key: &str, value: &str) -> ComposerResult<()> {
        self.insert(key, value);
        Ok(())
    }
}
