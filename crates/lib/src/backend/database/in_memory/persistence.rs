//! Persistence operations for the InMemory backend
//!
//! This module handles serialization and file I/O for saving/loading
//! the in-memory node table to/from JSON files.

use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};
use tokio::sync::RwLock;

use super::{InMemory, Table};
use crate::{
    Error, Result,
    backend::{NodeRow, errors::BackendError},
};

/// The current persistence file format version.
/// v0 indicates this is an unstable format subject to breaking changes.
const PERSISTENCE_VERSION: u8 = 0;

/// Helper to check if version is default (0) for serde skip_serializing_if
fn is_v0(v: &u8) -> bool {
    *v == 0
}

/// Validates the persistence version during deserialization.
fn validate_persistence_version<'de, D>(deserializer: D) -> std::result::Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let version = u8::deserialize(deserializer)?;
    if version != PERSISTENCE_VERSION {
        return Err(serde::de::Error::custom(format!(
            "unsupported persistence version {version}; only version {PERSISTENCE_VERSION} is supported"
        )));
    }
    Ok(version)
}

/// Serializable version of the node table
#[derive(Serialize, Deserialize)]
struct SerializableTable {
    /// File format version for compatibility checking
    #[serde(
        rename = "_v",
        default,
        skip_serializing_if = "is_v0",
        deserialize_with = "validate_persistence_version"
    )]
    version: u8,
    /// Last assigned node id, so ids stay unique after a reload
    #[serde(default)]
    last_id: i64,
    nodes: Vec<NodeRow>,
}

impl From<SerializableTable> for Table {
    fn from(value: SerializableTable) -> Self {
        let highest = value.nodes.iter().map(|n| n.id.get()).max().unwrap_or(0);
        Table {
            last_id: value.last_id.max(highest),
            rows: value.nodes.into_iter().map(|n| (n.id, n)).collect(),
        }
    }
}

/// Saves the whole table to a specified file as JSON.
pub(crate) async fn save_to_file<P: AsRef<Path>>(backend: &InMemory, path: P) -> Result<()> {
    let serializable = {
        let table = backend.table.read().await;
        SerializableTable {
            version: PERSISTENCE_VERSION,
            last_id: table.last_id,
            nodes: table.rows.values().cloned().collect(),
        }
    };

    let json = serde_json::to_string_pretty(&serializable)
        .map_err(|e| -> Error { BackendError::SerializationFailed { source: e }.into() })?;
    tokio::fs::write(path, json)
        .await
        .map_err(|e| -> Error { BackendError::FileIo { source: e }.into() })
}

/// Loads the table from a specified JSON file.
///
/// If the file does not exist, a new, empty `InMemory` database is returned.
pub(crate) async fn load_from_file<P: AsRef<Path>>(path: P) -> Result<InMemory> {
    match tokio::fs::read_to_string(path).await {
        Ok(json) => {
            let serializable: SerializableTable = serde_json::from_str(&json).map_err(|e| -> Error {
                BackendError::DeserializationFailed { source: e }.into()
            })?;
            Ok(InMemory {
                table: RwLock::new(serializable.into()),
            })
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(InMemory::new()),
        Err(e) => Err(BackendError::FileIo { source: e }.into()),
    }
}
