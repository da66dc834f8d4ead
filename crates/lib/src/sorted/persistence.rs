//! Saving and loading the sorted list as a versioned JSON object graph.
//!
//! The on-disk format is opaque: the serialized object graph of the list,
//! wrapped in an envelope whose `_v` field is validated on load. Guard stacks
//! are runtime nesting state and are not part of the snapshot.

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

use super::SortedList;
use crate::Result;

/// The current persistence file format version.
pub(crate) const PERSISTENCE_VERSION: u8 = 1;

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

#[derive(Serialize)]
struct SnapshotRef<'a, T> {
    #[serde(rename = "_v")]
    version: u8,
    list: &'a SortedList<T>,
}

#[derive(Deserialize)]
#[serde(bound = "T: DeserializeOwned")]
struct Snapshot<T> {
    #[serde(rename = "_v", deserialize_with = "validate_persistence_version")]
    version: u8,
    list: SortedList<T>,
}

impl<T: Serialize> SortedList<T> {
    /// Save the whole list state to `path` as JSON.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(&SnapshotRef {
            version: PERSISTENCE_VERSION,
            list: self,
        })?;
        fs::write(path, json)?;
        Ok(())
    }
}

impl<T: DeserializeOwned> SortedList<T> {
    /// Load a list from `path`.
    ///
    /// A missing file yields a new, empty list. Guard stacks come back empty.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(json) => {
                let snapshot: Snapshot<T> = serde_json::from_str(&json)?;
                tracing::debug!(version = snapshot.version, "loaded list snapshot");
                Ok(snapshot.list)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(SortedList::new()),
            Err(e) => Err(e.into()),
        }
    }
}
