//! Shared JSON-file persistence core for the memory stores.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{error, info};

use crate::error::HelplineResult;

/// Load/save a `HashMap<String, T>` as one pretty-printed JSON file.
#[derive(Debug)]
pub(crate) struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Create the store, ensuring the parent directory exists.
    pub fn new(path: impl AsRef<Path>) -> HelplineResult<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Ok(Self { path })
    }

    /// Load the map, starting fresh on a missing or corrupt file.
    pub fn load<T: DeserializeOwned>(&self) -> HashMap<String, T> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(_) => return HashMap::new(),
        };
        match serde_json::from_str(&raw) {
            Ok(map) => {
                let map: HashMap<String, T> = map;
                info!("Loaded {} entries from {}", map.len(), self.path.display());
                map
            }
            Err(e) => {
                error!(
                    "Error loading {}, starting fresh: {}",
                    self.path.display(),
                    e
                );
                HashMap::new()
            }
        }
    }

    /// Persist the map. Failures are logged, not propagated: losing one flush
    /// must not take down the conversation.
    pub fn save<T: Serialize>(&self, map: &HashMap<String, T>) {
        match serde_json::to_string_pretty(map) {
            Ok(json) => {
                if let Err(e) = std::fs::write(&self.path, json) {
                    error!("Error saving {}: {}", self.path.display(), e);
                }
            }
            Err(e) => error!("Error serializing {}: {}", self.path.display(), e),
        }
    }
}
