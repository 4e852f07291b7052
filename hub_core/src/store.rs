use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use bevy::prelude::Resource;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Persisted keys owned by the hub rules.
pub mod keys {
    pub const CENTER_X: &str = "hub:center_x";
    pub const CENTER_Y: &str = "hub:center_y";
    pub const CENTER_Z: &str = "hub:center_z";
    pub const RADIUS: &str = "hub:radius";
    pub const BANNED_RESOURCES: &str = "hub:banned_resources";
}

/// A value stored in the world's property table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl PropertyValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            PropertyValue::Number(value) => Some(*value),
            PropertyValue::Text(text) => text.trim().parse::<f64>().ok(),
            PropertyValue::Bool(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            PropertyValue::Text(text) => Some(text.as_str()),
            _ => None,
        }
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        PropertyValue::Number(value)
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::Text(value)
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::Text(value.to_string())
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read properties from {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write properties to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse properties file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode properties: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("property store rejected key {0}")]
    Rejected(String),
}

/// Key/value settings the host persists across restarts.
pub trait PropertyStore {
    fn get(&self, key: &str) -> Option<PropertyValue>;
    fn set(&mut self, key: &str, value: PropertyValue) -> Result<(), StoreError>;
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

/// World property table, optionally mirrored to a JSON file on every write.
#[derive(Resource, Debug, Clone, Default)]
pub struct WorldProperties {
    path: Option<PathBuf>,
    values: BTreeMap<String, PropertyValue>,
}

impl WorldProperties {
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Opens the table stored at `path`. A missing file starts empty.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let values = if path.exists() {
            let contents = fs::read_to_string(&path).map_err(|source| StoreError::Read {
                path: path.clone(),
                source,
            })?;
            serde_json::from_str(&contents).map_err(|source| StoreError::Parse {
                path: path.clone(),
                source,
            })?
        } else {
            BTreeMap::new()
        };
        tracing::info!(
            target: "hub::store",
            path = %path.display(),
            keys = values.len(),
            "world_properties.opened"
        );
        Ok(Self {
            path: Some(path),
            values,
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn flush(&self) -> Result<(), StoreError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let encoded = serde_json::to_string_pretty(&self.values)?;
        fs::write(path, encoded).map_err(|source| StoreError::Write {
            path: path.clone(),
            source,
        })
    }
}

impl PropertyStore for WorldProperties {
    fn get(&self, key: &str) -> Option<PropertyValue> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: PropertyValue) -> Result<(), StoreError> {
        let previous = self.values.insert(key.to_string(), value);
        if let Err(err) = self.flush() {
            match previous {
                Some(old) => self.values.insert(key.to_string(), old),
                None => self.values.remove(key),
            };
            return Err(err);
        }
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        let Some(previous) = self.values.remove(key) else {
            return Ok(());
        };
        if let Err(err) = self.flush() {
            self.values.insert(key.to_string(), previous);
            return Err(err);
        }
        Ok(())
    }
}
