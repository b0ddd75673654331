//! Host-supplied editor configuration.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config key {0} has unexpected shape: {1}")]
    InvalidValue(String, serde_json::Error),
}

/// String-keyed configuration map handed down by the host shell.
///
/// Values are opaque JSON; callers that know the shape of a key use
/// [`Config::get_as`] for typed access.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(flatten)]
    values: BTreeMap<String, Value>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.values.insert(key.into(), value);
    }

    pub fn with(mut self, key: impl Into<String>, value: Value) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Typed access to one key. Absent keys yield `Ok(None)`.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, ConfigError> {
        match self.values.get(key) {
            None => Ok(None),
            Some(value) => serde_json::from_value(value.clone())
                .map(Some)
                .map_err(|e| ConfigError::InvalidValue(key.to_string(), e)),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_get_missing_key() {
        let config = Config::new();
        assert!(config.get("anything").is_none());
        assert!(config.get_as::<bool>("anything").unwrap().is_none());
    }

    #[test]
    fn test_typed_access() {
        let config = Config::new().with("grid.enabled", json!(true));
        assert_eq!(config.get_as::<bool>("grid.enabled").unwrap(), Some(true));
    }

    #[test]
    fn test_typed_access_rejects_wrong_shape() {
        let config = Config::new().with("grid.enabled", json!("nope"));
        assert!(config.get_as::<bool>("grid.enabled").is_err());
    }
}
