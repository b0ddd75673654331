//! Plugin descriptors supplied by the host shell.
//!
//! Plugins extend an editor in two ways: additional toolkit modules
//! (behaviors registered into the modeling toolkit at construction) and
//! schema extensions (extra attributes the model accepts). Both are
//! read-only configuration from the editor's point of view; whether a
//! variant forwards them into the toolkit is decided by its plugin policy.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An additional toolkit module contributed by a plugin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleDescriptor {
    /// Module name, unique within the plugin.
    pub name: String,

    /// Module construction options, passed through opaquely.
    #[serde(default)]
    pub options: Value,
}

impl ModuleDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            options: Value::Null,
        }
    }

    pub fn with_options(mut self, options: Value) -> Self {
        self.options = options;
        self
    }
}

/// A model schema extension contributed by a plugin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaExtension {
    /// Namespace prefix used by extension attributes.
    pub prefix: String,

    /// Namespace URI.
    pub uri: String,

    /// Extension definition, passed through opaquely.
    #[serde(default)]
    pub definition: Value,
}

impl SchemaExtension {
    pub fn new(prefix: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            uri: uri.into(),
            definition: Value::Null,
        }
    }
}

/// The full plugin contribution for one editor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Plugins {
    #[serde(default)]
    pub modules: Vec<ModuleDescriptor>,

    #[serde(default)]
    pub extensions: Vec<SchemaExtension>,
}

impl Plugins {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty() && self.extensions.is_empty()
    }
}
