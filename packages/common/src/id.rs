//! Editor tab identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of one open editor tab.
///
/// The host shell assigns the id when a tab is created and uses it as the
/// cache key for the tab's editor state. Ids are unique per open tab.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EditorId(String);

impl EditorId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EditorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EditorId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for EditorId {
    fn from(id: String) -> Self {
        Self(id)
    }
}
