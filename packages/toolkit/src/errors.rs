//! Error types for the toolkit seam.

use serde::Serialize;
use thiserror::Error;

/// Content could not be imported into the engine.
///
/// Import errors are recoverable: the engine keeps its previous model and
/// the editor layer reports the failure to the host.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message}")]
pub struct ImportError {
    pub message: String,
}

impl ImportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Non-fatal finding produced while importing content.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportWarning {
    pub message: String,
}

impl ImportWarning {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// The engine failed to serialize its current content.
///
/// The display form is exactly the engine's message; callers that surface
/// the failure must pass it through unchanged.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{0}")]
pub struct ExportError(pub String);

impl ExportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ToolkitError {
    #[error(transparent)]
    Import(#[from] ImportError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error("unknown action: {0}")]
    UnknownAction(String),

    #[error("invalid action context: {0}")]
    InvalidContext(String),
}
