//! # Flowdeck Common
//!
//! Shared host-facing types: tab identifiers, plugin descriptors and the
//! configuration map. Everything here is plain data crossing the
//! shell/editor boundary.

pub mod config;
pub mod id;
pub mod plugins;

pub use config::*;
pub use id::*;
pub use plugins::*;
