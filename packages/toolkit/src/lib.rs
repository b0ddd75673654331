//! # Flowdeck Toolkit
//!
//! Typed adapter seam over the embedded modeling engines.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ editor: per-tab state sync + snapshots      │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ toolkit: capability traits + event bus      │
//! │  - CommandStack / Selection / EditorActions │
//! │  - fixed event vocabulary (EventKind)       │
//! │  - import/export + action registry          │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ engines: DiagramEngine (XML), FormEngine    │
//! │          (JSON)                             │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Capabilities are explicit**: callers never reach into an engine by
//!    name; everything they may query is a trait on the seam.
//! 2. **Events are enumerated**: the vocabulary is the closed [`EventKind`]
//!    set; there is no ad hoc string pub/sub.
//! 3. **Subscriptions are owned**: `detach` drops every subscriber, so no
//!    listener can fire after teardown.

mod capabilities;
mod diagram;
mod errors;
mod events;
mod forms;
mod history;
mod image;
mod options;

pub use capabilities::{CommandStack, EditorActions, Selection, Toolkit};
pub use diagram::{DiagramEngine, Element, Notation, Zoom};
pub use errors::{ExportError, ImportError, ImportWarning, ToolkitError};
pub use events::{EventBus, EventKind, SubscriptionId};
pub use forms::{FormEngine, FormField};
pub use history::History;
pub use image::ImageFormat;
pub use options::ToolkitOptions;
