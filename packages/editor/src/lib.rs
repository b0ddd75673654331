//! # Flowdeck Editor
//!
//! Per-tab editor state layer between the host shell and the modeling
//! engines.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ shell: tabs, cache ownership, notifications │
//! └─────────────────────────────────────────────┘
//!          ↓ props                ↑ Host callbacks
//! ┌─────────────────────────────────────────────┐
//! │ editor                                      │
//! │  - EditorCache: state survives tab switches │
//! │  - EditorCore: import gate, event pump,     │
//! │    dirty tracking, menu + layout            │
//! │  - variants: notation × plugin policy       │
//! └─────────────────────────────────────────────┘
//!          ↓ import/actions        ↑ events
//! ┌─────────────────────────────────────────────┐
//! │ toolkit engines                             │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **The cache is injected**: whoever builds the shell owns the
//!    [`EditorCache`]; nothing here is a global.
//! 2. **Imports are gated**: identical content on re-render never reaches
//!    the engine, and superseded async completions are discarded.
//! 3. **One snapshot per event**: every engine event produces exactly one
//!    `on_changed` with a full [`Snapshot`].

pub mod cache;
pub mod component;
pub mod host;
pub mod layout;
pub mod menu;
pub mod props;
pub mod snapshot;
pub mod variants;

pub use cache::{CachedState, EditorCache};
pub use component::{EditorCore, ImportTicket};
pub use host::{Host, NullHost};
pub use layout::{Layout, PanelState, DEFAULT_PROPERTIES_WIDTH};
pub use menu::{MenuEntry, MenuFlags, MenuGroup};
pub use props::EditorProps;
pub use snapshot::Snapshot;
pub use variants::{DecisionEditor, FormEditor, NotationKind, PluginPolicy, ProcessEditor};
