//! Typed capability seams over an engine instance.
//!
//! Callers never reach into an engine by module name; the capabilities
//! they may use are these traits. Query capabilities ([`CommandStack`],
//! [`Selection`]) are read-only; all mutation flows through the action
//! registry ([`EditorActions`]) or the lifecycle methods on [`Toolkit`],
//! so every state change emits its events.

use serde_json::Value;

use crate::{
    EventKind, ExportError, ImageFormat, ImportError, ImportWarning, SubscriptionId, ToolkitError,
    ToolkitOptions,
};

/// Undo/redo log queries.
pub trait CommandStack {
    fn can_undo(&self) -> bool;
    fn can_redo(&self) -> bool;

    /// Monotonic position of the newest applied command (0 = pristine).
    /// Dirty state is derived by comparing this against a save checkpoint.
    fn position(&self) -> u64;
}

/// Element selection queries.
pub trait Selection {
    fn selected(&self) -> &[String];

    fn is_empty(&self) -> bool {
        self.selected().is_empty()
    }

    fn len(&self) -> usize {
        self.selected().len()
    }
}

/// The engine's action-trigger registry.
pub trait EditorActions {
    /// Forward an action by name. The returned value is passed through to
    /// the caller untransformed; unknown actions fail.
    fn trigger_action(&mut self, action: &str, context: Value) -> Result<Value, ToolkitError>;
}

/// One embedded modeling engine, owned exclusively by its editor.
pub trait Toolkit: EditorActions {
    /// Replace the model with the given content. On success the engine
    /// emits [`EventKind::ImportDone`] and returns any non-fatal warnings;
    /// on failure the previous model is kept.
    fn import(&mut self, content: &str) -> Result<Vec<ImportWarning>, ImportError>;

    /// Serialize the current model.
    fn export(&self) -> Result<String, ExportError>;

    /// Render the current model as an image.
    fn export_image(&self, format: ImageFormat) -> Result<String, ExportError>;

    fn commands(&self) -> &dyn CommandStack;

    fn selection(&self) -> &dyn Selection;

    fn subscribe(&mut self, kinds: &[EventKind]) -> SubscriptionId;

    fn unsubscribe(&mut self, id: SubscriptionId);

    fn drain_events(&mut self, id: SubscriptionId) -> Vec<EventKind>;

    /// Attach to a rendering surface; emits [`EventKind::Attached`].
    fn attach(&mut self);

    /// Tell the engine the current content was persisted; emits
    /// [`EventKind::SaveDone`].
    fn notify_saved(&mut self);

    /// Construction options, introspectable for policy checks.
    fn options(&self) -> &ToolkitOptions;

    /// Release the rendering surface and drop every event subscriber.
    /// After this call no listener can observe the engine.
    fn detach(&mut self);
}
