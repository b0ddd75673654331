//! Host callback seam.

use serde_json::Value;

use flowdeck_toolkit::{ExportError, ImportError, ImportWarning};

use crate::layout::Layout;
use crate::snapshot::Snapshot;

/// Callbacks the editor raises toward its embedding shell.
///
/// All methods take `&self`; hosts that accumulate state use interior
/// mutability or a channel. The editor guarantees per-operation call
/// counts (one `on_changed` per event, one `on_import` per completed
/// import, one `on_error` per failed export).
pub trait Host {
    /// An import completed. `error` is `None` on success; `warnings`
    /// carries non-fatal findings either way.
    fn on_import(&self, error: Option<&ImportError>, warnings: &[ImportWarning]);

    /// The editor state changed; `snapshot` is the full current view.
    fn on_changed(&self, snapshot: &Snapshot);

    /// An export failed. The message is the toolkit's, unmodified.
    fn on_error(&self, error: &ExportError);

    /// The editor computed a new layout.
    fn on_layout_changed(&self, layout: &Layout);

    /// A named lifecycle action, e.g. `modeler-created`.
    fn on_action(&self, name: &str, payload: &Value);

    /// The document content changed (command executed, undone or redone).
    fn on_content_updated(&self);

    fn on_warning(&self, _message: &str) {}

    fn on_modal(&self, _name: &str) {}
}

/// Host that ignores every callback.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullHost;

impl Host for NullHost {
    fn on_import(&self, _error: Option<&ImportError>, _warnings: &[ImportWarning]) {}
    fn on_changed(&self, _snapshot: &Snapshot) {}
    fn on_error(&self, _error: &ExportError) {}
    fn on_layout_changed(&self, _layout: &Layout) {}
    fn on_action(&self, _name: &str, _payload: &Value) {}
    fn on_content_updated(&self) {}
}
