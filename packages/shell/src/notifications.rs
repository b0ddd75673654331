//! Host notifications over a channel.
//!
//! The workbench hands each editor a [`ChannelHost`]; every callback
//! becomes a timestamped [`Notification`] on a tokio unbounded channel,
//! which the embedding process consumes as a stream. Callbacks stay
//! synchronous on the editor side; only delivery is decoupled.

use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::mpsc::UnboundedSender;

use flowdeck_common::EditorId;
use flowdeck_editor::{Host, Layout, Snapshot};
use flowdeck_toolkit::{ExportError, ImportError, ImportWarning};

/// What happened, as the host callbacks report it.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum NotificationPayload {
    ImportDone {
        error: Option<String>,
        warnings: Vec<String>,
    },
    StateChanged {
        snapshot: Snapshot,
    },
    ExportFailed {
        message: String,
    },
    LayoutChanged {
        layout: Layout,
    },
    Action {
        name: String,
        payload: Value,
    },
    ContentUpdated,
    Warning {
        message: String,
    },
    Modal {
        name: String,
    },
}

/// One host callback, stamped with its editor and wall-clock time.
#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    pub editor_id: EditorId,
    pub timestamp_ms: i64,
    #[serde(flatten)]
    pub payload: NotificationPayload,
}

/// [`Host`] implementation forwarding callbacks onto a channel.
#[derive(Debug, Clone)]
pub struct ChannelHost {
    editor_id: EditorId,
    tx: UnboundedSender<Notification>,
}

impl ChannelHost {
    pub fn new(editor_id: EditorId, tx: UnboundedSender<Notification>) -> Self {
        Self { editor_id, tx }
    }

    fn send(&self, payload: NotificationPayload) {
        let notification = Notification {
            editor_id: self.editor_id.clone(),
            timestamp_ms: Utc::now().timestamp_millis(),
            payload,
        };
        if self.tx.send(notification).is_err() {
            tracing::debug!(editor = %self.editor_id, "notification receiver dropped");
        }
    }
}

impl Host for ChannelHost {
    fn on_import(&self, error: Option<&ImportError>, warnings: &[ImportWarning]) {
        self.send(NotificationPayload::ImportDone {
            error: error.map(|e| e.to_string()),
            warnings: warnings.iter().map(|w| w.message.clone()).collect(),
        });
    }

    fn on_changed(&self, snapshot: &Snapshot) {
        self.send(NotificationPayload::StateChanged {
            snapshot: snapshot.clone(),
        });
    }

    fn on_error(&self, error: &ExportError) {
        self.send(NotificationPayload::ExportFailed {
            message: error.to_string(),
        });
    }

    fn on_layout_changed(&self, layout: &Layout) {
        self.send(NotificationPayload::LayoutChanged {
            layout: layout.clone(),
        });
    }

    fn on_action(&self, name: &str, payload: &Value) {
        self.send(NotificationPayload::Action {
            name: name.to_string(),
            payload: payload.clone(),
        });
    }

    fn on_content_updated(&self) {
        self.send(NotificationPayload::ContentUpdated);
    }

    fn on_warning(&self, message: &str) {
        self.send(NotificationPayload::Warning {
            message: message.to_string(),
        });
    }

    fn on_modal(&self, name: &str) {
        self.send(NotificationPayload::Modal {
            name: name.to_string(),
        });
    }
}
