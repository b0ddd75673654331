//! # Editor Core
//!
//! Per-tab editor state machine. One [`EditorCore`] owns one toolkit
//! instance for the lifetime of its cache entry and mediates everything
//! between the host shell and the engine:
//!
//! - decides whether incoming content needs a re-import (the dedup gate)
//! - discards stale import completions via generation-tagged tickets
//! - drains engine events and reports one snapshot per event
//! - derives dirty state from the command position and a save checkpoint
//!
//! ## Design
//!
//! The core is the cached state itself: unmount does not tear it down,
//! ownership simply stays in the cache until the tab closes. `destroy`
//! unsubscribes and detaches the toolkit so nothing can fire afterwards.

use serde_json::{json, Value};

use flowdeck_common::{Config, EditorId, Plugins};
use flowdeck_toolkit::{
    EventKind, ExportError, ImageFormat, ImportError, ImportWarning, SubscriptionId, Toolkit,
    ToolkitError,
};

use crate::cache::CachedState;
use crate::host::Host;
use crate::layout::{self, Layout};
use crate::menu::{MenuFlags, MenuGroup};
use crate::props::EditorProps;
use crate::snapshot::Snapshot;

/// Claim on one requested import, tagged with its generation.
///
/// A ticket whose generation has been superseded by a newer request is
/// stale; finishing it is a no-op.
#[derive(Debug)]
pub struct ImportTicket {
    generation: u64,
}

/// One editor instance bound to one toolkit.
pub struct EditorCore<T: Toolkit> {
    id: EditorId,
    toolkit: T,
    subscription: SubscriptionId,
    menu_builder: fn(&MenuFlags) -> Vec<MenuGroup>,

    // Import dedup gate.
    last_content: Option<String>,
    last_plugins: Plugins,
    last_config: Config,
    import_generation: u64,

    // Aggregated event state.
    save_checkpoint: u64,
    properties_focused: bool,
    direct_editing: bool,
    search_open: bool,
    last_layout: Option<Layout>,
}

impl<T: Toolkit> EditorCore<T> {
    /// Bind a freshly constructed toolkit. Subscribes to the full event
    /// vocabulary and announces the instance to the host exactly once.
    pub fn new(
        props: EditorProps,
        mut toolkit: T,
        menu_builder: fn(&MenuFlags) -> Vec<MenuGroup>,
        host: &dyn Host,
    ) -> Self {
        let subscription = toolkit.subscribe(&EventKind::ALL);
        host.on_action("modeler-created", &json!({ "id": props.id.as_str() }));
        tracing::debug!(editor = %props.id, "editor core created");
        Self {
            id: props.id,
            toolkit,
            subscription,
            menu_builder,
            last_content: None,
            last_plugins: props.plugins,
            last_config: props.config,
            import_generation: 0,
            save_checkpoint: 0,
            properties_focused: false,
            direct_editing: false,
            search_open: false,
            last_layout: props.layout,
        }
    }

    pub fn id(&self) -> &EditorId {
        &self.id
    }

    pub fn toolkit(&self) -> &T {
        &self.toolkit
    }

    /// Mutable engine access for surface notifications the host relays,
    /// such as properties-panel focus. Call [`Self::pump_events`] after
    /// using it so the resulting events are reported.
    pub fn toolkit_mut(&mut self) -> &mut T {
        &mut self.toolkit
    }

    /// The import gate. Returns `None` when the incoming content equals
    /// the last imported content and plugins/config are unchanged, which
    /// means the render needs no toolkit work at all.
    pub fn request_import(&mut self, props: &EditorProps) -> Option<ImportTicket> {
        let unchanged = self.last_content.as_deref() == Some(props.content.as_str())
            && self.last_plugins == props.plugins
            && self.last_config == props.config;
        if unchanged {
            return None;
        }

        self.last_content = Some(props.content.clone());
        self.last_plugins = props.plugins.clone();
        self.last_config = props.config.clone();
        if props.layout.is_some() {
            self.last_layout = props.layout.clone();
        }
        self.import_generation += 1;
        Some(ImportTicket {
            generation: self.import_generation,
        })
    }

    /// Complete a requested import. Stale tickets are discarded without
    /// touching any state and without notifying the host.
    pub fn finish_import(
        &mut self,
        ticket: ImportTicket,
        outcome: Result<Vec<ImportWarning>, ImportError>,
        host: &dyn Host,
    ) {
        if ticket.generation != self.import_generation {
            tracing::debug!(
                editor = %self.id,
                stale = ticket.generation,
                current = self.import_generation,
                "discarding superseded import completion"
            );
            return;
        }

        match outcome {
            Ok(warnings) => {
                self.save_checkpoint = self.toolkit.commands().position();
                for warning in &warnings {
                    host.on_warning(&warning.message);
                }
                host.on_import(None, &warnings);
                self.pump_events(host);
            }
            Err(error) => {
                // Drop the dedup checkpoint so the same content can be
                // retried on the next render.
                self.last_content = None;
                tracing::warn!(editor = %self.id, %error, "import failed");
                host.on_import(Some(&error), &[]);
            }
        }
    }

    /// Gate, import and finish in one step. Returns whether the toolkit
    /// was asked to import; identical content on re-render never is.
    pub fn update(&mut self, props: &EditorProps, host: &dyn Host) -> bool {
        let Some(ticket) = self.request_import(props) else {
            return false;
        };
        let outcome = self.toolkit.import(&props.content);
        self.finish_import(ticket, outcome, host);
        true
    }

    /// Attach the toolkit to its rendering surface.
    pub fn attach(&mut self, host: &dyn Host) {
        self.toolkit.attach();
        self.pump_events(host);
    }

    /// Drain queued engine events. Each event updates the aggregation
    /// flags and reports one snapshot; `CommandStackChanged` additionally
    /// raises `on_content_updated`.
    pub fn pump_events(&mut self, host: &dyn Host) {
        for event in self.toolkit.drain_events(self.subscription) {
            self.apply_event(event);
            let snapshot = self.snapshot();
            host.on_changed(&snapshot);
            if event == EventKind::CommandStackChanged {
                host.on_content_updated();
            }
        }
    }

    fn apply_event(&mut self, event: EventKind) {
        match event {
            EventKind::SaveDone => {
                self.save_checkpoint = self.toolkit.commands().position();
            }
            EventKind::PropertiesFocusIn => self.properties_focused = true,
            EventKind::PropertiesFocusOut => self.properties_focused = false,
            EventKind::DirectEditingActivated => self.direct_editing = true,
            EventKind::DirectEditingDeactivated => self.direct_editing = false,
            EventKind::SearchOpened => self.search_open = true,
            EventKind::SearchClosed => self.search_open = false,
            EventKind::ImportDone
            | EventKind::CommandStackChanged
            | EventKind::SelectionChanged
            | EventKind::Attached
            | EventKind::ClipboardChanged => {}
        }
    }

    /// Unsaved changes since the last import or save.
    pub fn is_dirty(&self) -> bool {
        self.toolkit.commands().position() != self.save_checkpoint
    }

    /// Full current view of the editor state.
    pub fn snapshot(&self) -> Snapshot {
        let commands = self.toolkit.commands();
        let flags = MenuFlags {
            can_undo: commands.can_undo(),
            can_redo: commands.can_redo(),
            elements_selected: !self.toolkit.selection().is_empty(),
            input_active: self.properties_focused || self.direct_editing,
        };
        Snapshot {
            dirty: self.is_dirty(),
            can_undo: flags.can_undo,
            can_redo: flags.can_redo,
            elements_selected: flags.elements_selected,
            input_active: flags.input_active,
            search_open: self.search_open,
            properties_panel_open: self
                .last_layout
                .as_ref()
                .map(|l| l.properties_panel.open)
                .unwrap_or(false),
            edit_menu: (self.menu_builder)(&flags),
        }
    }

    /// Serialize the current document. A failure is reported through
    /// `on_error` exactly once and returned.
    pub fn content(&self, host: &dyn Host) -> Result<String, ExportError> {
        self.toolkit.export().map_err(|error| {
            host.on_error(&error);
            error
        })
    }

    /// Render the document as an image. Failure messages pass through
    /// from the toolkit unchanged; `on_error` fires exactly once.
    pub fn export_as(&self, format: ImageFormat, host: &dyn Host) -> Result<String, ExportError> {
        self.toolkit.export_image(format).map_err(|error| {
            host.on_error(&error);
            error
        })
    }

    /// Export and mark the result as persisted. Resets the dirty
    /// checkpoint and keeps the dedup gate aligned with what was saved.
    pub fn save(&mut self, host: &dyn Host) -> Result<String, ExportError> {
        let content = self.content(host)?;
        self.last_content = Some(content.clone());
        self.toolkit.notify_saved();
        self.pump_events(host);
        Ok(content)
    }

    /// Route an action. The layout actions mutate host layout state and
    /// never reach the engine; everything else goes to the engine
    /// registry and its value is returned untransformed. Resulting
    /// events are pumped.
    pub fn trigger_action(
        &mut self,
        action: &str,
        context: Value,
        host: &dyn Host,
    ) -> Result<Value, ToolkitError> {
        match action {
            "toggleProperties" => {
                let current = self.last_layout.clone();
                Ok(json!(self.toggle_properties(current.as_ref(), host)))
            }
            "resetProperties" => Ok(json!(self.reset_properties(host))),
            _ => {
                let result = self.toolkit.trigger_action(action, context);
                self.pump_events(host);
                result
            }
        }
    }

    /// Compute the toggled layout from `current` without mutating it and
    /// report it once.
    pub fn toggle_properties(&mut self, current: Option<&Layout>, host: &dyn Host) -> Layout {
        let next = layout::toggle_properties(current);
        self.last_layout = Some(next.clone());
        host.on_layout_changed(&next);
        next
    }

    /// Reopen the properties panel at its default width.
    pub fn reset_properties(&mut self, host: &dyn Host) -> Layout {
        let next = layout::reset_properties();
        self.last_layout = Some(next.clone());
        host.on_layout_changed(&next);
        next
    }
}

impl<T: Toolkit> CachedState for EditorCore<T> {
    fn destroy(&mut self) {
        tracing::debug!(editor = %self.id, "destroying editor core");
        self.toolkit.unsubscribe(self.subscription);
        self.toolkit.detach();
    }
}
