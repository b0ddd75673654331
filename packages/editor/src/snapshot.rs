//! Editor state snapshot handed to the host on every change.

use serde::Serialize;

use crate::menu::MenuGroup;

/// Flat view of the editor's current state.
///
/// A fresh snapshot is derived and reported for every toolkit event; the
/// host never has to diff previous snapshots against new ones.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub dirty: bool,
    pub can_undo: bool,
    pub can_redo: bool,
    pub elements_selected: bool,
    /// Properties-panel input focused or direct editing active.
    pub input_active: bool,
    pub search_open: bool,
    pub properties_panel_open: bool,
    pub edit_menu: Vec<MenuGroup>,
}
