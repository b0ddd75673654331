//! Edit-menu descriptors.
//!
//! The editor only produces menu *descriptors*; rendering them is the
//! host's business. Groups are pure functions of the snapshot flags and
//! are concatenated in a fixed order:
//!
//! 1. undo/redo
//! 2. copy/cut/paste
//! 3. tool selection
//! 4. find
//! 5. canvas navigation
//! 6. selection
//! 7. align/distribute
//!
//! Diagram editors carry all seven groups; the form editor carries
//! groups 1, 2, 4 and 6.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuEntry {
    pub label: String,
    pub action: String,
    pub enabled: bool,
}

impl MenuEntry {
    fn new(label: &str, action: &str, enabled: bool) -> Self {
        Self {
            label: label.to_string(),
            action: action.to_string(),
            enabled,
        }
    }
}

pub type MenuGroup = Vec<MenuEntry>;

/// Snapshot flags the menu builders derive enabledness from.
#[derive(Debug, Clone, Copy, Default)]
pub struct MenuFlags {
    pub can_undo: bool,
    pub can_redo: bool,
    pub elements_selected: bool,
    pub input_active: bool,
}

pub fn undo_redo_group(flags: &MenuFlags) -> MenuGroup {
    vec![
        MenuEntry::new("Undo", "undo", flags.can_undo),
        MenuEntry::new("Redo", "redo", flags.can_redo),
    ]
}

pub fn clipboard_group(flags: &MenuFlags) -> MenuGroup {
    let can_take = flags.elements_selected && !flags.input_active;
    vec![
        MenuEntry::new("Copy", "copy", can_take),
        MenuEntry::new("Cut", "cut", can_take),
        MenuEntry::new("Paste", "paste", !flags.input_active),
    ]
}

pub fn tools_group(flags: &MenuFlags) -> MenuGroup {
    vec![MenuEntry::new(
        "Edit Label",
        "directEditing",
        !flags.input_active,
    )]
}

pub fn find_group(_flags: &MenuFlags) -> MenuGroup {
    vec![MenuEntry::new("Find", "find", true)]
}

pub fn canvas_group(flags: &MenuFlags) -> MenuGroup {
    let enabled = !flags.input_active;
    vec![
        MenuEntry::new("Move Canvas", "moveCanvas", enabled),
        MenuEntry::new("Zoom In", "zoomIn", enabled),
        MenuEntry::new("Zoom Out", "zoomOut", enabled),
        MenuEntry::new("Reset Zoom", "resetZoom", enabled),
        MenuEntry::new("Fit Viewport", "fitViewport", enabled),
    ]
}

pub fn selection_group(flags: &MenuFlags) -> MenuGroup {
    vec![
        MenuEntry::new("Select All", "selectAll", true),
        MenuEntry::new("Remove Selected", "removeSelection", flags.elements_selected),
    ]
}

pub fn align_group(flags: &MenuFlags) -> MenuGroup {
    vec![
        MenuEntry::new("Align Elements", "alignElements", flags.elements_selected),
        MenuEntry::new(
            "Distribute Elements",
            "distributeElements",
            flags.elements_selected,
        ),
    ]
}

/// All seven groups, in order.
pub fn diagram_menu(flags: &MenuFlags) -> Vec<MenuGroup> {
    vec![
        undo_redo_group(flags),
        clipboard_group(flags),
        tools_group(flags),
        find_group(flags),
        canvas_group(flags),
        selection_group(flags),
        align_group(flags),
    ]
}

/// Groups 1, 2, 4 and 6, in order.
pub fn form_menu(flags: &MenuFlags) -> Vec<MenuGroup> {
    vec![
        undo_redo_group(flags),
        clipboard_group(flags),
        find_group(flags),
        selection_group(flags),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actions(menu: &[MenuGroup]) -> Vec<Vec<&str>> {
        menu.iter()
            .map(|group| group.iter().map(|e| e.action.as_str()).collect())
            .collect()
    }

    #[test]
    fn test_diagram_menu_group_order_is_fixed() {
        let menu = diagram_menu(&MenuFlags::default());
        assert_eq!(
            actions(&menu),
            vec![
                vec!["undo", "redo"],
                vec!["copy", "cut", "paste"],
                vec!["directEditing"],
                vec!["find"],
                vec!["moveCanvas", "zoomIn", "zoomOut", "resetZoom", "fitViewport"],
                vec!["selectAll", "removeSelection"],
                vec!["alignElements", "distributeElements"],
            ]
        );
    }

    #[test]
    fn test_form_menu_drops_canvas_groups() {
        let menu = form_menu(&MenuFlags::default());
        assert_eq!(
            actions(&menu),
            vec![
                vec!["undo", "redo"],
                vec!["copy", "cut", "paste"],
                vec!["find"],
                vec!["selectAll", "removeSelection"],
            ]
        );
    }

    #[test]
    fn test_active_input_disables_clipboard_and_canvas() {
        let flags = MenuFlags {
            elements_selected: true,
            input_active: true,
            ..MenuFlags::default()
        };
        let menu = diagram_menu(&flags);

        assert!(menu[1].iter().all(|e| !e.enabled));
        assert!(menu[4].iter().all(|e| !e.enabled));
        // Find stays available.
        assert!(menu[3][0].enabled);
    }

    #[test]
    fn test_selection_enables_clipboard_and_align() {
        let flags = MenuFlags {
            elements_selected: true,
            ..MenuFlags::default()
        };
        let menu = diagram_menu(&flags);

        assert!(menu[1][0].enabled);
        assert!(menu[5][1].enabled);
        assert!(menu[6].iter().all(|e| e.enabled));
    }
}
