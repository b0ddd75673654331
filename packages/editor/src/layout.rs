//! Workbench layout descriptors.
//!
//! Layout is host state, not toolkit state: the editor computes new
//! layouts from the one the host passes in and reports them back through
//! [`crate::Host::on_layout_changed`], but never stores the host's copy.

use serde::{Deserialize, Serialize};

/// Width the properties panel opens with when none was recorded.
pub const DEFAULT_PROPERTIES_WIDTH: u32 = 250;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelState {
    pub open: bool,
    pub width: u32,
}

impl Default for PanelState {
    fn default() -> Self {
        Self {
            open: false,
            width: DEFAULT_PROPERTIES_WIDTH,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layout {
    pub properties_panel: PanelState,
}

/// Flip the properties panel. A missing layout toggles to open; a zero
/// width is replaced with the default when opening.
pub fn toggle_properties(current: Option<&Layout>) -> Layout {
    let mut layout = current.cloned().unwrap_or_default();
    layout.properties_panel.open = !layout.properties_panel.open;
    if layout.properties_panel.open && layout.properties_panel.width == 0 {
        layout.properties_panel.width = DEFAULT_PROPERTIES_WIDTH;
    }
    layout
}

/// Open the properties panel at its default width.
pub fn reset_properties() -> Layout {
    Layout {
        properties_panel: PanelState {
            open: true,
            width: DEFAULT_PROPERTIES_WIDTH,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_from_absent_layout_opens_with_default_width() {
        let layout = toggle_properties(None);
        assert!(layout.properties_panel.open);
        assert_eq!(layout.properties_panel.width, DEFAULT_PROPERTIES_WIDTH);
    }

    #[test]
    fn test_toggle_does_not_mutate_input() {
        let current = Layout {
            properties_panel: PanelState {
                open: true,
                width: 400,
            },
        };
        let next = toggle_properties(Some(&current));

        assert!(!next.properties_panel.open);
        // Input is untouched, width survives the round trip.
        assert!(current.properties_panel.open);
        assert_eq!(next.properties_panel.width, 400);
    }

    #[test]
    fn test_toggle_replaces_zero_width_when_opening() {
        let current = Layout {
            properties_panel: PanelState {
                open: false,
                width: 0,
            },
        };
        let next = toggle_properties(Some(&current));
        assert_eq!(next.properties_panel.width, DEFAULT_PROPERTIES_WIDTH);
    }

    #[test]
    fn test_reset_opens_at_default_width() {
        let layout = reset_properties();
        assert!(layout.properties_panel.open);
        assert_eq!(layout.properties_panel.width, DEFAULT_PROPERTIES_WIDTH);
    }
}
