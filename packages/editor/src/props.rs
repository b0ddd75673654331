//! Per-render editor inputs.

use flowdeck_common::{Config, EditorId, Plugins};

use crate::layout::Layout;

/// What the host hands the editor on construction and on every render.
///
/// The editor compares consecutive props to decide whether the toolkit
/// needs a re-import; the host never calls the toolkit directly.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorProps {
    pub id: EditorId,
    pub content: String,
    pub plugins: Plugins,
    pub config: Config,
    pub layout: Option<Layout>,
}

impl EditorProps {
    pub fn new(id: impl Into<EditorId>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            plugins: Plugins::default(),
            config: Config::default(),
            layout: None,
        }
    }

    pub fn with_plugins(mut self, plugins: Plugins) -> Self {
        self.plugins = plugins;
        self
    }

    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = Some(layout);
        self
    }

    /// Same props with different content, as a re-render would carry.
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }
}
