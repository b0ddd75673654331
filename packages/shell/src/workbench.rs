//! # Workbench
//!
//! Tabbed host shell over the editor layer. The workbench owns the
//! [`EditorCache`] outright: opening a tab hydrates it, switching tabs
//! mounts and unmounts without touching the factory, closing a tab
//! destroys the entry exactly once. Editor callbacks surface as a
//! notification stream the embedding process consumes.

use std::collections::HashMap;

use serde_json::Value;
use thiserror::Error;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio_stream::wrappers::UnboundedReceiverStream;

use flowdeck_common::{Config, EditorId, Plugins};
use flowdeck_editor::{
    CachedState, DecisionEditor, EditorCache, EditorCore, EditorProps, FormEditor, Host, Layout,
    NotationKind, PluginPolicy, ProcessEditor, Snapshot,
};
use flowdeck_toolkit::{DiagramEngine, ExportError, FormEngine, ImageFormat, ToolkitError};

use crate::notifications::{ChannelHost, Notification};

#[derive(Error, Debug)]
pub enum ShellError {
    #[error("unknown tab: {0}")]
    UnknownTab(EditorId),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error(transparent)]
    Toolkit(#[from] ToolkitError),
}

/// Everything needed to open one tab.
#[derive(Debug, Clone)]
pub struct TabDescriptor {
    pub id: EditorId,
    pub kind: NotationKind,
    pub policy: PluginPolicy,
    pub content: String,
    pub plugins: Plugins,
    pub config: Config,
}

impl TabDescriptor {
    pub fn new(id: impl Into<EditorId>, kind: NotationKind, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            policy: PluginPolicy::Permissive,
            content: content.into(),
            plugins: Plugins::default(),
            config: Config::default(),
        }
    }

    pub fn with_policy(mut self, policy: PluginPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_plugins(mut self, plugins: Plugins) -> Self {
        self.plugins = plugins;
        self
    }

    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    fn props(&self) -> EditorProps {
        EditorProps::new(self.id.clone(), self.content.clone())
            .with_plugins(self.plugins.clone())
            .with_config(self.config.clone())
    }
}

/// Cached editor for one tab, one variant per notation.
pub enum TabEditor {
    Process(EditorCore<DiagramEngine>),
    Decision(EditorCore<DiagramEngine>),
    Form(EditorCore<FormEngine>),
}

macro_rules! with_core {
    ($tab:expr, $core:ident => $body:expr) => {
        match $tab {
            TabEditor::Process($core) | TabEditor::Decision($core) => $body,
            TabEditor::Form($core) => $body,
        }
    };
}

impl TabEditor {
    fn update(&mut self, props: &EditorProps, host: &dyn Host) -> bool {
        with_core!(self, core => core.update(props, host))
    }

    fn attach(&mut self, host: &dyn Host) {
        with_core!(self, core => core.attach(host))
    }

    fn snapshot(&self) -> Snapshot {
        with_core!(self, core => core.snapshot())
    }

    fn is_dirty(&self) -> bool {
        with_core!(self, core => core.is_dirty())
    }

    fn trigger_action(
        &mut self,
        action: &str,
        context: Value,
        host: &dyn Host,
    ) -> Result<Value, ToolkitError> {
        with_core!(self, core => core.trigger_action(action, context, host))
    }

    fn content(&self, host: &dyn Host) -> Result<String, ExportError> {
        with_core!(self, core => core.content(host))
    }

    fn export_as(&self, format: ImageFormat, host: &dyn Host) -> Result<String, ExportError> {
        with_core!(self, core => core.export_as(format, host))
    }

    fn save(&mut self, host: &dyn Host) -> Result<String, ExportError> {
        with_core!(self, core => core.save(host))
    }

    fn toggle_properties(&mut self, current: Option<&Layout>, host: &dyn Host) -> Layout {
        with_core!(self, core => core.toggle_properties(current, host))
    }

    fn reset_properties(&mut self, host: &dyn Host) -> Layout {
        with_core!(self, core => core.reset_properties(host))
    }
}

impl CachedState for TabEditor {
    fn destroy(&mut self) {
        with_core!(self, core => core.destroy())
    }
}

/// The host shell state: cache, open tabs and the notification channel.
pub struct Workbench {
    cache: EditorCache<TabEditor>,
    props: HashMap<EditorId, EditorProps>,
    open_tabs: Vec<EditorId>,
    active: Option<EditorId>,
    tx: UnboundedSender<Notification>,
    rx: Option<UnboundedReceiver<Notification>>,
}

impl Workbench {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            cache: EditorCache::new(),
            props: HashMap::new(),
            open_tabs: Vec::new(),
            active: None,
            tx,
            rx: Some(rx),
        }
    }

    /// Take the notification stream. Yields `None` after the first call.
    pub fn notifications(&mut self) -> Option<UnboundedReceiverStream<Notification>> {
        self.rx.take().map(UnboundedReceiverStream::new)
    }

    fn host(&self, id: &EditorId) -> ChannelHost {
        ChannelHost::new(id.clone(), self.tx.clone())
    }

    fn tab_mut(&mut self, id: &EditorId) -> Result<&mut TabEditor, ShellError> {
        self.cache
            .get_mut(id)
            .ok_or_else(|| ShellError::UnknownTab(id.clone()))
    }

    /// Open a tab: hydrate the cache (building the editor only when no
    /// entry exists), run the initial import and activate it.
    pub fn open_tab(&mut self, descriptor: TabDescriptor) -> Result<Snapshot, ShellError> {
        let id = descriptor.id.clone();
        let host = self.host(&id);
        let props = descriptor.props();

        let tab = self
            .cache
            .hydrate::<_, ShellError>(&id, || Ok(build_tab(&descriptor, &host)))?;
        tab.update(&props, &host);
        let snapshot = tab.snapshot();

        self.props.insert(id.clone(), props);
        if !self.open_tabs.contains(&id) {
            self.open_tabs.push(id.clone());
        }
        self.active = Some(id);
        Ok(snapshot)
    }

    /// Activate an already-open tab. Does not touch the factory or the
    /// import gate.
    pub fn mount_tab(&mut self, id: &EditorId) -> Result<Snapshot, ShellError> {
        let host = self.host(id);
        let tab = self.tab_mut(id)?;
        tab.attach(&host);
        let snapshot = tab.snapshot();
        self.active = Some(id.clone());
        Ok(snapshot)
    }

    /// Deactivate the tab, keeping its state cached.
    pub fn unmount_tab(&mut self, id: &EditorId) {
        if self.active.as_ref() == Some(id) {
            self.active = None;
        }
    }

    /// Hand the tab new content. Returns whether the engine re-imported.
    pub fn update_tab(&mut self, id: &EditorId, content: &str) -> Result<bool, ShellError> {
        let props = self
            .props
            .get(id)
            .ok_or_else(|| ShellError::UnknownTab(id.clone()))?
            .clone()
            .with_content(content);
        let host = self.host(id);
        let tab = self.tab_mut(id)?;
        let imported = tab.update(&props, &host);
        self.props.insert(id.clone(), props);
        Ok(imported)
    }

    pub fn trigger(
        &mut self,
        id: &EditorId,
        action: &str,
        context: Value,
    ) -> Result<Value, ShellError> {
        let host = self.host(id);
        let tab = self.tab_mut(id)?;
        Ok(tab.trigger_action(action, context, &host)?)
    }

    pub fn content(&mut self, id: &EditorId) -> Result<String, ShellError> {
        let host = self.host(id);
        let tab = self.tab_mut(id)?;
        Ok(tab.content(&host)?)
    }

    pub fn export_as(&mut self, id: &EditorId, format: ImageFormat) -> Result<String, ShellError> {
        let host = self.host(id);
        let tab = self.tab_mut(id)?;
        Ok(tab.export_as(format, &host)?)
    }

    pub fn save_tab(&mut self, id: &EditorId) -> Result<String, ShellError> {
        let host = self.host(id);
        let tab = self.tab_mut(id)?;
        Ok(tab.save(&host)?)
    }

    pub fn snapshot(&self, id: &EditorId) -> Result<Snapshot, ShellError> {
        self.cache
            .get(id)
            .map(TabEditor::snapshot)
            .ok_or_else(|| ShellError::UnknownTab(id.clone()))
    }

    pub fn is_dirty(&self, id: &EditorId) -> Result<bool, ShellError> {
        self.cache
            .get(id)
            .map(TabEditor::is_dirty)
            .ok_or_else(|| ShellError::UnknownTab(id.clone()))
    }

    pub fn toggle_properties(
        &mut self,
        id: &EditorId,
        current: Option<&Layout>,
    ) -> Result<Layout, ShellError> {
        let host = self.host(id);
        let tab = self.tab_mut(id)?;
        Ok(tab.toggle_properties(current, &host))
    }

    pub fn reset_properties(&mut self, id: &EditorId) -> Result<Layout, ShellError> {
        let host = self.host(id);
        let tab = self.tab_mut(id)?;
        Ok(tab.reset_properties(&host))
    }

    /// Destroy the tab's cache entry. Closing an unknown id is a no-op.
    pub fn close_tab(&mut self, id: &EditorId) {
        self.cache.destroy(id);
        self.props.remove(id);
        self.open_tabs.retain(|open| open != id);
        if self.active.as_ref() == Some(id) {
            self.active = None;
        }
    }

    pub fn open_tabs(&self) -> &[EditorId] {
        &self.open_tabs
    }

    pub fn active_tab(&self) -> Option<&EditorId> {
        self.active.as_ref()
    }

    /// Tear down every tab.
    pub fn shutdown(&mut self) {
        tracing::info!(tabs = self.open_tabs.len(), "workbench shutting down");
        self.cache.destroy_all();
        self.props.clear();
        self.open_tabs.clear();
        self.active = None;
    }
}

impl Default for Workbench {
    fn default() -> Self {
        Self::new()
    }
}

fn build_tab(descriptor: &TabDescriptor, host: &dyn Host) -> TabEditor {
    let props = descriptor.props();
    match (descriptor.kind, descriptor.policy) {
        (NotationKind::Process, PluginPolicy::Permissive) => {
            TabEditor::Process(ProcessEditor::standard(props, host))
        }
        (NotationKind::Process, PluginPolicy::Restricted) => {
            TabEditor::Process(ProcessEditor::cloud(props, host))
        }
        (NotationKind::Decision, PluginPolicy::Permissive) => {
            TabEditor::Decision(DecisionEditor::standard(props, host))
        }
        (NotationKind::Decision, PluginPolicy::Restricted) => {
            TabEditor::Decision(DecisionEditor::cloud(props, host))
        }
        (NotationKind::Form, PluginPolicy::Permissive) => {
            TabEditor::Form(FormEditor::standard(props, host))
        }
        (NotationKind::Form, PluginPolicy::Restricted) => {
            TabEditor::Form(FormEditor::cloud(props, host))
        }
    }
}
