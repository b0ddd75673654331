//! Editor variants.
//!
//! Three notations crossed with two plugin policies. The restricted
//! ("cloud") policy never forwards host-supplied modules or schema
//! extensions into the engine; the drop is logged and otherwise silent,
//! so a restricted editor behaves exactly like a standard one built
//! without plugins.

use flowdeck_toolkit::{DiagramEngine, FormEngine, Notation, ToolkitOptions};

use crate::component::EditorCore;
use crate::host::Host;
use crate::menu;
use crate::props::EditorProps;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotationKind {
    Process,
    Decision,
    Form,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluginPolicy {
    /// Forward host-supplied plugins into the engine.
    Permissive,
    /// Drop host-supplied plugins, keeping only the config.
    Restricted,
}

fn build_options(policy: PluginPolicy, props: &EditorProps) -> ToolkitOptions {
    match policy {
        PluginPolicy::Permissive => ToolkitOptions::new()
            .with_plugins(&props.plugins)
            .with_config(props.config.clone()),
        PluginPolicy::Restricted => {
            if !props.plugins.is_empty() {
                tracing::warn!(
                    editor = %props.id,
                    modules = props.plugins.modules.len(),
                    extensions = props.plugins.extensions.len(),
                    "restricted editor drops host-supplied plugins"
                );
            }
            ToolkitOptions::new().with_config(props.config.clone())
        }
    }
}

fn diagram_core(
    notation: Notation,
    policy: PluginPolicy,
    props: EditorProps,
    host: &dyn Host,
) -> EditorCore<DiagramEngine> {
    let options = build_options(policy, &props);
    let engine = DiagramEngine::new(notation, options);
    EditorCore::new(props, engine, menu::diagram_menu, host)
}

/// Process diagram editor constructors.
pub struct ProcessEditor;

impl ProcessEditor {
    pub fn standard(props: EditorProps, host: &dyn Host) -> EditorCore<DiagramEngine> {
        diagram_core(Notation::Process, PluginPolicy::Permissive, props, host)
    }

    pub fn cloud(props: EditorProps, host: &dyn Host) -> EditorCore<DiagramEngine> {
        diagram_core(Notation::Process, PluginPolicy::Restricted, props, host)
    }
}

/// Decision diagram editor constructors.
pub struct DecisionEditor;

impl DecisionEditor {
    pub fn standard(props: EditorProps, host: &dyn Host) -> EditorCore<DiagramEngine> {
        diagram_core(Notation::Decision, PluginPolicy::Permissive, props, host)
    }

    pub fn cloud(props: EditorProps, host: &dyn Host) -> EditorCore<DiagramEngine> {
        diagram_core(Notation::Decision, PluginPolicy::Restricted, props, host)
    }
}

/// Form editor constructors.
pub struct FormEditor;

impl FormEditor {
    pub fn standard(props: EditorProps, host: &dyn Host) -> EditorCore<FormEngine> {
        let options = build_options(PluginPolicy::Permissive, &props);
        let engine = FormEngine::new(options);
        EditorCore::new(props, engine, menu::form_menu, host)
    }

    pub fn cloud(props: EditorProps, host: &dyn Host) -> EditorCore<FormEngine> {
        let options = build_options(PluginPolicy::Restricted, &props);
        let engine = FormEngine::new(options);
        EditorCore::new(props, engine, menu::form_menu, host)
    }
}
