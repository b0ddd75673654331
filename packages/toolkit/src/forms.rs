//! # Form Engine
//!
//! JSON-backed form editor engine. The model is a flat component list:
//!
//! ```text
//! { "components": [ { "id": "name", "type": "textfield", "label": "Name" } ] }
//! ```
//!
//! The engine shares the toolkit surface with the diagram engines but has
//! no canvas, so zoom, alignment and image export are not available.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::history::History;
use crate::{
    CommandStack, EditorActions, EventBus, EventKind, ExportError, ImageFormat, ImportError,
    ImportWarning, Selection, SubscriptionId, Toolkit, ToolkitError, ToolkitOptions,
};

/// One form component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormField {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl FormField {
    pub fn new(id: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            label: None,
        }
    }

    pub fn labeled(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct FormDocument {
    components: Vec<Value>,
}

/// Commands carry the component index so undo restores ordering.
#[derive(Debug, Clone)]
enum FormCommand {
    Add { index: usize, field: FormField },
    Remove { index: usize, field: FormField },
    Relabel { id: String, label: Option<String> },
}

#[derive(Debug, Default)]
struct FieldSelection {
    ids: Vec<String>,
}

impl Selection for FieldSelection {
    fn selected(&self) -> &[String] {
        &self.ids
    }
}

/// The form editor engine.
pub struct FormEngine {
    options: ToolkitOptions,
    fields: Vec<FormField>,
    history: History<FormCommand>,
    selection: FieldSelection,
    clipboard: Vec<FormField>,
    search_open: bool,
    paste_seq: u64,
    events: EventBus,
}

impl FormEngine {
    pub fn new(options: ToolkitOptions) -> Self {
        Self {
            options,
            fields: Vec::new(),
            history: History::new(),
            selection: FieldSelection::default(),
            clipboard: Vec::new(),
            search_open: false,
            paste_seq: 0,
            events: EventBus::new(),
        }
    }

    pub fn fields(&self) -> &[FormField] {
        &self.fields
    }

    pub fn field(&self, id: &str) -> Option<&FormField> {
        self.fields.iter().find(|f| f.id == id)
    }

    pub fn is_search_open(&self) -> bool {
        self.search_open
    }

    fn field_index(&self, id: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.id == id)
    }

    fn apply(fields: &mut Vec<FormField>, command: &FormCommand) {
        match command {
            FormCommand::Add { index, field } => {
                let index = (*index).min(fields.len());
                fields.insert(index, field.clone());
            }
            FormCommand::Remove { index, .. } => {
                if *index < fields.len() {
                    fields.remove(*index);
                }
            }
            FormCommand::Relabel { id, label } => {
                if let Some(field) = fields.iter_mut().find(|f| &f.id == id) {
                    field.label = label.clone();
                }
            }
        }
    }

    fn invert(&self, command: &FormCommand) -> Result<FormCommand, ToolkitError> {
        match command {
            FormCommand::Add { index, field } => Ok(FormCommand::Remove {
                index: *index,
                field: field.clone(),
            }),
            FormCommand::Remove { index, field } => Ok(FormCommand::Add {
                index: *index,
                field: field.clone(),
            }),
            FormCommand::Relabel { id, .. } => {
                let current = self.field(id).ok_or_else(|| unknown_field(id))?;
                Ok(FormCommand::Relabel {
                    id: id.clone(),
                    label: current.label.clone(),
                })
            }
        }
    }

    fn execute(&mut self, command: FormCommand) -> Result<(), ToolkitError> {
        if let FormCommand::Add { field, .. } = &command {
            if self.field(&field.id).is_some() {
                return Err(ToolkitError::InvalidContext(format!(
                    "duplicate field id {}",
                    field.id
                )));
            }
        }
        let inverse = self.invert(&command)?;
        Self::apply(&mut self.fields, &command);
        self.history.push(command, inverse);
        self.events.emit(EventKind::CommandStackChanged);
        Ok(())
    }

    fn undo(&mut self) -> bool {
        match self.history.undo() {
            Some(inverse) => {
                Self::apply(&mut self.fields, &inverse);
                self.events.emit(EventKind::CommandStackChanged);
                true
            }
            None => false,
        }
    }

    fn redo(&mut self) -> bool {
        match self.history.redo() {
            Some(forward) => {
                Self::apply(&mut self.fields, &forward);
                self.events.emit(EventKind::CommandStackChanged);
                true
            }
            None => false,
        }
    }

    fn set_selection(&mut self, ids: Vec<String>) {
        self.selection.ids = ids
            .into_iter()
            .filter(|id| self.field(id).is_some())
            .collect();
        self.events.emit(EventKind::SelectionChanged);
    }

    fn remove_selected(&mut self) -> Result<u64, ToolkitError> {
        let selected: Vec<String> = self.selection.ids.clone();
        let mut removed = 0;
        for id in selected {
            if let Some(index) = self.field_index(&id) {
                let field = self.fields[index].clone();
                self.execute(FormCommand::Remove { index, field })?;
                removed += 1;
            }
        }
        self.selection.ids.clear();
        self.events.emit(EventKind::SelectionChanged);
        Ok(removed)
    }

    fn paste_clipboard(&mut self) -> Result<Vec<String>, ToolkitError> {
        let mut pasted = Vec::new();
        for field in self.clipboard.clone() {
            self.paste_seq += 1;
            let mut copy = field;
            copy.id = format!("{}_copy_{}", copy.id, self.paste_seq);
            pasted.push(copy.id.clone());
            let index = self.fields.len();
            self.execute(FormCommand::Add { index, field: copy })?;
        }
        Ok(pasted)
    }
}

impl EditorActions for FormEngine {
    fn trigger_action(&mut self, action: &str, context: Value) -> Result<Value, ToolkitError> {
        match action {
            "undo" => Ok(json!(self.undo())),
            "redo" => Ok(json!(self.redo())),
            "addField" => {
                let mut field = FormField::new(
                    ctx_str(&context, "id")?,
                    ctx_str(&context, "kind")?,
                );
                if let Some(label) = context.get("label").and_then(Value::as_str) {
                    field = field.labeled(label);
                }
                let id = field.id.clone();
                let index = self.fields.len();
                self.execute(FormCommand::Add { index, field })?;
                Ok(json!(id))
            }
            "removeField" => {
                let id = ctx_str(&context, "id")?;
                let index = self.field_index(&id).ok_or_else(|| unknown_field(&id))?;
                let field = self.fields[index].clone();
                self.execute(FormCommand::Remove { index, field })?;
                self.selection.ids.retain(|selected| selected != &id);
                Ok(json!(id))
            }
            "renameField" => {
                let id = ctx_str(&context, "id")?;
                self.field(&id).ok_or_else(|| unknown_field(&id))?;
                let label = context
                    .get("label")
                    .and_then(Value::as_str)
                    .map(str::to_string);
                self.execute(FormCommand::Relabel {
                    id: id.clone(),
                    label,
                })?;
                Ok(json!(id))
            }
            "selectElements" => {
                let ids = context
                    .get("ids")
                    .and_then(Value::as_array)
                    .map(|ids| {
                        ids.iter()
                            .filter_map(Value::as_str)
                            .map(str::to_string)
                            .collect()
                    })
                    .ok_or_else(|| {
                        ToolkitError::InvalidContext("selectElements requires ids".to_string())
                    })?;
                self.set_selection(ids);
                Ok(json!(self.selection.ids.len()))
            }
            "selectAll" => {
                let ids = self.fields.iter().map(|f| f.id.clone()).collect();
                self.set_selection(ids);
                Ok(json!(self.selection.ids.len()))
            }
            "removeSelection" => Ok(json!(self.remove_selected()?)),
            "copy" => {
                self.clipboard = self
                    .selection
                    .ids
                    .iter()
                    .filter_map(|id| self.field(id).cloned())
                    .collect();
                self.events.emit(EventKind::ClipboardChanged);
                Ok(json!(self.clipboard.len()))
            }
            "cut" => {
                self.clipboard = self
                    .selection
                    .ids
                    .iter()
                    .filter_map(|id| self.field(id).cloned())
                    .collect();
                self.events.emit(EventKind::ClipboardChanged);
                Ok(json!(self.remove_selected()?))
            }
            "paste" => Ok(json!(self.paste_clipboard()?)),
            "find" => {
                self.search_open = true;
                self.events.emit(EventKind::SearchOpened);
                Ok(Value::Null)
            }
            "closeSearch" => {
                self.search_open = false;
                self.events.emit(EventKind::SearchClosed);
                Ok(Value::Null)
            }
            other => Err(ToolkitError::UnknownAction(other.to_string())),
        }
    }
}

impl Toolkit for FormEngine {
    fn import(&mut self, content: &str) -> Result<Vec<ImportWarning>, ImportError> {
        if content.trim().is_empty() {
            return Err(ImportError::new("empty document"));
        }
        let document: FormDocument = serde_json::from_str(content)
            .map_err(|e| ImportError::new(format!("malformed JSON: {e}")))?;

        let mut fields = Vec::new();
        let mut warnings = Vec::new();
        for component in document.components {
            match serde_json::from_value::<FormField>(component.clone()) {
                Ok(field) => fields.push(field),
                Err(_) => warnings.push(ImportWarning::new(format!(
                    "component without id or type skipped: {component}"
                ))),
            }
        }

        self.fields = fields;
        self.history.clear();
        self.selection.ids.clear();
        self.events.emit(EventKind::ImportDone);
        tracing::debug!(
            fields = self.fields.len(),
            warnings = warnings.len(),
            "form imported"
        );
        Ok(warnings)
    }

    fn export(&self) -> Result<String, ExportError> {
        let components = self
            .fields
            .iter()
            .map(|f| serde_json::to_value(f))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| ExportError::new(format!("failed to serialize form: {e}")))?;
        serde_json::to_string_pretty(&json!({ "components": components }))
            .map_err(|e| ExportError::new(format!("failed to serialize form: {e}")))
    }

    fn export_image(&self, _format: ImageFormat) -> Result<String, ExportError> {
        Err(ExportError::new(
            "form editor does not support image export",
        ))
    }

    fn commands(&self) -> &dyn CommandStack {
        &self.history
    }

    fn selection(&self) -> &dyn Selection {
        &self.selection
    }

    fn subscribe(&mut self, kinds: &[EventKind]) -> SubscriptionId {
        self.events.subscribe(kinds)
    }

    fn unsubscribe(&mut self, id: SubscriptionId) {
        self.events.unsubscribe(id);
    }

    fn drain_events(&mut self, id: SubscriptionId) -> Vec<EventKind> {
        self.events.drain(id)
    }

    fn attach(&mut self) {
        self.events.emit(EventKind::Attached);
    }

    fn notify_saved(&mut self) {
        self.events.emit(EventKind::SaveDone);
    }

    fn options(&self) -> &ToolkitOptions {
        &self.options
    }

    fn detach(&mut self) {
        self.events.clear();
    }
}

fn unknown_field(id: &str) -> ToolkitError {
    ToolkitError::InvalidContext(format!("unknown field id {id}"))
}

fn ctx_str(context: &Value, key: &str) -> Result<String, ToolkitError> {
    context
        .get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| ToolkitError::InvalidContext(format!("missing {key}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    const FORM_JSON: &str = r#"{
  "components": [
    { "id": "name", "type": "textfield", "label": "Name" },
    { "id": "submit", "type": "button" }
  ]
}"#;

    fn engine_with_form() -> FormEngine {
        let mut engine = FormEngine::new(ToolkitOptions::new());
        engine.import(FORM_JSON).unwrap();
        engine
    }

    #[test]
    fn test_import_reads_components() {
        let engine = engine_with_form();
        assert_eq!(engine.fields().len(), 2);
        assert_eq!(engine.field("name").unwrap().label.as_deref(), Some("Name"));
    }

    #[test]
    fn test_import_warns_on_bad_components() {
        let mut engine = FormEngine::new(ToolkitOptions::new());
        let warnings = engine
            .import(r#"{ "components": [ { "label": "no id" }, { "id": "a", "type": "text" } ] }"#)
            .unwrap();
        assert_eq!(warnings.len(), 1);
        assert_eq!(engine.fields().len(), 1);
    }

    #[test]
    fn test_import_rejects_malformed_json() {
        let mut engine = engine_with_form();
        let err = engine.import("{ not json").unwrap_err();
        assert!(err.message.contains("malformed"));
        // Previous model is kept.
        assert_eq!(engine.fields().len(), 2);
    }

    #[test]
    fn test_export_roundtrips_fields() {
        let engine = engine_with_form();
        let exported = engine.export().unwrap();

        let mut other = FormEngine::new(ToolkitOptions::new());
        other.import(&exported).unwrap();
        assert_eq!(other.fields(), engine.fields());
    }

    #[test]
    fn test_add_remove_undo_restores_order() {
        let mut engine = engine_with_form();
        engine
            .trigger_action("removeField", json!({ "id": "name" }))
            .unwrap();
        assert_eq!(engine.fields()[0].id, "submit");

        engine.trigger_action("undo", Value::Null).unwrap();
        assert_eq!(engine.fields()[0].id, "name");
    }

    #[test]
    fn test_rename_field() {
        let mut engine = engine_with_form();
        engine
            .trigger_action("renameField", json!({ "id": "name", "label": "Full name" }))
            .unwrap();
        assert_eq!(
            engine.field("name").unwrap().label.as_deref(),
            Some("Full name")
        );

        engine.trigger_action("undo", Value::Null).unwrap();
        assert_eq!(engine.field("name").unwrap().label.as_deref(), Some("Name"));
    }

    #[test]
    fn test_image_export_is_unsupported() {
        let engine = engine_with_form();
        let err = engine.export_image(ImageFormat::Png).unwrap_err();
        assert_eq!(err.to_string(), "form editor does not support image export");
    }

    #[test]
    fn test_cut_paste_moves_fields() {
        let mut engine = engine_with_form();
        engine
            .trigger_action("selectElements", json!({ "ids": ["name"] }))
            .unwrap();
        engine.trigger_action("cut", Value::Null).unwrap();
        assert_eq!(engine.fields().len(), 1);

        let pasted = engine.trigger_action("paste", Value::Null).unwrap();
        assert_eq!(pasted.as_array().unwrap().len(), 1);
        assert_eq!(engine.fields().len(), 2);
    }

    #[test]
    fn test_find_toggles_search_state() {
        let mut engine = engine_with_form();
        engine.trigger_action("find", Value::Null).unwrap();
        assert!(engine.is_search_open());
        engine.trigger_action("closeSearch", Value::Null).unwrap();
        assert!(!engine.is_search_open());
    }

    #[test]
    fn test_zoom_is_not_a_form_action() {
        let mut engine = engine_with_form();
        let err = engine.trigger_action("zoomIn", Value::Null).unwrap_err();
        assert!(matches!(err, ToolkitError::UnknownAction(_)));
    }
}
