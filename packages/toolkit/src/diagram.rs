//! # Diagram Engine
//!
//! Reference modeling engine for the XML notations (process and decision
//! diagrams). The engine owns the element store, the command history, the
//! selection and the canvas view state, and raises every state change as
//! an event on its bus.
//!
//! Content is a small XML dialect:
//!
//! ```text
//! <definitions id="defs_1">
//!   <process id="proc_1">
//!     <task id="t1" name="Review order" x="120" y="80"/>
//!   </process>
//! </definitions>
//! ```
//!
//! Unknown tags are imported with a warning; malformed XML or a wrong
//! root element fails the import and keeps the previous model.

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};
use serde_json::{json, Value};

use crate::history::History;
use crate::image::{data_uri, raster_bytes};
use crate::{
    CommandStack, EditorActions, EventBus, EventKind, ExportError, ImageFormat, ImportError,
    ImportWarning, Selection, SubscriptionId, Toolkit, ToolkitError, ToolkitOptions,
};

const ZOOM_STEP: f64 = 0.25;
const ZOOM_MIN: f64 = 0.2;
const ZOOM_MAX: f64 = 4.0;

/// Supported diagram notations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notation {
    Process,
    Decision,
}

impl Notation {
    fn container_tag(&self) -> &'static str {
        match self {
            Notation::Process => "process",
            Notation::Decision => "decision",
        }
    }

    fn known_kinds(&self) -> &'static [&'static str] {
        match self {
            Notation::Process => &["task", "gateway", "event", "subprocess", "flow"],
            Notation::Decision => &["decision-table", "input-data", "knowledge-source"],
        }
    }

    fn default_container_id(&self) -> &'static str {
        match self {
            Notation::Process => "process_1",
            Notation::Decision => "decision_1",
        }
    }
}

/// One element of the diagram model.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub id: String,
    pub kind: String,
    pub name: Option<String>,
    pub x: i64,
    pub y: i64,
}

impl Element {
    pub fn new(id: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            name: None,
            x: 0,
            y: 0,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn at(mut self, x: i64, y: i64) -> Self {
        self.x = x;
        self.y = y;
        self
    }
}

/// Current canvas zoom.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Zoom {
    Level(f64),
    FitViewport,
}

impl Zoom {
    fn as_json(&self) -> Value {
        match self {
            Zoom::Level(level) => json!(level),
            Zoom::FitViewport => json!("fit-viewport"),
        }
    }

    fn level(&self) -> f64 {
        match self {
            Zoom::Level(level) => *level,
            Zoom::FitViewport => 1.0,
        }
    }
}

#[derive(Debug, Clone)]
struct DiagramModel {
    root_id: String,
    container_id: String,
    container_name: Option<String>,
    elements: Vec<Element>,
}

impl DiagramModel {
    fn empty(notation: Notation) -> Self {
        Self {
            root_id: "definitions_1".to_string(),
            container_id: notation.default_container_id().to_string(),
            container_name: None,
            elements: Vec::new(),
        }
    }

    fn element(&self, id: &str) -> Option<&Element> {
        self.elements.iter().find(|e| e.id == id)
    }

    fn element_mut(&mut self, id: &str) -> Option<&mut Element> {
        self.elements.iter_mut().find(|e| e.id == id)
    }
}

#[derive(Debug, Default)]
struct SelectionState {
    ids: Vec<String>,
}

impl Selection for SelectionState {
    fn selected(&self) -> &[String] {
        &self.ids
    }
}

/// Model commands; inverses are computed before application.
#[derive(Debug, Clone)]
enum DiagramCommand {
    Create(Element),
    Remove(Element),
    Rename { id: String, name: Option<String> },
    MoveTo { id: String, x: i64, y: i64 },
}

/// The diagram modeling engine.
pub struct DiagramEngine {
    notation: Notation,
    options: ToolkitOptions,
    model: DiagramModel,
    history: History<DiagramCommand>,
    selection: SelectionState,
    clipboard: Vec<Element>,
    zoom: Zoom,
    canvas_offset: (i64, i64),
    search_open: bool,
    direct_editing: bool,
    paste_seq: u64,
    events: EventBus,
}

impl DiagramEngine {
    pub fn new(notation: Notation, options: ToolkitOptions) -> Self {
        Self {
            notation,
            options,
            model: DiagramModel::empty(notation),
            history: History::new(),
            selection: SelectionState::default(),
            clipboard: Vec::new(),
            zoom: Zoom::Level(1.0),
            canvas_offset: (0, 0),
            search_open: false,
            direct_editing: false,
            paste_seq: 0,
            events: EventBus::new(),
        }
    }

    pub fn notation(&self) -> Notation {
        self.notation
    }

    pub fn elements(&self) -> &[Element] {
        &self.model.elements
    }

    pub fn element(&self, id: &str) -> Option<&Element> {
        self.model.element(id)
    }

    pub fn zoom(&self) -> Zoom {
        self.zoom
    }

    pub fn is_search_open(&self) -> bool {
        self.search_open
    }

    pub fn is_direct_editing(&self) -> bool {
        self.direct_editing
    }

    /// Focus moved into a properties-panel input.
    pub fn focus_properties_panel(&mut self) {
        self.events.emit(EventKind::PropertiesFocusIn);
    }

    /// Focus left the properties panel.
    pub fn blur_properties_panel(&mut self) {
        self.events.emit(EventKind::PropertiesFocusOut);
    }

    fn apply(model: &mut DiagramModel, command: &DiagramCommand) {
        match command {
            DiagramCommand::Create(element) => model.elements.push(element.clone()),
            DiagramCommand::Remove(element) => model.elements.retain(|e| e.id != element.id),
            DiagramCommand::Rename { id, name } => {
                if let Some(element) = model.element_mut(id) {
                    element.name = name.clone();
                }
            }
            DiagramCommand::MoveTo { id, x, y } => {
                if let Some(element) = model.element_mut(id) {
                    element.x = *x;
                    element.y = *y;
                }
            }
        }
    }

    fn invert(&self, command: &DiagramCommand) -> Result<DiagramCommand, ToolkitError> {
        match command {
            DiagramCommand::Create(element) => Ok(DiagramCommand::Remove(element.clone())),
            DiagramCommand::Remove(element) => Ok(DiagramCommand::Create(
                self.model
                    .element(&element.id)
                    .cloned()
                    .ok_or_else(|| unknown_element(&element.id))?,
            )),
            DiagramCommand::Rename { id, .. } => {
                let current = self.model.element(id).ok_or_else(|| unknown_element(id))?;
                Ok(DiagramCommand::Rename {
                    id: id.clone(),
                    name: current.name.clone(),
                })
            }
            DiagramCommand::MoveTo { id, .. } => {
                let current = self.model.element(id).ok_or_else(|| unknown_element(id))?;
                Ok(DiagramCommand::MoveTo {
                    id: id.clone(),
                    x: current.x,
                    y: current.y,
                })
            }
        }
    }

    fn execute(&mut self, command: DiagramCommand) -> Result<(), ToolkitError> {
        if let DiagramCommand::Create(element) = &command {
            if self.model.element(&element.id).is_some() {
                return Err(ToolkitError::InvalidContext(format!(
                    "duplicate element id {}",
                    element.id
                )));
            }
        }
        let inverse = self.invert(&command)?;
        Self::apply(&mut self.model, &command);
        self.history.push(command, inverse);
        self.events.emit(EventKind::CommandStackChanged);
        Ok(())
    }

    fn undo(&mut self) -> bool {
        match self.history.undo() {
            Some(inverse) => {
                Self::apply(&mut self.model, &inverse);
                self.events.emit(EventKind::CommandStackChanged);
                true
            }
            None => false,
        }
    }

    fn redo(&mut self) -> bool {
        match self.history.redo() {
            Some(forward) => {
                Self::apply(&mut self.model, &forward);
                self.events.emit(EventKind::CommandStackChanged);
                true
            }
            None => false,
        }
    }

    fn set_selection(&mut self, ids: Vec<String>) {
        self.selection.ids = ids
            .into_iter()
            .filter(|id| self.model.element(id).is_some())
            .collect();
        self.events.emit(EventKind::SelectionChanged);
    }

    fn remove_selected(&mut self) -> Result<u64, ToolkitError> {
        let selected: Vec<Element> = self
            .selection
            .ids
            .iter()
            .filter_map(|id| self.model.element(id).cloned())
            .collect();
        let removed = selected.len() as u64;
        for element in selected {
            self.execute(DiagramCommand::Remove(element))?;
        }
        self.selection.ids.clear();
        self.events.emit(EventKind::SelectionChanged);
        Ok(removed)
    }

    fn paste_clipboard(&mut self) -> Result<Vec<String>, ToolkitError> {
        let mut pasted = Vec::new();
        for element in self.clipboard.clone() {
            self.paste_seq += 1;
            let mut copy = element;
            copy.id = format!("{}_copy_{}", copy.id, self.paste_seq);
            copy.x += 20;
            copy.y += 20;
            pasted.push(copy.id.clone());
            self.execute(DiagramCommand::Create(copy))?;
        }
        Ok(pasted)
    }

    fn align_selected(&mut self, alignment: &str) -> Result<u64, ToolkitError> {
        let selected: Vec<Element> = self
            .selection
            .ids
            .iter()
            .filter_map(|id| self.model.element(id).cloned())
            .collect();
        if selected.is_empty() {
            return Ok(0);
        }

        let target = match alignment {
            "left" => selected.iter().map(|e| e.x).min(),
            "right" => selected.iter().map(|e| e.x).max(),
            "center" => Some(selected.iter().map(|e| e.x).sum::<i64>() / selected.len() as i64),
            "top" => selected.iter().map(|e| e.y).min(),
            "bottom" => selected.iter().map(|e| e.y).max(),
            "middle" => Some(selected.iter().map(|e| e.y).sum::<i64>() / selected.len() as i64),
            other => {
                return Err(ToolkitError::InvalidContext(format!(
                    "unknown alignment {other}"
                )))
            }
        };
        let target = target.unwrap_or(0);
        let horizontal = matches!(alignment, "left" | "right" | "center");

        let mut moved = 0;
        for element in selected {
            let (x, y) = if horizontal {
                (target, element.y)
            } else {
                (element.x, target)
            };
            if (x, y) != (element.x, element.y) {
                self.execute(DiagramCommand::MoveTo {
                    id: element.id.clone(),
                    x,
                    y,
                })?;
                moved += 1;
            }
        }
        Ok(moved)
    }

    fn distribute_selected(&mut self, axis: &str) -> Result<u64, ToolkitError> {
        let horizontal = match axis {
            "horizontal" => true,
            "vertical" => false,
            other => {
                return Err(ToolkitError::InvalidContext(format!(
                    "unknown distribution axis {other}"
                )))
            }
        };

        let mut selected: Vec<Element> = self
            .selection
            .ids
            .iter()
            .filter_map(|id| self.model.element(id).cloned())
            .collect();
        if selected.len() < 3 {
            return Ok(0);
        }
        selected.sort_by_key(|e| if horizontal { e.x } else { e.y });

        let first = if horizontal {
            selected[0].x
        } else {
            selected[0].y
        };
        let last = if horizontal {
            selected[selected.len() - 1].x
        } else {
            selected[selected.len() - 1].y
        };
        let gap = (last - first) / (selected.len() as i64 - 1);

        let mut moved = 0;
        for (index, element) in selected.iter().enumerate().skip(1) {
            if index == selected.len() - 1 {
                continue;
            }
            let position = first + gap * index as i64;
            let (x, y) = if horizontal {
                (position, element.y)
            } else {
                (element.x, position)
            };
            if (x, y) != (element.x, element.y) {
                self.execute(DiagramCommand::MoveTo {
                    id: element.id.clone(),
                    x,
                    y,
                })?;
                moved += 1;
            }
        }
        Ok(moved)
    }

    fn step_zoom(&mut self, steps: f64) -> Value {
        let level = (self.zoom.level() + steps * ZOOM_STEP).clamp(ZOOM_MIN, ZOOM_MAX);
        self.zoom = Zoom::Level(level);
        self.zoom.as_json()
    }

    fn bounds(&self) -> (u32, u32) {
        let width = self
            .model
            .elements
            .iter()
            .map(|e| e.x + 140)
            .max()
            .unwrap_or(0)
            .max(300);
        let height = self
            .model
            .elements
            .iter()
            .map(|e| e.y + 120)
            .max()
            .unwrap_or(0)
            .max(200);
        (width as u32, height as u32)
    }

    fn render_svg(&self) -> String {
        let (width, height) = self.bounds();
        let mut svg = format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" \
             viewBox=\"0 0 {width} {height}\">\n"
        );
        for element in &self.model.elements {
            svg.push_str(&format!(
                "  <rect x=\"{}\" y=\"{}\" width=\"100\" height=\"80\" \
                 data-element-id=\"{}\" fill=\"none\" stroke=\"black\"/>\n",
                element.x,
                element.y,
                xml_escape(&element.id)
            ));
            if let Some(name) = &element.name {
                svg.push_str(&format!(
                    "  <text x=\"{}\" y=\"{}\">{}</text>\n",
                    element.x + 10,
                    element.y + 45,
                    xml_escape(name)
                ));
            }
        }
        svg.push_str("</svg>");
        svg
    }
}

impl EditorActions for DiagramEngine {
    fn trigger_action(&mut self, action: &str, context: Value) -> Result<Value, ToolkitError> {
        match action {
            "undo" => Ok(json!(self.undo())),
            "redo" => Ok(json!(self.redo())),
            "stepZoom" => {
                let steps = ctx_f64(&context, "value")?;
                Ok(self.step_zoom(steps))
            }
            "zoomIn" => Ok(self.step_zoom(1.0)),
            "zoomOut" => Ok(self.step_zoom(-1.0)),
            "zoom" => {
                match context.get("value") {
                    Some(Value::String(s)) if s == "fit-viewport" => {
                        self.zoom = Zoom::FitViewport;
                    }
                    Some(Value::Number(n)) => {
                        let level = n.as_f64().unwrap_or(1.0).clamp(ZOOM_MIN, ZOOM_MAX);
                        self.zoom = Zoom::Level(level);
                    }
                    _ => {
                        return Err(ToolkitError::InvalidContext(
                            "zoom requires a numeric value or \"fit-viewport\"".to_string(),
                        ))
                    }
                }
                Ok(self.zoom.as_json())
            }
            "resetZoom" => {
                self.zoom = Zoom::Level(1.0);
                Ok(self.zoom.as_json())
            }
            "fitViewport" => {
                self.zoom = Zoom::FitViewport;
                Ok(self.zoom.as_json())
            }
            "createElement" => {
                let kind = ctx_str(&context, "kind")?;
                if !self.notation.known_kinds().contains(&kind.as_str()) {
                    return Err(ToolkitError::InvalidContext(format!(
                        "unknown element kind {kind}"
                    )));
                }
                let mut element = Element::new(ctx_str(&context, "id")?, kind);
                element.name = ctx_opt_str(&context, "name");
                element.x = ctx_i64_or(&context, "x", 0);
                element.y = ctx_i64_or(&context, "y", 0);
                let id = element.id.clone();
                self.execute(DiagramCommand::Create(element))?;
                Ok(json!(id))
            }
            "removeElement" => {
                let id = ctx_str(&context, "id")?;
                let element = self
                    .model
                    .element(&id)
                    .cloned()
                    .ok_or_else(|| unknown_element(&id))?;
                self.execute(DiagramCommand::Remove(element))?;
                self.selection.ids.retain(|selected| selected != &id);
                Ok(json!(id))
            }
            "renameElement" => {
                let id = ctx_str(&context, "id")?;
                let name = ctx_opt_str(&context, "name");
                self.model.element(&id).ok_or_else(|| unknown_element(&id))?;
                self.execute(DiagramCommand::Rename {
                    id: id.clone(),
                    name,
                })?;
                Ok(json!(id))
            }
            "moveElement" => {
                let id = ctx_str(&context, "id")?;
                self.model.element(&id).ok_or_else(|| unknown_element(&id))?;
                self.execute(DiagramCommand::MoveTo {
                    id: id.clone(),
                    x: ctx_i64_or(&context, "x", 0),
                    y: ctx_i64_or(&context, "y", 0),
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
                let ids = self.model.elements.iter().map(|e| e.id.clone()).collect();
                self.set_selection(ids);
                Ok(json!(self.selection.ids.len()))
            }
            "removeSelection" => Ok(json!(self.remove_selected()?)),
            "copy" => {
                self.clipboard = self
                    .selection
                    .ids
                    .iter()
                    .filter_map(|id| self.model.element(id).cloned())
                    .collect();
                self.events.emit(EventKind::ClipboardChanged);
                Ok(json!(self.clipboard.len()))
            }
            "cut" => {
                self.clipboard = self
                    .selection
                    .ids
                    .iter()
                    .filter_map(|id| self.model.element(id).cloned())
                    .collect();
                self.events.emit(EventKind::ClipboardChanged);
                Ok(json!(self.remove_selected()?))
            }
            "paste" => Ok(json!(self.paste_clipboard()?)),
            "alignElements" => {
                let alignment = ctx_str(&context, "alignment")?;
                Ok(json!(self.align_selected(&alignment)?))
            }
            "distributeElements" => {
                let axis = ctx_str(&context, "axis")?;
                Ok(json!(self.distribute_selected(&axis)?))
            }
            "moveCanvas" => {
                let distance = ctx_i64_or(&context, "speed", 50);
                let (dx, dy) = match ctx_str(&context, "direction")?.as_str() {
                    "up" => (0, -distance),
                    "down" => (0, distance),
                    "left" => (-distance, 0),
                    "right" => (distance, 0),
                    other => {
                        return Err(ToolkitError::InvalidContext(format!(
                            "unknown direction {other}"
                        )))
                    }
                };
                self.canvas_offset.0 += dx;
                self.canvas_offset.1 += dy;
                Ok(json!({ "x": self.canvas_offset.0, "y": self.canvas_offset.1 }))
            }
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
            "directEditing" => {
                self.direct_editing = !self.direct_editing;
                self.events.emit(if self.direct_editing {
                    EventKind::DirectEditingActivated
                } else {
                    EventKind::DirectEditingDeactivated
                });
                Ok(json!(self.direct_editing))
            }
            other => Err(ToolkitError::UnknownAction(other.to_string())),
        }
    }
}

impl Toolkit for DiagramEngine {
    fn import(&mut self, content: &str) -> Result<Vec<ImportWarning>, ImportError> {
        let (model, warnings) = parse_document(self.notation, content)?;
        self.model = model;
        self.history.clear();
        self.selection.ids.clear();
        self.events.emit(EventKind::ImportDone);
        tracing::debug!(
            elements = self.model.elements.len(),
            warnings = warnings.len(),
            "diagram imported"
        );
        Ok(warnings)
    }

    fn export(&self) -> Result<String, ExportError> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(export_write_err)?;

        let mut root = BytesStart::new("definitions");
        root.push_attribute(("id", self.model.root_id.as_str()));
        writer
            .write_event(Event::Start(root))
            .map_err(export_write_err)?;

        let container_tag = self.notation.container_tag();
        let mut container = BytesStart::new(container_tag);
        container.push_attribute(("id", self.model.container_id.as_str()));
        if let Some(name) = &self.model.container_name {
            container.push_attribute(("name", name.as_str()));
        }
        writer
            .write_event(Event::Start(container))
            .map_err(export_write_err)?;

        for element in &self.model.elements {
            let mut tag = BytesStart::new(element.kind.as_str());
            tag.push_attribute(("id", element.id.as_str()));
            if let Some(name) = &element.name {
                tag.push_attribute(("name", name.as_str()));
            }
            tag.push_attribute(("x", element.x.to_string().as_str()));
            tag.push_attribute(("y", element.y.to_string().as_str()));
            writer
                .write_event(Event::Empty(tag))
                .map_err(export_write_err)?;
        }

        writer
            .write_event(Event::End(BytesEnd::new(container_tag)))
            .map_err(export_write_err)?;
        writer
            .write_event(Event::End(BytesEnd::new("definitions")))
            .map_err(export_write_err)?;

        String::from_utf8(writer.into_inner()).map_err(export_write_err)
    }

    fn export_image(&self, format: ImageFormat) -> Result<String, ExportError> {
        match format {
            ImageFormat::Svg => Ok(self.render_svg()),
            ImageFormat::Png | ImageFormat::Jpeg => {
                let (width, height) = self.bounds();
                Ok(data_uri(format, &raster_bytes(format, width, height)))
            }
        }
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

impl<C: Clone> CommandStack for History<C> {
    fn can_undo(&self) -> bool {
        History::can_undo(self)
    }

    fn can_redo(&self) -> bool {
        History::can_redo(self)
    }

    fn position(&self) -> u64 {
        History::position(self)
    }
}

fn export_write_err(e: impl std::fmt::Display) -> ExportError {
    ExportError::new(format!("failed to serialize diagram: {e}"))
}

fn unknown_element(id: &str) -> ToolkitError {
    ToolkitError::InvalidContext(format!("unknown element id {id}"))
}

fn ctx_str(context: &Value, key: &str) -> Result<String, ToolkitError> {
    context
        .get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| ToolkitError::InvalidContext(format!("missing {key}")))
}

fn ctx_opt_str(context: &Value, key: &str) -> Option<String> {
    context.get(key).and_then(Value::as_str).map(str::to_string)
}

fn ctx_f64(context: &Value, key: &str) -> Result<f64, ToolkitError> {
    context
        .get(key)
        .and_then(Value::as_f64)
        .ok_or_else(|| ToolkitError::InvalidContext(format!("missing {key}")))
}

fn ctx_i64_or(context: &Value, key: &str, default: i64) -> i64 {
    context.get(key).and_then(Value::as_i64).unwrap_or(default)
}

fn xml_escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn tag_name(start: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(start.name().as_ref()).into_owned()
}

fn tag_attributes(start: &BytesStart<'_>) -> Result<Vec<(String, String)>, ImportError> {
    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| ImportError::new(format!("malformed attribute: {e}")))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|e| ImportError::new(format!("malformed attribute value: {e}")))?
            .into_owned();
        attributes.push((key, value));
    }
    Ok(attributes)
}

fn attribute<'a>(attributes: &'a [(String, String)], key: &str) -> Option<&'a str> {
    attributes
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

fn parse_document(
    notation: Notation,
    content: &str,
) -> Result<(DiagramModel, Vec<ImportWarning>), ImportError> {
    if content.trim().is_empty() {
        return Err(ImportError::new("empty document"));
    }

    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    let container_tag = notation.container_tag();
    let mut model = DiagramModel::empty(notation);
    let mut warnings = Vec::new();
    let mut open_tags: Vec<String> = Vec::new();
    let mut seen_root = false;
    let mut seen_container = false;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| ImportError::new(format!("malformed XML: {e}")))?;
        let (start, self_closing) = match event {
            Event::Start(start) => (start, false),
            Event::Empty(start) => (start, true),
            Event::End(_) => {
                open_tags.pop();
                continue;
            }
            Event::Eof => break,
            _ => continue,
        };

        let name = tag_name(&start);
        let attributes = tag_attributes(&start)?;

        match open_tags.len() {
            0 => {
                if name != "definitions" {
                    return Err(ImportError::new(format!(
                        "unexpected root element <{name}>, expected <definitions>"
                    )));
                }
                seen_root = true;
                if let Some(id) = attribute(&attributes, "id") {
                    model.root_id = id.to_string();
                }
            }
            1 => {
                if name == container_tag {
                    seen_container = true;
                    if let Some(id) = attribute(&attributes, "id") {
                        model.container_id = id.to_string();
                    }
                    model.container_name = attribute(&attributes, "name").map(str::to_string);
                } else {
                    warnings.push(ImportWarning::new(format!(
                        "unknown element <{name}> ignored"
                    )));
                }
            }
            2 if open_tags[1] == container_tag => {
                if notation.known_kinds().contains(&name.as_str()) {
                    match attribute(&attributes, "id") {
                        Some(id) => {
                            let mut element = Element::new(id, name.clone()).at(
                                attribute(&attributes, "x")
                                    .and_then(|v| v.parse().ok())
                                    .unwrap_or(0),
                                attribute(&attributes, "y")
                                    .and_then(|v| v.parse().ok())
                                    .unwrap_or(0),
                            );
                            if let Some(label) = attribute(&attributes, "name") {
                                element = element.named(label);
                            }
                            model.elements.push(element);
                        }
                        None => warnings.push(ImportWarning::new(format!(
                            "element <{name}> without id skipped"
                        ))),
                    }
                } else {
                    warnings.push(ImportWarning::new(format!(
                        "unknown element <{name}> ignored"
                    )));
                }
            }
            _ => warnings.push(ImportWarning::new(format!(
                "unexpected nested element <{name}> ignored"
            ))),
        }

        if !self_closing {
            open_tags.push(name);
        }
    }

    if !seen_root {
        return Err(ImportError::new("empty document"));
    }
    if !seen_container {
        return Err(ImportError::new(format!(
            "missing <{container_tag}> definition"
        )));
    }

    Ok((model, warnings))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROCESS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<definitions id="defs_1">
  <process id="proc_1" name="Order handling">
    <task id="t1" name="Review order" x="120" y="80"/>
    <gateway id="g1" x="260" y="80"/>
  </process>
</definitions>"#;

    fn engine_with_diagram() -> DiagramEngine {
        let mut engine = DiagramEngine::new(Notation::Process, ToolkitOptions::new());
        engine.import(PROCESS_XML).unwrap();
        engine
    }

    #[test]
    fn test_import_reads_elements() {
        let engine = engine_with_diagram();
        assert_eq!(engine.elements().len(), 2);
        assert_eq!(
            engine.element("t1").unwrap().name.as_deref(),
            Some("Review order")
        );
    }

    #[test]
    fn test_import_warns_on_unknown_tags() {
        let mut engine = DiagramEngine::new(Notation::Process, ToolkitOptions::new());
        let warnings = engine
            .import(
                r#"<definitions><process id="p"><widget id="w1"/><task id="t1"/></process></definitions>"#,
            )
            .unwrap();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].message.contains("widget"));
        assert_eq!(engine.elements().len(), 1);
    }

    #[test]
    fn test_import_rejects_malformed_xml() {
        let mut engine = engine_with_diagram();
        let err = engine.import("<definitions><process id=").unwrap_err();
        assert!(err.message.contains("malformed"));
        // Previous model is kept.
        assert_eq!(engine.elements().len(), 2);
    }

    #[test]
    fn test_import_rejects_wrong_root() {
        let mut engine = DiagramEngine::new(Notation::Process, ToolkitOptions::new());
        let err = engine.import("<diagram/>").unwrap_err();
        assert!(err.message.contains("root"));
    }

    #[test]
    fn test_import_requires_container() {
        let mut engine = DiagramEngine::new(Notation::Decision, ToolkitOptions::new());
        let err = engine
            .import(r#"<definitions><process id="p"/></definitions>"#)
            .unwrap_err();
        assert!(err.message.contains("<decision>"));
    }

    #[test]
    fn test_export_roundtrips_model() {
        let engine = engine_with_diagram();
        let xml = engine.export().unwrap();

        let mut other = DiagramEngine::new(Notation::Process, ToolkitOptions::new());
        other.import(&xml).unwrap();
        assert_eq!(other.elements(), engine.elements());
    }

    #[test]
    fn test_create_and_undo() {
        let mut engine = engine_with_diagram();
        engine
            .trigger_action(
                "createElement",
                serde_json::json!({ "id": "t2", "kind": "task", "name": "Ship" }),
            )
            .unwrap();
        assert_eq!(engine.elements().len(), 3);
        assert!(engine.commands().can_undo());

        engine.trigger_action("undo", Value::Null).unwrap();
        assert_eq!(engine.elements().len(), 2);
        assert!(engine.commands().can_redo());
    }

    #[test]
    fn test_duplicate_create_is_rejected() {
        let mut engine = engine_with_diagram();
        let err = engine
            .trigger_action(
                "createElement",
                serde_json::json!({ "id": "t1", "kind": "task" }),
            )
            .unwrap_err();
        assert!(matches!(err, ToolkitError::InvalidContext(_)));
    }

    #[test]
    fn test_selection_and_remove_selection() {
        let mut engine = engine_with_diagram();
        engine.trigger_action("selectAll", Value::Null).unwrap();
        assert_eq!(engine.selection().len(), 2);

        engine
            .trigger_action("removeSelection", Value::Null)
            .unwrap();
        assert!(engine.elements().is_empty());
        assert!(engine.selection().is_empty());

        // Both removals are undoable.
        engine.trigger_action("undo", Value::Null).unwrap();
        engine.trigger_action("undo", Value::Null).unwrap();
        assert_eq!(engine.elements().len(), 2);
    }

    #[test]
    fn test_copy_paste_creates_fresh_ids() {
        let mut engine = engine_with_diagram();
        engine
            .trigger_action("selectElements", serde_json::json!({ "ids": ["t1"] }))
            .unwrap();
        engine.trigger_action("copy", Value::Null).unwrap();
        let pasted = engine.trigger_action("paste", Value::Null).unwrap();

        let ids = pasted.as_array().unwrap();
        assert_eq!(ids.len(), 1);
        assert_ne!(ids[0].as_str().unwrap(), "t1");
        assert_eq!(engine.elements().len(), 3);
    }

    #[test]
    fn test_zoom_actions() {
        let mut engine = engine_with_diagram();
        assert_eq!(
            engine.trigger_action("zoomIn", Value::Null).unwrap(),
            serde_json::json!(1.25)
        );
        assert_eq!(engine.zoom(), Zoom::Level(1.25));
        assert_eq!(
            engine
                .trigger_action("zoom", serde_json::json!({ "value": "fit-viewport" }))
                .unwrap(),
            serde_json::json!("fit-viewport")
        );
        assert_eq!(engine.zoom(), Zoom::FitViewport);
        assert_eq!(
            engine.trigger_action("resetZoom", Value::Null).unwrap(),
            serde_json::json!(1.0)
        );
    }

    #[test]
    fn test_search_and_direct_editing_state() {
        let mut engine = engine_with_diagram();
        assert!(!engine.is_search_open());

        engine.trigger_action("find", Value::Null).unwrap();
        assert!(engine.is_search_open());
        engine.trigger_action("closeSearch", Value::Null).unwrap();
        assert!(!engine.is_search_open());

        engine.trigger_action("directEditing", Value::Null).unwrap();
        assert!(engine.is_direct_editing());
        engine.trigger_action("directEditing", Value::Null).unwrap();
        assert!(!engine.is_direct_editing());
    }

    #[test]
    fn test_align_left_moves_elements() {
        let mut engine = engine_with_diagram();
        engine.trigger_action("selectAll", Value::Null).unwrap();
        engine
            .trigger_action("alignElements", serde_json::json!({ "alignment": "left" }))
            .unwrap();
        assert_eq!(engine.element("g1").unwrap().x, 120);
    }

    #[test]
    fn test_unknown_action_is_rejected() {
        let mut engine = engine_with_diagram();
        let err = engine
            .trigger_action("openMarketplace", Value::Null)
            .unwrap_err();
        assert!(matches!(err, ToolkitError::UnknownAction(_)));
    }

    #[test]
    fn test_events_reach_subscribers() {
        let mut engine = DiagramEngine::new(Notation::Process, ToolkitOptions::new());
        let sub = engine.subscribe(&EventKind::ALL);

        engine.import(PROCESS_XML).unwrap();
        engine.trigger_action("selectAll", Value::Null).unwrap();
        engine.notify_saved();

        let events = engine.drain_events(sub);
        assert_eq!(
            events,
            vec![
                EventKind::ImportDone,
                EventKind::SelectionChanged,
                EventKind::SaveDone,
            ]
        );
    }

    #[test]
    fn test_detach_drops_subscribers() {
        let mut engine = engine_with_diagram();
        let sub = engine.subscribe(&EventKind::ALL);
        engine.detach();

        engine.notify_saved();
        assert!(engine.drain_events(sub).is_empty());
    }

    #[test]
    fn test_svg_export_carries_element_ids() {
        let engine = engine_with_diagram();
        let svg = engine.export_image(ImageFormat::Svg).unwrap();
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("data-element-id=\"t1\""));
    }

    #[test]
    fn test_raster_exports_are_data_uris() {
        let engine = engine_with_diagram();
        let png = engine.export_image(ImageFormat::Png).unwrap();
        let jpeg = engine.export_image(ImageFormat::Jpeg).unwrap();
        assert!(png.starts_with("data:image/png;base64,"));
        assert!(jpeg.starts_with("data:image/jpeg;base64,"));
    }
}
