//! Workbench lifecycle tests over the full stack.

use serde_json::{json, Value};
use tokio_stream::StreamExt;

use flowdeck_common::{EditorId, ModuleDescriptor, Plugins};
use flowdeck_editor::{NotationKind, PluginPolicy};
use flowdeck_shell::{NotificationPayload, ShellError, TabDescriptor, Workbench};
use flowdeck_toolkit::ImageFormat;

const PROCESS_XML: &str = r#"<definitions id="d1">
  <process id="p1">
    <task id="t1" name="Review" x="100" y="100"/>
  </process>
</definitions>"#;

const FORM_JSON: &str = r#"{ "components": [ { "id": "name", "type": "textfield" } ] }"#;

fn process_tab(id: &str) -> TabDescriptor {
    TabDescriptor::new(id, NotationKind::Process, PROCESS_XML)
}

#[test]
fn test_open_tab_imports_and_activates() {
    let mut workbench = Workbench::new();
    let snapshot = workbench.open_tab(process_tab("p")).unwrap();

    assert!(!snapshot.dirty);
    assert_eq!(workbench.open_tabs().len(), 1);
    assert_eq!(workbench.active_tab().unwrap().as_str(), "p");
}

#[test]
fn test_reopening_a_tab_reuses_cached_state() {
    let mut workbench = Workbench::new();
    let id = EditorId::from("p");
    workbench.open_tab(process_tab("p")).unwrap();
    workbench
        .trigger(&id, "createElement", json!({ "id": "t2", "kind": "task" }))
        .unwrap();
    assert!(workbench.is_dirty(&id).unwrap());

    // Unmount and reopen with the same descriptor: the live state and
    // its dirty flag survive, and identical content does not reimport.
    workbench.unmount_tab(&id);
    let snapshot = workbench.open_tab(process_tab("p")).unwrap();
    assert!(snapshot.dirty);
}

#[test]
fn test_close_tab_drops_state_and_reopen_starts_fresh() {
    let mut workbench = Workbench::new();
    let id = EditorId::from("p");
    workbench.open_tab(process_tab("p")).unwrap();
    workbench
        .trigger(&id, "createElement", json!({ "id": "t2", "kind": "task" }))
        .unwrap();
    workbench.close_tab(&id);
    assert!(workbench.open_tabs().is_empty());

    let snapshot = workbench.open_tab(process_tab("p")).unwrap();
    assert!(!snapshot.dirty);
}

#[test]
fn test_close_unknown_tab_is_noop() {
    let mut workbench = Workbench::new();
    workbench.close_tab(&EditorId::from("ghost"));
    assert!(workbench.open_tabs().is_empty());
}

#[test]
fn test_unknown_tab_operations_error() {
    let mut workbench = Workbench::new();
    let ghost = EditorId::from("ghost");

    assert!(matches!(
        workbench.snapshot(&ghost),
        Err(ShellError::UnknownTab(_))
    ));
    assert!(matches!(
        workbench.trigger(&ghost, "undo", Value::Null),
        Err(ShellError::UnknownTab(_))
    ));
    assert!(matches!(
        workbench.update_tab(&ghost, "<x/>"),
        Err(ShellError::UnknownTab(_))
    ));
}

#[test]
fn test_update_tab_gates_identical_content() {
    let mut workbench = Workbench::new();
    let id = EditorId::from("p");
    workbench.open_tab(process_tab("p")).unwrap();

    assert!(!workbench.update_tab(&id, PROCESS_XML).unwrap());
    let changed = PROCESS_XML.replace("Review", "Approve");
    assert!(workbench.update_tab(&id, &changed).unwrap());
}

#[test]
fn test_save_tab_resets_dirty() {
    let mut workbench = Workbench::new();
    let id = EditorId::from("p");
    workbench.open_tab(process_tab("p")).unwrap();
    workbench
        .trigger(&id, "createElement", json!({ "id": "t2", "kind": "task" }))
        .unwrap();

    let saved = workbench.save_tab(&id).unwrap();
    assert!(saved.contains("t2"));
    assert!(!workbench.is_dirty(&id).unwrap());
}

#[test]
fn test_form_and_process_tabs_coexist() {
    let mut workbench = Workbench::new();
    workbench.open_tab(process_tab("p")).unwrap();
    workbench
        .open_tab(TabDescriptor::new("f", NotationKind::Form, FORM_JSON))
        .unwrap();

    assert_eq!(workbench.open_tabs().len(), 2);
    let form_snapshot = workbench.snapshot(&EditorId::from("f")).unwrap();
    assert_eq!(form_snapshot.edit_menu.len(), 4);

    // Mounting the process tab back does not rebuild it.
    let process_snapshot = workbench.mount_tab(&EditorId::from("p")).unwrap();
    assert_eq!(process_snapshot.edit_menu.len(), 7);
}

#[test]
fn test_restricted_tab_drops_plugins() {
    let mut workbench = Workbench::new();
    let descriptor = process_tab("p")
        .with_policy(PluginPolicy::Restricted)
        .with_plugins(Plugins {
            modules: vec![ModuleDescriptor::new("minimap")],
            extensions: vec![],
        });

    // Opening succeeds and behaves like a plain editor.
    let snapshot = workbench.open_tab(descriptor).unwrap();
    assert!(!snapshot.dirty);
}

#[test]
fn test_export_as_from_the_workbench() {
    let mut workbench = Workbench::new();
    let id = EditorId::from("p");
    workbench.open_tab(process_tab("p")).unwrap();

    let svg = workbench.export_as(&id, ImageFormat::Svg).unwrap();
    assert!(svg.starts_with("<svg"));
}

#[tokio::test]
async fn test_notification_stream_carries_editor_lifecycle() {
    let mut workbench = Workbench::new();
    let notifications = workbench.notifications().unwrap();
    assert!(workbench.notifications().is_none());

    let id = EditorId::from("p");
    workbench.open_tab(process_tab("p")).unwrap();
    workbench
        .trigger(&id, "createElement", json!({ "id": "t2", "kind": "task" }))
        .unwrap();
    workbench.shutdown();
    drop(workbench);

    let received: Vec<_> = notifications.collect().await;
    assert!(received
        .iter()
        .all(|n| n.editor_id == id && n.timestamp_ms > 0));

    // modeler-created, import done, one snapshot per event and a content
    // update for the executed command.
    assert!(matches!(
        received[0].payload,
        NotificationPayload::Action { ref name, .. } if name == "modeler-created"
    ));
    assert!(received
        .iter()
        .any(|n| matches!(n.payload, NotificationPayload::ImportDone { error: None, .. })));
    assert!(received
        .iter()
        .any(|n| matches!(n.payload, NotificationPayload::ContentUpdated)));
    let state_changes = received
        .iter()
        .filter(|n| matches!(n.payload, NotificationPayload::StateChanged { .. }))
        .count();
    assert_eq!(state_changes, 2);
}

#[test]
fn test_layout_round_trip_through_workbench() {
    let mut workbench = Workbench::new();
    let id = EditorId::from("p");
    workbench.open_tab(process_tab("p")).unwrap();

    let opened = workbench.toggle_properties(&id, None).unwrap();
    assert!(opened.properties_panel.open);

    let reset = workbench.reset_properties(&id).unwrap();
    assert_eq!(reset.properties_panel.width, 250);
}
