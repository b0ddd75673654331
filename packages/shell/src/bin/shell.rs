//! Workbench demo: opens a process tab, edits it, saves and prints the
//! notification stream.

use anyhow::Result;
use serde_json::json;
use tokio_stream::StreamExt;

use flowdeck_editor::NotationKind;
use flowdeck_shell::{TabDescriptor, Workbench};

const SAMPLE_PROCESS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<definitions id="defs_1">
  <process id="proc_1" name="Order handling">
    <task id="t1" name="Review order" x="120" y="80"/>
    <task id="t2" name="Ship order" x="300" y="80"/>
  </process>
</definitions>"#;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let mut workbench = Workbench::new();
    let notifications = workbench
        .notifications()
        .expect("notification stream already taken");

    let tab = TabDescriptor::new("process-1", NotationKind::Process, SAMPLE_PROCESS);
    let id = tab.id.clone();

    let snapshot = workbench.open_tab(tab)?;
    tracing::info!(dirty = snapshot.dirty, "tab opened");

    workbench.trigger(
        &id,
        "createElement",
        json!({ "id": "t3", "kind": "task", "name": "Invoice", "x": 480, "y": 80 }),
    )?;
    workbench.trigger(&id, "selectAll", serde_json::Value::Null)?;
    workbench.trigger(&id, "alignElements", json!({ "alignment": "top" }))?;

    let saved = workbench.save_tab(&id)?;
    println!("saved document:\n{saved}");

    workbench.shutdown();
    drop(workbench);

    let mut stream = notifications;
    while let Some(notification) = stream.next().await {
        println!("{}", serde_json::to_string(&notification)?);
    }
    Ok(())
}
