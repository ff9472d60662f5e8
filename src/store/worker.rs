use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::{Collection, DocumentStore};
use crate::model::{Milestone, Task};

/// Work shipped to the store thread. All of it is fire-and-forget from the
/// UI's perspective; the UI never blocks on the store.
#[derive(Debug)]
pub enum StoreCommand {
    /// Re-fetch both collections.
    Refresh,
    Create {
        collection: Collection,
        data: Value,
    },
    /// Partial update: only the changed fields travel.
    Update {
        collection: Collection,
        id: String,
        patch: Value,
    },
    Remove {
        collection: Collection,
        id: String,
    },
}

/// Completions drained by the UI each frame.
#[derive(Debug)]
pub enum StoreEvent {
    Refreshed {
        tasks: Vec<Task>,
        milestones: Vec<Milestone>,
    },
    RefreshFailed {
        error: String,
    },
    /// A write rejected. Logged and surfaced in the status bar; never
    /// retried — the bar reverts on the next unsuppressed refresh.
    WriteFailed {
        collection: &'static str,
        id: String,
        error: String,
    },
}

/// The UI side of the store thread: commands go in, completions are polled
/// out without blocking. Dropping the handle closes the command channel; the
/// worker finishes its in-flight operation and exits, and any result it can
/// no longer deliver is discarded rather than applied.
pub struct StoreHandle {
    tx: Sender<StoreCommand>,
    rx: Receiver<StoreEvent>,
}

impl StoreHandle {
    pub fn send(&self, command: StoreCommand) {
        // A closed channel means the worker died; nothing useful to do here.
        let _ = self.tx.send(command);
    }

    /// Drain every completion that has arrived since the last frame.
    pub fn poll(&self) -> Vec<StoreEvent> {
        self.rx.try_iter().collect()
    }
}

/// Start the store worker thread over the given backend.
pub fn spawn_store_worker(store: Box<dyn DocumentStore>) -> StoreHandle {
    let (cmd_tx, cmd_rx) = mpsc::channel();
    let (evt_tx, evt_rx) = mpsc::channel();
    thread::spawn(move || worker_loop(store, cmd_rx, evt_tx));
    StoreHandle {
        tx: cmd_tx,
        rx: evt_rx,
    }
}

fn worker_loop(
    store: Box<dyn DocumentStore>,
    commands: Receiver<StoreCommand>,
    events: Sender<StoreEvent>,
) {
    while let Ok(command) = commands.recv() {
        let event = run_command(store.as_ref(), command);
        if let Some(event) = event {
            if events.send(event).is_err() {
                // UI is gone; the write above still completed.
                break;
            }
        }
    }
}

fn run_command(store: &dyn DocumentStore, command: StoreCommand) -> Option<StoreEvent> {
    match command {
        StoreCommand::Refresh => {
            let tasks = store.get_all(Collection::Tasks);
            let milestones = store.get_all(Collection::Milestones);
            match (tasks, milestones) {
                (Ok(tasks), Ok(milestones)) => Some(StoreEvent::Refreshed {
                    tasks: parse_docs(tasks, Collection::Tasks),
                    milestones: parse_docs(milestones, Collection::Milestones),
                }),
                (Err(e), _) | (_, Err(e)) => Some(StoreEvent::RefreshFailed {
                    error: e.to_string(),
                }),
            }
        }
        StoreCommand::Create { collection, data } => match store.create(collection, data) {
            Ok(_) => None,
            Err(e) => Some(StoreEvent::WriteFailed {
                collection: collection.name(),
                id: String::new(),
                error: e.to_string(),
            }),
        },
        StoreCommand::Update {
            collection,
            id,
            patch,
        } => match store.update(collection, &id, patch) {
            Ok(_) => None,
            Err(e) => Some(StoreEvent::WriteFailed {
                collection: collection.name(),
                id,
                error: e.to_string(),
            }),
        },
        StoreCommand::Remove { collection, id } => match store.remove(collection, &id) {
            Ok(_) => None,
            Err(e) => Some(StoreEvent::WriteFailed {
                collection: collection.name(),
                id,
                error: e.to_string(),
            }),
        },
    }
}

/// Deserialize documents, skipping malformed ones with a warning rather than
/// failing the whole refresh.
fn parse_docs<T: DeserializeOwned>(docs: Vec<Value>, collection: Collection) -> Vec<T> {
    docs.into_iter()
        .filter_map(|doc| match serde_json::from_value(doc) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(collection = collection.name(), error = %e, "skipping malformed document");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::LocalStore;
    use serde_json::json;
    use std::time::Duration;

    #[test]
    fn commands_are_applied_in_order_and_refresh_reflects_writes() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::open_at(dir.path()).unwrap();
        let handle = spawn_store_worker(Box::new(store));

        handle.send(StoreCommand::Create {
            collection: Collection::Tasks,
            data: json!({"title": "Mount camera", "status": "Not Started"}),
        });
        handle.send(StoreCommand::Refresh);

        let event = handle
            .rx
            .recv_timeout(Duration::from_secs(5))
            .expect("refresh completion");
        match event {
            StoreEvent::Refreshed { tasks, milestones } => {
                assert_eq!(tasks.len(), 1);
                assert_eq!(tasks[0].title, "Mount camera");
                assert!(milestones.is_empty());
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn failed_update_reports_write_failure() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::open_at(dir.path()).unwrap();
        let handle = spawn_store_worker(Box::new(store));

        handle.send(StoreCommand::Update {
            collection: Collection::Tasks,
            id: "missing".into(),
            patch: json!({"status": "Completed"}),
        });

        let event = handle
            .rx
            .recv_timeout(Duration::from_secs(5))
            .expect("write failure event");
        assert!(matches!(event, StoreEvent::WriteFailed { ref id, .. } if id == "missing"));
    }
}
