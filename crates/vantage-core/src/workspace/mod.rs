//! Workspace view models
//!
//! Headless controllers for the Projects screens: the list, the details
//! page, and its definition and access-control panes. They hold no UI
//! toolkit state; the CLI and TUI front ends (or tests) drive them and
//! render their fields.

mod access_pane;
mod collab;
mod definition;
mod details;
mod list;

pub use access_pane::AccessPane;
pub use collab::{Navigator, Notifier, RecordedNavigator, RecordedNotifier};
pub use definition::DefinitionPane;
pub use details::{DetailsView, LoadState};
pub use list::ListView;

use std::sync::Arc;

use tokio::sync::watch;

use crate::project::Project;

/// Shared handle to the project record the details screen is working on.
///
/// Replaces the console UI's global mutable model slot: panes publish
/// through the handle and observers pick up changes from the watch channel
/// instead of comparing references.
#[derive(Clone)]
pub struct ModelHandle {
    tx: Arc<watch::Sender<Project>>,
}

impl ModelHandle {
    pub fn new(initial: Project) -> Self {
        let (tx, _) = watch::channel(initial);
        Self { tx: Arc::new(tx) }
    }

    /// Current model
    pub fn get(&self) -> Project {
        self.tx.borrow().clone()
    }

    /// Publish a new model to all observers
    pub fn set(&self, model: Project) {
        self.tx.send_replace(model);
    }

    pub fn subscribe(&self) -> watch::Receiver<Project> {
        self.tx.subscribe()
    }
}

impl Default for ModelHandle {
    fn default() -> Self {
        Self::new(Project::draft())
    }
}
