//! Project access-control pane view model
//!
//! Role membership and owner editing for a single project. The pane edits
//! a session copy and only publishes role changes back into the shared
//! model once the server accepts them.

use std::sync::Arc;

use tokio::sync::watch;

use crate::access::{AccessControl, EntityAction, PROJECTS_EDIT};
use crate::project::Project;
use crate::session::EditSession;
use crate::store::ProjectStore;

use super::{ModelHandle, Notifier};

pub struct AccessPane {
    store: Arc<ProjectStore>,
    access: Arc<dyn AccessControl>,
    notifier: Arc<dyn Notifier>,
    shared: ModelHandle,
    model_rx: watch::Receiver<Project>,
    revalidate_on_change: bool,
    pub session: EditSession,
    pub is_editable: bool,
    pub is_new: bool,
    pub allow_edit: bool,
}

impl AccessPane {
    pub fn new(
        store: Arc<ProjectStore>,
        access: Arc<dyn AccessControl>,
        notifier: Arc<dyn Notifier>,
        shared: ModelHandle,
        revalidate_on_change: bool,
    ) -> Self {
        let model_rx = shared.subscribe();
        let model = shared.get();
        let is_new = model.is_draft();
        Self {
            store,
            access,
            notifier,
            shared,
            model_rx,
            revalidate_on_change,
            session: EditSession::begin(model),
            is_editable: false,
            is_new,
            allow_edit: false,
        }
    }

    /// Resolve the edit permission for the current model
    pub async fn init(&mut self) {
        self.check_edit_permission().await;
    }

    async fn check_edit_permission(&mut self) {
        let model = self.shared.get();
        self.allow_edit = self
            .access
            .has_permission(PROJECTS_EDIT, &model, EntityAction::ChangeProjectPermissions)
            .await;
    }

    /// Pick up shared-model changes published elsewhere in the workspace
    pub fn observe_shared(&mut self) {
        if self
            .model_rx
            .has_changed()
            .unwrap_or(false)
        {
            let model = self.model_rx.borrow_and_update().clone();
            self.is_new = model.is_draft();
        }
    }

    /// Switch to edit mode, snapshotting the live model into the session
    pub fn on_edit(&mut self) {
        self.session = EditSession::begin(self.shared.get());
        self.is_editable = true;
    }

    /// Persist the role memberships and owner.
    ///
    /// On success the saved record becomes the shared model and is merged
    /// into the cache. On failure edit mode stays active so the grants can
    /// be corrected and resubmitted.
    pub async fn on_save(&mut self) {
        let model = self.session.commit_access(&self.shared.get());

        match self.store.persist(&model).await {
            Ok(saved) => {
                self.shared.set(saved.clone());
                self.is_editable = false;
                self.store.merge(saved.clone()).await;
                self.session.accept(saved);
                self.notifier.toast("Saved the project");
                if self.revalidate_on_change {
                    self.check_edit_permission().await;
                }
            }
            Err(err) => {
                self.is_editable = true;
                let name = model.project_name.as_deref().unwrap_or("");
                self.notifier.alert(
                    "Save Failed",
                    &format!("The project '{}' could not be saved. {}", name, err),
                );
            }
        }
    }

    /// Leave edit mode, dropping any uncommitted grant changes
    pub fn on_cancel(&mut self) {
        self.session.discard();
        self.is_editable = false;
    }
}
