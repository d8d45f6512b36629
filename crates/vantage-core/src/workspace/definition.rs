//! Project definition pane view model
//!
//! Field editing for a single project: display/system name, description,
//! icon, and the notebook-folder flag, with duplicate and reserved-name
//! validation against the cached collection.

use std::sync::Arc;

use tracing::warn;

use crate::access::{AccessControl, EntityAction, PROJECTS_EDIT};
use crate::session::{EditSession, SystemNameState};
use crate::store::ProjectStore;
use crate::validate::{self, NameValidation};

use super::{ModelHandle, Navigator, Notifier};

pub struct DefinitionPane {
    store: Arc<ProjectStore>,
    access: Arc<dyn AccessControl>,
    navigator: Arc<dyn Navigator>,
    notifier: Arc<dyn Notifier>,
    shared: ModelHandle,
    revalidate_on_change: bool,
    pub session: EditSession,
    /// Whether the pane is in edit mode; a fresh draft starts editable
    pub is_editable: bool,
    pub allow_edit: bool,
    pub allow_delete: bool,
    pub validation: NameValidation,
}

impl DefinitionPane {
    pub fn new(
        store: Arc<ProjectStore>,
        access: Arc<dyn AccessControl>,
        navigator: Arc<dyn Navigator>,
        notifier: Arc<dyn Notifier>,
        shared: ModelHandle,
        revalidate_on_change: bool,
    ) -> Self {
        let model = shared.get();
        let is_editable = model.is_draft();
        Self {
            store,
            access,
            navigator,
            notifier,
            shared,
            revalidate_on_change,
            session: EditSession::begin(model),
            is_editable,
            allow_edit: false,
            allow_delete: false,
            validation: NameValidation::default(),
        }
    }

    /// Check permissions, warm the cache, and validate the initial names
    pub async fn init(&mut self) {
        self.check_access_permissions().await;
        self.store.reload().await;
        self.validate_display_name().await;
        self.validate_system_name().await;
    }

    async fn check_access_permissions(&mut self) {
        let model = self.shared.get();
        self.allow_edit = self
            .access
            .has_permission(PROJECTS_EDIT, &model, EntityAction::EditProjectDetails)
            .await;
        self.allow_delete = self
            .access
            .has_permission(PROJECTS_EDIT, &model, EntityAction::DeleteProject)
            .await;
    }

    /// Switch to edit mode, snapshotting the live model into the session
    pub fn on_edit(&mut self) {
        let has_dependents = self.session.has_dependents();
        self.session = EditSession::begin_with_dependents(self.shared.get(), has_dependents);
        self.is_editable = true;
    }

    /// Change the display name and re-validate. Auto-derivation may update
    /// the system name as well, in which case its checks re-run too.
    pub async fn edit_display_name(&mut self, name: &str) {
        self.session.draft_mut().project_name = Some(name.to_string());
        let before = self.session.draft().system_name.clone();
        self.validate_display_name().await;
        if self.session.draft().system_name != before {
            self.validate_system_name().await;
        }
    }

    /// Change the system name directly and re-validate
    pub async fn edit_system_name(&mut self, name: &str) {
        self.session.draft_mut().system_name = Some(name.to_string());
        self.validate_system_name().await;
    }

    /// Allow direct system-name editing; freezes auto-derivation for good
    pub fn unlock_system_name(&mut self) {
        self.session.unlock_system_name();
    }

    pub fn system_name_state(&self) -> SystemNameState {
        self.session.system_name_state()
    }

    /// Duplicate/reserved checks for the display name. Also applies the
    /// canonical derived system name while the draft is still eligible.
    pub async fn validate_display_name(&mut self) {
        let Some(display_name) = self.session.draft().project_name.clone() else {
            self.validation.duplicate_display_name = false;
            self.validation.reserved_display_name = false;
            return;
        };

        let canonical = match self.store.derive_system_name(&display_name).await {
            Ok(canonical) => canonical,
            Err(err) => {
                warn!(error = %err, "System name derivation failed; skipping validation");
                return;
            }
        };
        self.session.apply_derived_system_name(&canonical);

        let snapshot = self.store.snapshot();
        let checked = validate::check_names(self.session.draft(), &snapshot, None);
        self.validation.duplicate_display_name = checked.duplicate_display_name;
        self.validation.reserved_display_name = checked.reserved_display_name;
    }

    /// Duplicate/reserved/canonical-form checks for the system name
    pub async fn validate_system_name(&mut self) {
        let Some(system_name) = self.session.draft().system_name.clone() else {
            self.validation.duplicate_system_name = false;
            self.validation.reserved_system_name = false;
            self.validation.system_name_mismatch = false;
            return;
        };

        let canonical = match self.store.derive_system_name(&system_name).await {
            Ok(canonical) => canonical,
            Err(err) => {
                warn!(error = %err, "System name derivation failed; skipping validation");
                return;
            }
        };

        let snapshot = self.store.snapshot();
        let checked = validate::check_names(self.session.draft(), &snapshot, Some(&canonical));
        self.validation.duplicate_system_name = checked.duplicate_system_name;
        self.validation.reserved_system_name = checked.reserved_system_name;
        self.validation.system_name_mismatch = checked.system_name_mismatch;
    }

    /// The delete affordance needs the permission, a persisted record, and
    /// no dependent resources
    pub fn can_delete(&self) -> bool {
        self.allow_delete && self.shared.get().id.is_some() && !self.session.has_dependents()
    }

    /// Leave edit mode; a never-saved draft returns to the list
    pub fn on_cancel(&mut self) {
        self.session.lock_system_name();
        if self.shared.get().is_draft() {
            self.navigator.to_project_list();
        }
    }

    /// Persist the definition fields.
    ///
    /// On success the saved record is merged into the cache and published
    /// as the shared model. On failure the server's message goes into a
    /// blocking alert and edit mode stays active for correction.
    pub async fn on_save(&mut self) {
        let live = self.shared.get();
        let model = self.session.commit_definition(&live);

        let result = if self.session.draft().id.is_some() {
            self.store.persist(&model).await
        } else {
            self.store.create(&model).await
        };

        match result {
            Ok(saved) => {
                self.session.lock_system_name();
                self.store.merge(saved.clone()).await;
                self.shared.set(saved.clone());
                self.session.accept(saved);
                self.is_editable = false;
                self.notifier.toast("Saved the project");
                if self.revalidate_on_change {
                    self.check_access_permissions().await;
                }
            }
            Err(err) => {
                let name = model.project_name.as_deref().unwrap_or("");
                self.notifier.alert(
                    "Save Failed",
                    &format!("The project '{}' could not be saved. {}", name, err),
                );
                self.is_editable = true;
            }
        }
    }

    /// Delete the project, reload the cache, and return to the list.
    /// Failures alert and leave the record and current view unchanged.
    pub async fn on_delete(&mut self) {
        let name = self
            .session
            .draft()
            .project_name
            .clone()
            .unwrap_or_default();

        match self.store.delete(self.session.draft()).await {
            Ok(()) => {
                self.session.lock_system_name();
                self.store.reload().await;
                self.notifier
                    .toast(&format!("Successfully deleted the project {}", name));
                self.navigator.to_project_list();
            }
            Err(err) => {
                self.notifier.alert(
                    "Unable to delete the project",
                    &format!("Unable to delete the project {}. {}", name, err),
                );
            }
        }
    }
}
