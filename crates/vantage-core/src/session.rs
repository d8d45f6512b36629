//! Edit sessions
//!
//! An explicit value type for the edit flow: a pristine snapshot of the
//! record as loaded, plus a working draft the form mutates. Committing
//! overlays only the fields a pane owns onto a fresh copy of the live
//! model, so in-progress edits never leak into the shared cache before a
//! successful save.

use crate::project::Project;

/// Lifecycle of the system-name field during an edit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemNameState {
    /// New record, tracking the display name automatically
    AutoDerived,
    /// Existing record; can be unlocked for direct editing
    Customizable,
    /// Unlocked for direct editing; auto-derivation is off for good
    Editable,
    /// Dependent resources exist; the system name is immutable
    Frozen,
}

impl SystemNameState {
    /// Hint text shown next to the system-name field
    pub fn description(&self) -> &'static str {
        match self {
            Self::AutoDerived => "Auto generated from the project name, can be customised",
            Self::Customizable => "Can be customised",
            Self::Editable => "System name is now editable",
            Self::Frozen => "Cannot be customised because the project has dependent resources",
        }
    }
}

/// Pristine snapshot plus working draft for one edit flow
#[derive(Debug, Clone)]
pub struct EditSession {
    pristine: Project,
    draft: Project,
    system_name_unlocked: bool,
    has_dependents: bool,
}

impl EditSession {
    /// Start an edit session over a snapshot of the live model
    pub fn begin(model: Project) -> Self {
        Self::begin_with_dependents(model, false)
    }

    /// Start a session for a record known to have dependent resources
    pub fn begin_with_dependents(model: Project, has_dependents: bool) -> Self {
        Self {
            draft: model.clone(),
            pristine: model,
            system_name_unlocked: false,
            has_dependents,
        }
    }

    pub fn pristine(&self) -> &Project {
        &self.pristine
    }

    pub fn draft(&self) -> &Project {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut Project {
        &mut self.draft
    }

    /// Whether the record being edited has no server-assigned id yet
    pub fn is_new(&self) -> bool {
        self.draft.id.is_none()
    }

    pub fn has_dependents(&self) -> bool {
        self.has_dependents
    }

    /// Allow direct editing of the system name. Irreversible for the auto
    /// derivation: once unlocked, display-name edits no longer overwrite it.
    pub fn unlock_system_name(&mut self) {
        self.system_name_unlocked = true;
    }

    /// Relock after a save or cancel
    pub fn lock_system_name(&mut self) {
        self.system_name_unlocked = false;
    }

    pub fn system_name_unlocked(&self) -> bool {
        self.system_name_unlocked
    }

    /// Auto-derivation applies only to a locked, dependent-free new record
    pub fn auto_derive_eligible(&self) -> bool {
        self.is_new() && !self.system_name_unlocked && !self.has_dependents
    }

    /// Write the canonical derived name into the draft if eligible;
    /// returns whether it was applied.
    pub fn apply_derived_system_name(&mut self, canonical: &str) -> bool {
        if !self.auto_derive_eligible() {
            return false;
        }
        self.draft.system_name = Some(canonical.to_string());
        true
    }

    pub fn system_name_state(&self) -> SystemNameState {
        if self.has_dependents {
            SystemNameState::Frozen
        } else if self.system_name_unlocked {
            SystemNameState::Editable
        } else if self.is_new() {
            SystemNameState::AutoDerived
        } else {
            SystemNameState::Customizable
        }
    }

    /// Overlay the definition fields onto a fresh copy of the live model
    pub fn commit_definition(&self, live: &Project) -> Project {
        let mut model = live.clone();
        model.project_name = self.draft.project_name.clone();
        model.system_name = self.draft.system_name.clone();
        model.description = self.draft.description.clone();
        model.icon = self.draft.icon.clone();
        model.icon_color = self.draft.icon_color.clone();
        model.notebook_folder_enabled = self.draft.notebook_folder_enabled;
        model
    }

    /// Overlay only role memberships and ownership onto a fresh copy of
    /// the live model
    pub fn commit_access(&self, live: &Project) -> Project {
        let mut model = live.clone();
        model.role_memberships = self.draft.role_memberships.clone();
        model.owner = self.draft.owner.clone();
        model
    }

    /// Drop in-progress edits, restoring the pristine snapshot
    pub fn discard(&mut self) {
        self.draft = self.pristine.clone();
    }

    /// Re-anchor the session on a freshly saved record
    pub fn accept(&mut self, saved: Project) {
        self.draft = saved.clone();
        self.pristine = saved;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::{Principal, RoleMembership};

    fn existing() -> Project {
        Project {
            id: Some("p-1".to_string()),
            project_name: Some("Alpha".to_string()),
            system_name: Some("alpha".to_string()),
            description: Some("live description".to_string()),
            owner: Some(Principal::named("jdoe")),
            ..Project::draft()
        }
    }

    #[test]
    fn test_edits_do_not_leak_into_pristine() {
        let mut session = EditSession::begin(existing());
        session.draft_mut().project_name = Some("Renamed".to_string());

        assert_eq!(session.pristine().project_name.as_deref(), Some("Alpha"));
        assert_eq!(session.draft().project_name.as_deref(), Some("Renamed"));

        session.discard();
        assert_eq!(session.draft().project_name.as_deref(), Some("Alpha"));
    }

    #[test]
    fn test_auto_derivation_applies_only_while_eligible() {
        let mut session = EditSession::begin(Project::draft());
        assert!(session.auto_derive_eligible());
        assert!(session.apply_derived_system_name("alpha"));
        assert_eq!(session.draft().system_name.as_deref(), Some("alpha"));

        // Unlocking freezes auto-derivation even as the display name
        // keeps changing.
        session.unlock_system_name();
        session.draft_mut().project_name = Some("Renamed".to_string());
        assert!(!session.apply_derived_system_name("renamed"));
        assert_eq!(session.draft().system_name.as_deref(), Some("alpha"));
    }

    #[test]
    fn test_auto_derivation_skipped_for_existing_or_dependent_records() {
        let mut session = EditSession::begin(existing());
        assert!(!session.apply_derived_system_name("other"));
        assert_eq!(session.draft().system_name.as_deref(), Some("alpha"));

        let mut session = EditSession::begin_with_dependents(Project::draft(), true);
        assert!(!session.apply_derived_system_name("other"));
    }

    #[test]
    fn test_system_name_states() {
        assert_eq!(
            EditSession::begin(Project::draft()).system_name_state(),
            SystemNameState::AutoDerived
        );
        assert_eq!(
            EditSession::begin(existing()).system_name_state(),
            SystemNameState::Customizable
        );

        let mut unlocked = EditSession::begin(existing());
        unlocked.unlock_system_name();
        assert_eq!(unlocked.system_name_state(), SystemNameState::Editable);

        // Dependents win over everything else.
        let mut frozen = EditSession::begin_with_dependents(existing(), true);
        frozen.unlock_system_name();
        assert_eq!(frozen.system_name_state(), SystemNameState::Frozen);
        assert!(!frozen.system_name_state().description().is_empty());
    }

    #[test]
    fn test_commit_definition_touches_only_definition_fields() {
        let mut session = EditSession::begin(existing());
        session.draft_mut().project_name = Some("Renamed".to_string());
        session.draft_mut().description = Some("edited".to_string());
        session.draft_mut().owner = Some(Principal::named("intruder"));

        // The live model moved on while the edit was open.
        let mut live = existing();
        live.role_memberships = vec![RoleMembership {
            role: "editor".to_string(),
            ..RoleMembership::default()
        }];

        let committed = session.commit_definition(&live);
        assert_eq!(committed.project_name.as_deref(), Some("Renamed"));
        assert_eq!(committed.description.as_deref(), Some("edited"));
        // Ownership stays whatever the live model says.
        assert_eq!(committed.owner.as_ref().unwrap().system_name, "jdoe");
        assert_eq!(committed.role_memberships.len(), 1);
    }

    #[test]
    fn test_commit_access_touches_only_access_fields() {
        let mut session = EditSession::begin(existing());
        session.draft_mut().owner = Some(Principal::named("new-owner"));
        session.draft_mut().role_memberships = vec![RoleMembership {
            role: "readOnly".to_string(),
            users: vec![Principal::named("guest")],
            ..RoleMembership::default()
        }];
        session.draft_mut().project_name = Some("Should Not Stick".to_string());

        let committed = session.commit_access(&existing());
        assert_eq!(committed.owner.as_ref().unwrap().system_name, "new-owner");
        assert_eq!(committed.role_memberships[0].role, "readOnly");
        assert_eq!(committed.project_name.as_deref(), Some("Alpha"));
    }

    #[test]
    fn test_accept_reanchors_on_saved_record() {
        let mut session = EditSession::begin(Project::draft());
        let mut saved = existing();
        saved.id = Some("p-9".to_string());
        session.accept(saved);

        assert!(!session.is_new());
        assert_eq!(session.pristine().id.as_deref(), Some("p-9"));
        assert_eq!(session.system_name_state(), SystemNameState::Customizable);
    }
}
