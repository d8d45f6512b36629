//! Project details view model

use std::sync::Arc;

use tokio::sync::watch;
use tracing::warn;

use crate::access::{AccessControl, EntityAction, PROJECTS_ACCESS};
use crate::project::Project;
use crate::store::ProjectStore;

use super::ModelHandle;

/// Details page load state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Loading,
    /// No route identifier: editing a fresh draft
    LoadedNew,
    /// Route identifier resolved against the cache
    LoadedExisting,
}

/// Hosts the definition and access-control panes for one project and
/// decides whether the access-control pane is shown at all.
pub struct DetailsView {
    store: Arc<ProjectStore>,
    access: Arc<dyn AccessControl>,
    shared: ModelHandle,
    model_rx: watch::Receiver<Project>,
    last_seen_id: Option<String>,
    pub state: LoadState,
    /// Whether the access-control pane is rendered; requires the
    /// change-permissions entity grant under entity access control
    pub show_access_control: bool,
}

impl DetailsView {
    pub fn new(store: Arc<ProjectStore>, access: Arc<dyn AccessControl>, shared: ModelHandle) -> Self {
        let model_rx = shared.subscribe();
        let last_seen_id = shared.get().id;
        Self {
            store,
            access,
            shared,
            model_rx,
            last_seen_id,
            state: LoadState::Loading,
            show_access_control: false,
        }
    }

    /// Resolve the route parameter against the cache, reloading first when
    /// the cache is empty, then run the initial permission check.
    pub async fn load(&mut self, route_id: Option<&str>) {
        match route_id {
            Some(id) => {
                if self.store.snapshot().is_empty() {
                    self.store.reload().await;
                }
                match self.store.find(id) {
                    Some(project) => {
                        self.last_seen_id = project.id.clone();
                        self.shared.set(project);
                        self.state = LoadState::LoadedExisting;
                    }
                    None => {
                        warn!(%id, "Project not in cache; treating as new");
                        self.state = LoadState::LoadedNew;
                    }
                }
            }
            None => {
                self.state = LoadState::LoadedNew;
            }
        }
        self.check_access_control().await;
    }

    /// Current model from the shared handle
    pub fn model(&self) -> Project {
        self.shared.get()
    }

    /// Observe shared-model changes. The entity permission check re-runs
    /// only when the identifier transitions from absent to assigned (a
    /// draft just got persisted), not on every field change.
    pub async fn observe_shared(&mut self) {
        if !self.model_rx.has_changed().unwrap_or(false) {
            return;
        }
        let new_id = self.model_rx.borrow_and_update().id.clone();
        let became_persisted = self.last_seen_id.is_none() && new_id.is_some();
        self.last_seen_id = new_id;
        if became_persisted {
            self.state = LoadState::LoadedExisting;
            self.check_access_control().await;
        }
    }

    async fn check_access_control(&mut self) {
        if !self.access.is_entity_access_controlled().await {
            return;
        }
        let model = self.shared.get();
        self.show_access_control = self
            .access
            .has_permission(
                PROJECTS_ACCESS,
                &model,
                EntityAction::ChangeProjectPermissions,
            )
            .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::StaticAccessControl;
    use crate::api::InMemoryBackend;

    fn named(display: &str) -> Project {
        Project {
            project_name: Some(display.to_string()),
            ..Project::draft()
        }
    }

    fn view_with(
        projects: Vec<Project>,
        access: StaticAccessControl,
    ) -> (Arc<ProjectStore>, ModelHandle, DetailsView) {
        let backend = Arc::new(InMemoryBackend::with_projects(projects));
        let store = Arc::new(ProjectStore::new(backend));
        let shared = ModelHandle::default();
        let view = DetailsView::new(store.clone(), Arc::new(access), shared.clone());
        (store, shared, view)
    }

    #[tokio::test]
    async fn test_load_without_route_id_is_new() {
        let (_store, _shared, mut view) = view_with(vec![], StaticAccessControl::allow_all());
        assert_eq!(view.state, LoadState::Loading);

        view.load(None).await;
        assert_eq!(view.state, LoadState::LoadedNew);
        assert!(view.model().is_draft());
    }

    #[tokio::test]
    async fn test_load_with_route_id_populates_cold_cache_first() {
        let (store, _shared, mut view) = view_with(vec![named("Alpha")], StaticAccessControl::allow_all());
        assert!(store.snapshot().is_empty());

        view.load(Some("p-1")).await;
        assert_eq!(view.state, LoadState::LoadedExisting);
        assert_eq!(view.model().project_name.as_deref(), Some("Alpha"));
        assert!(!store.snapshot().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_route_id_falls_back_to_new() {
        let (_store, _shared, mut view) = view_with(vec![named("Alpha")], StaticAccessControl::allow_all());
        view.load(Some("p-404")).await;
        assert_eq!(view.state, LoadState::LoadedNew);
    }

    #[tokio::test]
    async fn test_access_control_pane_hidden_without_entity_access() {
        // Entity access control off: no pane, regardless of actions.
        let (_store, _shared, mut view) = view_with(vec![named("Alpha")], StaticAccessControl::allow_all());
        view.load(Some("p-1")).await;
        assert!(!view.show_access_control);
    }

    #[tokio::test]
    async fn test_access_control_pane_gated_on_change_permissions() {
        let access = StaticAccessControl::allow_all().entity_controlled();
        access.grant("p-1", EntityAction::ChangeProjectPermissions);
        let (_store, _shared, mut view) = view_with(vec![named("Alpha")], access);

        view.load(Some("p-1")).await;
        assert!(view.show_access_control);
    }

    #[tokio::test]
    async fn test_permission_recheck_on_id_transition_only() {
        let access = StaticAccessControl::allow_all().entity_controlled();
        let backend = Arc::new(InMemoryBackend::new());
        let store = Arc::new(ProjectStore::new(backend));
        let shared = ModelHandle::default();
        let access = Arc::new(access);
        let mut view = DetailsView::new(store, access.clone(), shared.clone());

        view.load(None).await;
        assert!(!view.show_access_control);

        // The draft gets persisted elsewhere and the grant exists by the
        // time the id appears.
        access.grant("p-7", EntityAction::ChangeProjectPermissions);
        let mut saved = named("Alpha");
        saved.id = Some("p-7".to_string());
        shared.set(saved);

        view.observe_shared().await;
        assert_eq!(view.state, LoadState::LoadedExisting);
        assert!(view.show_access_control);

        // Later field-only changes do not re-run the check.
        access.revoke("p-7", EntityAction::ChangeProjectPermissions);
        let mut renamed = shared.get();
        renamed.description = Some("edited".to_string());
        shared.set(renamed);
        view.observe_shared().await;
        assert!(view.show_access_control);
    }
}
