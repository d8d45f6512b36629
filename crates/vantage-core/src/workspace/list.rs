//! Project list view model

use std::sync::Arc;

use tokio::sync::watch;

use crate::access::{AccessControl, PROJECTS_EDIT};
use crate::project::Project;
use crate::store::{ProjectStore, Snapshot};

use super::Navigator;

/// Displays the cached project collection with prefix filtering and a
/// permission-gated "add" affordance.
pub struct ListView {
    store: Arc<ProjectStore>,
    access: Arc<dyn AccessControl>,
    navigator: Arc<dyn Navigator>,
    rx: watch::Receiver<Snapshot>,
    /// Current collection as last observed
    pub projects: Snapshot,
    /// True until the initial reload resolves
    pub loading: bool,
    /// Query for filtering projects
    pub search_query: String,
    /// Whether the global "add project" affordance is registered
    pub add_enabled: bool,
}

impl ListView {
    pub fn new(
        store: Arc<ProjectStore>,
        access: Arc<dyn AccessControl>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        let rx = store.subscribe();
        let projects = store.snapshot();
        Self {
            store,
            access,
            navigator,
            rx,
            projects,
            loading: true,
            search_query: String::new(),
            add_enabled: false,
        }
    }

    /// Refresh the list and register the add affordance.
    ///
    /// The reload and the permission lookup run concurrently; neither
    /// waits on the other. The affordance registration is a one-time side
    /// effect and only happens when the user holds the edit action; a
    /// failed lookup just leaves it hidden.
    pub async fn init(&mut self) {
        let (snapshot, actions) = tokio::join!(self.store.reload(), self.access.allowed_actions());
        self.projects = snapshot;
        self.loading = false;
        self.add_enabled = actions
            .map(|set| set.has_action(PROJECTS_EDIT))
            .unwrap_or(false);
    }

    /// Pick up any snapshot published since the last observation
    pub fn refresh(&mut self) {
        if self.rx.has_changed().unwrap_or(false) {
            self.projects = self.rx.borrow_and_update().clone();
        }
    }

    /// Projects matching the current search query (prefix, case-insensitive)
    pub fn filtered(&self) -> Vec<Project> {
        if self.search_query.is_empty() {
            return (*self.projects).clone();
        }
        let query = self.search_query.to_lowercase();
        self.projects
            .iter()
            .filter(|p| p.name_starts_with(&query))
            .cloned()
            .collect()
    }

    /// Navigate to the details page for a project
    pub fn open(&self, project: &Project) {
        self.navigator.to_project_details(project.id.as_deref());
    }

    /// Navigate to the details page for a new draft
    pub fn add_project(&self) {
        if self.add_enabled {
            self.navigator.to_project_details(None);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::StaticAccessControl;
    use crate::api::InMemoryBackend;
    use crate::workspace::RecordedNavigator;

    fn named(display: &str) -> Project {
        Project {
            project_name: Some(display.to_string()),
            ..Project::draft()
        }
    }

    fn view_with(
        projects: Vec<Project>,
        access: StaticAccessControl,
    ) -> (Arc<RecordedNavigator>, Arc<ProjectStore>, ListView) {
        let backend = Arc::new(InMemoryBackend::with_projects(projects));
        let store = Arc::new(ProjectStore::new(backend));
        let navigator = Arc::new(RecordedNavigator::new());
        let view = ListView::new(store.clone(), Arc::new(access), navigator.clone());
        (navigator, store, view)
    }

    #[tokio::test]
    async fn test_init_loads_projects_and_clears_loading() {
        let (_nav, _store, mut view) =
            view_with(vec![named("Alpha"), named("Beta")], StaticAccessControl::allow_all());
        assert!(view.loading);

        view.init().await;
        assert!(!view.loading);
        assert_eq!(view.projects.len(), 2);
        assert!(view.add_enabled);
    }

    #[tokio::test]
    async fn test_add_affordance_hidden_without_edit_action() {
        let (nav, _store, mut view) = view_with(vec![], StaticAccessControl::deny_all());
        view.init().await;
        assert!(!view.add_enabled);

        // A gated add is a no-op.
        view.add_project();
        assert!(nav.routes().is_empty());
    }

    #[tokio::test]
    async fn test_add_affordance_hidden_when_lookup_fails() {
        let (_nav, _store, mut view) =
            view_with(vec![], StaticAccessControl::allow_all().failing_action_lookup());
        view.init().await;
        assert!(!view.add_enabled);
        assert!(!view.loading);
    }

    #[tokio::test]
    async fn test_search_filters_by_prefix() {
        let (_nav, _store, mut view) = view_with(
            vec![named("Alpha"), named("Alphabet"), named("Beta")],
            StaticAccessControl::allow_all(),
        );
        view.init().await;

        view.search_query = "alph".to_string();
        assert_eq!(view.filtered().len(), 2);
        view.search_query.clear();
        assert_eq!(view.filtered().len(), 3);
    }

    #[tokio::test]
    async fn test_refresh_observes_store_changes() {
        let (_nav, store, mut view) = view_with(vec![], StaticAccessControl::allow_all());
        view.init().await;
        assert!(view.projects.is_empty());

        let mut saved = named("Gamma");
        saved.id = Some("p-9".to_string());
        store.merge(saved).await;

        view.refresh();
        assert_eq!(view.projects.len(), 1);
    }

    #[tokio::test]
    async fn test_open_navigates_to_details() {
        let (nav, _store, mut view) = view_with(vec![named("Alpha")], StaticAccessControl::allow_all());
        view.init().await;

        let project = view.projects[0].clone();
        view.open(&project);
        assert_eq!(
            nav.last_route(),
            Some(format!("projects/{}", project.id.unwrap()))
        );

        view.add_project();
        assert_eq!(nav.last_route().as_deref(), Some("projects/new"));
    }
}
