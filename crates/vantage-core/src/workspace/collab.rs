//! Navigation and notification collaborators
//!
//! The view models report navigation intents and user-facing messages
//! through these seams; the embedding front end decides what a "toast" or
//! a route push actually looks like.

use std::sync::Mutex;

/// Routing collaborator
pub trait Navigator: Send + Sync {
    /// Navigate to the project list
    fn to_project_list(&self);

    /// Navigate to the details page; `None` opens a new draft
    fn to_project_details(&self, id: Option<&str>);
}

/// Notification collaborator
pub trait Notifier: Send + Sync {
    /// Transient success banner
    fn toast(&self, message: &str);

    /// Blocking error dialog
    fn alert(&self, title: &str, message: &str);
}

/// Navigator that records route pushes; for tests and headless embedders
#[derive(Default)]
pub struct RecordedNavigator {
    routes: Mutex<Vec<String>>,
}

impl RecordedNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn routes(&self) -> Vec<String> {
        self.routes.lock().unwrap().clone()
    }

    pub fn last_route(&self) -> Option<String> {
        self.routes.lock().unwrap().last().cloned()
    }
}

impl Navigator for RecordedNavigator {
    fn to_project_list(&self) {
        self.routes.lock().unwrap().push("projects".to_string());
    }

    fn to_project_details(&self, id: Option<&str>) {
        self.routes
            .lock()
            .unwrap()
            .push(format!("projects/{}", id.unwrap_or("new")));
    }
}

/// Notifier that records messages; for tests and headless embedders
#[derive(Default)]
pub struct RecordedNotifier {
    toasts: Mutex<Vec<String>>,
    alerts: Mutex<Vec<(String, String)>>,
}

impl RecordedNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toasts(&self) -> Vec<String> {
        self.toasts.lock().unwrap().clone()
    }

    pub fn alerts(&self) -> Vec<(String, String)> {
        self.alerts.lock().unwrap().clone()
    }
}

impl Notifier for RecordedNotifier {
    fn toast(&self, message: &str) {
        self.toasts.lock().unwrap().push(message.to_string());
    }

    fn alert(&self, title: &str, message: &str) {
        self.alerts
            .lock()
            .unwrap()
            .push((title.to_string(), message.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recorded_navigator_tracks_routes() {
        let nav = RecordedNavigator::new();
        nav.to_project_list();
        nav.to_project_details(Some("p-1"));
        nav.to_project_details(None);
        assert_eq!(nav.routes(), vec!["projects", "projects/p-1", "projects/new"]);
        assert_eq!(nav.last_route().as_deref(), Some("projects/new"));
    }

    #[test]
    fn test_recorded_notifier_tracks_messages() {
        let notifier = RecordedNotifier::new();
        notifier.toast("Saved the project");
        notifier.alert("Save Failed", "boom");
        assert_eq!(notifier.toasts(), vec!["Saved the project"]);
        assert_eq!(notifier.alerts()[0].0, "Save Failed");
    }
}
