//! In-memory implementation of the Project API
//!
//! Stands in for the console in tests and offline runs. Tracks request
//! counts and supports failure injection so callers can exercise the
//! store's error paths.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::project::{Project, UserFieldDescriptor};
use crate::validate::normalize_system_name;

use super::ProjectBackend;

/// In-memory project backend
#[derive(Default)]
pub struct InMemoryBackend {
    projects: Mutex<Vec<Project>>,
    next_id: AtomicU64,
    list_calls: AtomicU64,
    fail_lists: AtomicBool,
    fail_writes: AtomicBool,
    list_delay: Mutex<Option<Duration>>,
    user_fields: Mutex<Vec<UserFieldDescriptor>>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the backend with existing records; ids are assigned where missing
    pub fn with_projects(projects: Vec<Project>) -> Self {
        let backend = Self::new();
        {
            let mut guard = backend.projects.lock().unwrap();
            for mut project in projects {
                if project.id.is_none() {
                    project.id = Some(backend.assign_id());
                }
                guard.push(project);
            }
        }
        backend
    }

    fn assign_id(&self) -> String {
        let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        format!("p-{}", n)
    }

    /// Number of full-list requests served so far
    pub fn list_calls(&self) -> u64 {
        self.list_calls.load(Ordering::SeqCst)
    }

    /// Make subsequent list requests fail
    pub fn fail_lists(&self, fail: bool) {
        self.fail_lists.store(fail, Ordering::SeqCst);
    }

    /// Make subsequent create/update/delete requests fail
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Delay list responses, to widen the in-flight window in tests
    pub fn set_list_delay(&self, delay: Duration) {
        *self.list_delay.lock().unwrap() = Some(delay);
    }

    /// Replace the user-field descriptors returned by `user_fields`
    pub fn set_user_fields(&self, fields: Vec<UserFieldDescriptor>) {
        *self.user_fields.lock().unwrap() = fields;
    }

    fn server_error(message: &str) -> Error {
        Error::Api {
            status: 500,
            message: message.to_string(),
        }
    }
}

#[async_trait]
impl ProjectBackend for InMemoryBackend {
    async fn list(&self) -> Result<Vec<Project>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.list_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_lists.load(Ordering::SeqCst) {
            return Err(Self::server_error("list unavailable"));
        }
        Ok(self.projects.lock().unwrap().clone())
    }

    async fn get_by_id(&self, id: &str) -> Result<Project> {
        self.projects
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id.as_deref() == Some(id))
            .cloned()
            .ok_or_else(|| Error::ProjectNotFound(id.to_string()))
    }

    async fn get_by_system_name(&self, system_name: &str) -> Result<Project> {
        self.projects
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.system_name.as_deref() == Some(system_name))
            .cloned()
            .ok_or_else(|| Error::ProjectNotFound(system_name.to_string()))
    }

    async fn create(&self, project: &Project) -> Result<Project> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Self::server_error("create rejected"));
        }
        if project.id.is_some() {
            return Err(Error::Validation(
                "cannot create a project that already has an id".to_string(),
            ));
        }

        let mut guard = self.projects.lock().unwrap();
        if let Some(name) = project.project_name.as_deref()
            && guard.iter().any(|p| p.project_name.as_deref() == Some(name))
        {
            return Err(Error::Api {
                status: 409,
                message: format!("A project named '{}' already exists", name),
            });
        }

        let mut saved = project.clone();
        saved.id = Some(self.assign_id());
        guard.push(saved.clone());
        Ok(saved)
    }

    async fn update(&self, project: &Project) -> Result<Project> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Self::server_error("update rejected"));
        }
        let id = project
            .id
            .as_deref()
            .ok_or_else(|| Error::Validation("cannot update a draft".to_string()))?;

        let mut guard = self.projects.lock().unwrap();
        let slot = guard
            .iter_mut()
            .find(|p| p.id.as_deref() == Some(id))
            .ok_or_else(|| Error::ProjectNotFound(id.to_string()))?;
        *slot = project.clone();
        Ok(project.clone())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Self::server_error("delete rejected"));
        }
        let mut guard = self.projects.lock().unwrap();
        let before = guard.len();
        guard.retain(|p| p.id.as_deref() != Some(id));
        if guard.len() == before {
            return Err(Error::ProjectNotFound(id.to_string()));
        }
        Ok(())
    }

    async fn derive_system_name(&self, display_name: &str) -> Result<String> {
        Ok(normalize_system_name(display_name))
    }

    async fn user_fields(&self) -> Result<Vec<UserFieldDescriptor>> {
        Ok(self.user_fields.lock().unwrap().clone())
    }
}
