//! Remote Project API
//!
//! The backend trait abstracts the console's REST endpoints so the store
//! and view models can run against the live console or an in-memory
//! stand-in.

mod memory;
mod rest;

pub use memory::InMemoryBackend;
pub use rest::{RestBackend, RestBackendBuilder};

use async_trait::async_trait;

use crate::error::Result;
use crate::project::{Project, UserFieldDescriptor};

/// Remote Project API contract
///
/// List/get/create/update/delete on project records keyed by an opaque
/// identifier, plus the naming collaborator that derives canonical system
/// names from display names.
#[async_trait]
pub trait ProjectBackend: Send + Sync {
    /// Fetch the full project collection
    async fn list(&self) -> Result<Vec<Project>>;

    /// Fetch a single project by identifier
    async fn get_by_id(&self, id: &str) -> Result<Project>;

    /// Fetch a single project by system name
    async fn get_by_system_name(&self, system_name: &str) -> Result<Project>;

    /// Create a new project; the returned record carries the assigned id
    async fn create(&self, project: &Project) -> Result<Project>;

    /// Update an existing project by its identifier
    async fn update(&self, project: &Project) -> Result<Project>;

    /// Delete a project by identifier
    async fn delete(&self, id: &str) -> Result<()>;

    /// Derive the canonical system name for a display name
    async fn derive_system_name(&self, display_name: &str) -> Result<String>;

    /// Descriptors for the user fields a new project can carry
    async fn user_fields(&self) -> Result<Vec<UserFieldDescriptor>>;
}
