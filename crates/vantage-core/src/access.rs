//! Access control collaborators
//!
//! The console gates project affordances two ways: functional actions
//! granted to the current user, and (when the deployment enforces
//! entity-level access control) per-project entity permissions. The trait
//! folds both into `has_permission`, mirroring the console's rule: entity
//! grants apply when entity access control is on, otherwise the functional
//! action decides.
//!
//! Permission-check failures are never surfaced; the affordance simply
//! stays hidden.

use std::collections::HashSet;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::project::Project;

/// Functional action: may edit projects
pub const PROJECTS_EDIT: &str = "editProjects";
/// Functional action: may view projects
pub const PROJECTS_ACCESS: &str = "accessProjects";

/// Per-project entity permissions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityAction {
    EditProjectDetails,
    DeleteProject,
    ChangeProjectPermissions,
}

impl EntityAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EditProjectDetails => "editProjectDetails",
            Self::DeleteProject => "deleteProject",
            Self::ChangeProjectPermissions => "changeProjectPermissions",
        }
    }
}

/// The set of functional actions granted to the current user
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActionSet {
    #[serde(default)]
    pub actions: Vec<String>,
}

impl ActionSet {
    pub fn of(actions: &[&str]) -> Self {
        Self {
            actions: actions.iter().map(|a| a.to_string()).collect(),
        }
    }

    pub fn has_action(&self, action: &str) -> bool {
        self.actions.iter().any(|a| a == action)
    }
}

/// Access control collaborator contract
#[async_trait]
pub trait AccessControl: Send + Sync {
    /// Resolve the current user's functional actions
    async fn allowed_actions(&self) -> Result<ActionSet>;

    /// Whether the deployment enforces entity-level access control
    async fn is_entity_access_controlled(&self) -> bool;

    /// Check one entity permission against a specific project
    async fn has_entity_permission(&self, project: &Project, action: EntityAction) -> Result<bool>;

    /// Combined check: the entity grant when entity access control is on,
    /// the functional action otherwise. Failures read as "not permitted".
    async fn has_permission(
        &self,
        functional_action: &str,
        project: &Project,
        entity_action: EntityAction,
    ) -> bool {
        if self.is_entity_access_controlled().await {
            self.has_entity_permission(project, entity_action)
                .await
                .unwrap_or(false)
        } else {
            self.allowed_actions()
                .await
                .map(|set| set.has_action(functional_action))
                .unwrap_or(false)
        }
    }
}

/// REST access control client against the console's security endpoints
pub struct RestAccessControl {
    http_client: reqwest::Client,
    base_url: String,
    token: Option<String>,
    entity_access_enabled: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EntityCheckRequest<'a> {
    entity_id: &'a str,
    entity_type: &'a str,
    action: &'a str,
}

impl RestAccessControl {
    pub fn new(
        base_url: impl Into<String>,
        token: Option<String>,
        entity_access_enabled: bool,
        timeout_secs: u64,
    ) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(Error::Network)?;
        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
            entity_access_enabled,
        })
    }

    fn request(&self, method: reqwest::Method, url: String) -> reqwest::RequestBuilder {
        let mut builder = self.http_client.request(method, url);
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }
        builder
    }
}

#[async_trait]
impl AccessControl for RestAccessControl {
    async fn allowed_actions(&self) -> Result<ActionSet> {
        let url = format!("{}/v1/security/actions/allowed", self.base_url);
        debug!(%url, "Resolving allowed actions");
        let response = self
            .request(reqwest::Method::GET, url)
            .send()
            .await
            .map_err(Error::Network)?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(Error::Api { status, message });
        }
        response.json().await.map_err(Error::Network)
    }

    async fn is_entity_access_controlled(&self) -> bool {
        self.entity_access_enabled
    }

    async fn has_entity_permission(&self, project: &Project, action: EntityAction) -> Result<bool> {
        // A draft has no entity to check against.
        let Some(id) = project.id.as_deref() else {
            return Ok(false);
        };

        let url = format!("{}/v1/security/entity-access", self.base_url);
        let response = self
            .request(reqwest::Method::POST, url)
            .json(&EntityCheckRequest {
                entity_id: id,
                entity_type: "project",
                action: action.as_str(),
            })
            .send()
            .await
            .map_err(Error::Network)?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(Error::Api { status, message });
        }
        response.json().await.map_err(Error::Network)
    }
}

/// Fixed-grant access control for tests and offline runs
#[derive(Default)]
pub struct StaticAccessControl {
    actions: ActionSet,
    entity_access_controlled: bool,
    entity_grants: Mutex<HashSet<(String, EntityAction)>>,
    fail_action_lookup: bool,
}

impl StaticAccessControl {
    /// Everything permitted; entity access control off
    pub fn allow_all() -> Self {
        Self {
            actions: ActionSet::of(&[PROJECTS_ACCESS, PROJECTS_EDIT]),
            ..Self::default()
        }
    }

    /// Nothing permitted
    pub fn deny_all() -> Self {
        Self::default()
    }

    pub fn with_actions(actions: ActionSet) -> Self {
        Self {
            actions,
            ..Self::default()
        }
    }

    /// Turn on entity-level access control
    pub fn entity_controlled(mut self) -> Self {
        self.entity_access_controlled = true;
        self
    }

    /// Make the action lookup fail, for exercising the hidden-affordance path
    pub fn failing_action_lookup(mut self) -> Self {
        self.fail_action_lookup = true;
        self
    }

    /// Grant one entity permission on one project
    pub fn grant(&self, project_id: &str, action: EntityAction) {
        self.entity_grants
            .lock()
            .unwrap()
            .insert((project_id.to_string(), action));
    }

    /// Revoke one entity permission on one project
    pub fn revoke(&self, project_id: &str, action: EntityAction) {
        self.entity_grants
            .lock()
            .unwrap()
            .remove(&(project_id.to_string(), action));
    }
}

#[async_trait]
impl AccessControl for StaticAccessControl {
    async fn allowed_actions(&self) -> Result<ActionSet> {
        if self.fail_action_lookup {
            return Err(Error::Api {
                status: 503,
                message: "security service unavailable".to_string(),
            });
        }
        Ok(self.actions.clone())
    }

    async fn is_entity_access_controlled(&self) -> bool {
        self.entity_access_controlled
    }

    async fn has_entity_permission(&self, project: &Project, action: EntityAction) -> Result<bool> {
        let Some(id) = project.id.as_deref() else {
            return Ok(false);
        };
        Ok(self
            .entity_grants
            .lock()
            .unwrap()
            .contains(&(id.to_string(), action)))
    }
}
