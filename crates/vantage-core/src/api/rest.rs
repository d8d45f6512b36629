//! REST implementation of the Project API
//!
//! Thin reqwest client over the console's project-manager endpoints with
//! JSON bodies and bearer-token auth.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use tracing::debug;

use crate::error::{Error, Result};
use crate::project::{Project, UserFieldDescriptor};

use super::ProjectBackend;

/// Projects collection path under the console base URL
const PROJECTS_PATH: &str = "/v1/project-manager/projects";

/// Naming collaborator path (display name -> canonical system name)
const SYSTEM_NAME_PATH: &str = "/v1/project-manager/util/system-name";

/// Default request timeout in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// REST backend for the Remote Project API
///
/// Thread-safe client; clone freely, the underlying connection pool is
/// shared.
#[derive(Clone)]
pub struct RestBackend {
    http_client: HttpClient,
    base_url: String,
    token: Option<String>,
}

impl std::fmt::Debug for RestBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestBackend")
            .field("base_url", &self.base_url)
            .field("authenticated", &self.token.is_some())
            .finish()
    }
}

/// Builder for creating a RestBackend
pub struct RestBackendBuilder {
    base_url: Option<String>,
    token: Option<String>,
    timeout_secs: Option<u64>,
}

impl Default for RestBackendBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RestBackendBuilder {
    pub fn new() -> Self {
        Self {
            base_url: None,
            token: None,
            timeout_secs: None,
        }
    }

    /// Set the console base URL (required)
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the bearer token for authentication
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Set the request timeout
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// Build the RestBackend
    pub fn build(self) -> Result<RestBackend> {
        let base_url = self
            .base_url
            .ok_or_else(|| Error::Config("console base URL is required".to_string()))?;

        let http_client = HttpClient::builder()
            .timeout(Duration::from_secs(
                self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
            ))
            .build()
            .map_err(Error::Network)?;

        Ok(RestBackend {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: self.token,
        })
    }
}

impl RestBackend {
    /// Create a new builder for RestBackend
    pub fn builder() -> RestBackendBuilder {
        RestBackendBuilder::new()
    }

    fn projects_url(&self) -> String {
        format!("{}{}", self.base_url, PROJECTS_PATH)
    }

    fn request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        let mut builder = self.http_client.request(method, url);
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    /// Map a non-success response to a typed error, extracting the server's
    /// `message` from the JSON body when present.
    async fn handle_error_response<T>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();

        let message = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|json| {
                json.get("message")
                    .and_then(|m| m.as_str())
                    .map(str::to_string)
            })
            .unwrap_or(body);

        Err(Error::Api { status, message })
    }

    async fn read_json<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T> {
        if !response.status().is_success() {
            return self.handle_error_response(response).await;
        }
        response.json().await.map_err(Error::Network)
    }
}

#[async_trait]
impl ProjectBackend for RestBackend {
    async fn list(&self) -> Result<Vec<Project>> {
        debug!(url = %self.projects_url(), "Listing projects");
        let response = self
            .request(reqwest::Method::GET, &self.projects_url())
            .send()
            .await
            .map_err(Error::Network)?;
        self.read_json(response).await
    }

    async fn get_by_id(&self, id: &str) -> Result<Project> {
        let url = format!("{}/{}", self.projects_url(), id);
        debug!(%url, "Fetching project by id");
        let response = self
            .request(reqwest::Method::GET, &url)
            .send()
            .await
            .map_err(Error::Network)?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(Error::ProjectNotFound(id.to_string()));
        }
        self.read_json(response).await
    }

    async fn get_by_system_name(&self, system_name: &str) -> Result<Project> {
        let url = format!("{}/by-system-name/{}", self.projects_url(), system_name);
        debug!(%url, "Fetching project by system name");
        let response = self
            .request(reqwest::Method::GET, &url)
            .send()
            .await
            .map_err(Error::Network)?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(Error::ProjectNotFound(system_name.to_string()));
        }
        self.read_json(response).await
    }

    async fn create(&self, project: &Project) -> Result<Project> {
        debug!(name = ?project.project_name, "Creating project");
        let response = self
            .request(reqwest::Method::POST, &self.projects_url())
            .json(project)
            .send()
            .await
            .map_err(Error::Network)?;
        self.read_json(response).await
    }

    async fn update(&self, project: &Project) -> Result<Project> {
        debug!(id = ?project.id, "Updating project");
        let response = self
            .request(reqwest::Method::PUT, &self.projects_url())
            .json(project)
            .send()
            .await
            .map_err(Error::Network)?;
        self.read_json(response).await
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let url = format!("{}/{}", self.projects_url(), id);
        debug!(%url, "Deleting project");
        let response = self
            .request(reqwest::Method::DELETE, &url)
            .send()
            .await
            .map_err(Error::Network)?;
        if !response.status().is_success() {
            return self.handle_error_response(response).await;
        }
        Ok(())
    }

    async fn derive_system_name(&self, display_name: &str) -> Result<String> {
        let url = format!("{}{}", self.base_url, SYSTEM_NAME_PATH);
        let response = self
            .request(reqwest::Method::GET, &url)
            .query(&[("name", display_name)])
            .send()
            .await
            .map_err(Error::Network)?;
        self.read_json(response).await
    }

    async fn user_fields(&self) -> Result<Vec<UserFieldDescriptor>> {
        let url = format!("{}/user-fields", self.projects_url());
        let response = self
            .request(reqwest::Method::GET, &url)
            .send()
            .await
            .map_err(Error::Network)?;
        self.read_json(response).await
    }
}
