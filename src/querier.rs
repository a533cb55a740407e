// Authenticated read queries against the Argo CD API

use serde::de::DeserializeOwned;
use std::sync::Arc;

use crate::auth::CredentialCache;
use crate::converters::{convert_application, convert_project};
use crate::error::ApiError;
use crate::http_client::ArgoHttpClient;
use crate::models::api::{ApplicationStatus, ProjectInfo};
use crate::models::argocd::{AppProject, Application, ItemList};

pub const APPLICATIONS_PATH: &str = "/api/v1/applications";
pub const PROJECTS_PATH: &str = "/api/v1/projects";

/// Runs the supported queries with the cached session credential
pub struct ArgoQuerier {
    http: Arc<ArgoHttpClient>,
    credentials: Arc<CredentialCache>,

    /// Cookie name the session token is presented under
    session_cookie: String,
}

impl ArgoQuerier {
    pub fn new(
        http: Arc<ArgoHttpClient>,
        credentials: Arc<CredentialCache>,
        session_cookie: impl Into<String>,
    ) -> Self {
        Self {
            http,
            credentials,
            session_cookie: session_cookie.into(),
        }
    }

    pub fn credential_cache(&self) -> &Arc<CredentialCache> {
        &self.credentials
    }

    /// Sync status of every application
    pub async fn list_applications(&self) -> Result<Vec<ApplicationStatus>, ApiError> {
        let items: Vec<Application> = self.fetch_items(APPLICATIONS_PATH, "applications").await?;
        Ok(items.into_iter().map(convert_application).collect())
    }

    /// Name and namespace of every project
    pub async fn list_projects(&self) -> Result<Vec<ProjectInfo>, ApiError> {
        let items: Vec<AppProject> = self.fetch_items(PROJECTS_PATH, "projects").await?;
        Ok(items.into_iter().map(convert_project).collect())
    }

    /// GET a collection endpoint and return its `items`
    async fn fetch_items<T: DeserializeOwned>(
        &self,
        path: &str,
        what: &str,
    ) -> Result<Vec<T>, ApiError> {
        let credential = self.credentials.get_credential().await?;

        let request = self
            .http
            .client()
            .get(self.http.url(path))
            .header(
                "Cookie",
                format!("{}={}", self.session_cookie, credential.token()),
            )
            .header("Content-Type", "application/json");

        let response = self.http.send(request).await?;
        let status = response.status();
        let body = ArgoHttpClient::read_body(response).await?;

        if !status.is_success() {
            tracing::error!(
                status = status.as_u16(),
                response_body = %body,
                "Failed to fetch {}",
                what
            );
            return Err(ApiError::UpstreamError {
                status: status.as_u16(),
                message: body,
            });
        }

        let list: ItemList<T> = serde_json::from_str(&body).map_err(|e| {
            tracing::error!(error = %e, "Argo CD returned malformed {} payload", what);
            ApiError::UpstreamError {
                status: status.as_u16(),
                message: format!("malformed {} payload: {}", what, e),
            }
        })?;

        let items = list.into_items();
        tracing::info!("Fetched {} {} from Argo CD", items.len(), what);
        Ok(items)
    }
}
