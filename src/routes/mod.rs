use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use std::sync::Arc;

use crate::error::ApiError;
use crate::models::api::{ApplicationStatusResponse, HealthCheckResponse, ProjectsResponse};
use crate::querier::ArgoQuerier;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub querier: Arc<ArgoQuerier>,
}

/// Health check routes (no authentication required)
pub fn health_routes() -> Router {
    Router::new().route("/healthcheck", get(healthcheck_handler))
}

/// Argo CD query routes (authenticate upstream with the cached session)
pub fn argocd_routes(state: AppState) -> Router {
    Router::new()
        .route("/argocd/application_status", get(application_status_handler))
        .route("/argocd/list_projects", get(list_projects_handler))
        .with_state(state)
}

/// GET /healthcheck
///
/// Does not touch Argo CD, so it stays green when the upstream is down.
async fn healthcheck_handler() -> Json<HealthCheckResponse> {
    tracing::debug!("healthcheck hit");
    Json(HealthCheckResponse {
        status_code: StatusCode::OK.as_u16(),
        message: "Server is running!".to_string(),
    })
}

/// GET /argocd/application_status - Sync status of every application
async fn application_status_handler(
    State(state): State<AppState>,
) -> Result<Json<ApplicationStatusResponse>, ApiError> {
    tracing::info!("Fetching Argo CD application status");

    let applications = state
        .querier
        .list_applications()
        .await
        .inspect_err(|e| tracing::error!("Failed to fetch application status: {}", e))?;

    tracing::info!("Successfully fetched {} applications", applications.len());
    Ok(Json(ApplicationStatusResponse { applications }))
}

/// GET /argocd/list_projects - Projects and the namespace they live in
async fn list_projects_handler(
    State(state): State<AppState>,
) -> Result<Json<ProjectsResponse>, ApiError> {
    tracing::info!("Fetching Argo CD projects");

    let projects = state
        .querier
        .list_projects()
        .await
        .inspect_err(|e| tracing::error!("Failed to fetch projects: {}", e))?;

    tracing::info!("Successfully fetched {} projects", projects.len());
    Ok(Json(ProjectsResponse { projects }))
}
