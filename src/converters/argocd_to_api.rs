// Argo CD to API converter
//
// Missing fields fall back to fixed sentinel values so that every output
// record is fully populated.

use crate::models::api::{ApplicationStatus, ProjectInfo};
use crate::models::argocd::{AppProject, Application};

/// Name used when an item carries no `metadata.name`
pub const UNKNOWN_NAME: &str = "unknown";

/// Sync status used when an application carries no `status.sync.status`
pub const UNKNOWN_SYNC_STATUS: &str = "Unknown";

/// Namespace Argo CD keeps projects in unless told otherwise
pub const DEFAULT_PROJECT_NAMESPACE: &str = "argocd";

pub fn convert_application(app: Application) -> ApplicationStatus {
    let application_name = app
        .metadata
        .and_then(|m| m.name)
        .unwrap_or_else(|| UNKNOWN_NAME.to_string());

    let status = app
        .status
        .and_then(|s| s.sync)
        .and_then(|sync| sync.status)
        .unwrap_or_else(|| UNKNOWN_SYNC_STATUS.to_string());

    ApplicationStatus {
        application_name,
        status,
    }
}

pub fn convert_project(project: AppProject) -> ProjectInfo {
    let metadata = project.metadata.unwrap_or_default();

    ProjectInfo {
        project_name: metadata.name.unwrap_or_else(|| UNKNOWN_NAME.to_string()),
        namespace: metadata
            .namespace
            .unwrap_or_else(|| DEFAULT_PROJECT_NAMESPACE.to_string()),
    }
}
