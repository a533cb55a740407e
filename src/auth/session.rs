// Session exchange with the Argo CD API server

use crate::error::ApiError;
use crate::http_client::ArgoHttpClient;

use super::types::{SessionResponse, StaticCredentials};

/// Session endpoint path
pub const SESSION_PATH: &str = "/api/v1/session";

/// Exchange the static credentials for a session token
pub async fn create_session(
    http: &ArgoHttpClient,
    creds: &StaticCredentials,
) -> Result<String, ApiError> {
    tracing::info!("Requesting Argo CD session for user '{}'...", creds.username);

    let request = http
        .client()
        .post(http.url(SESSION_PATH))
        .header("Content-Type", "application/json")
        .json(creds);

    let response = http.send(request).await?;

    let status = response.status();
    let body = ArgoHttpClient::read_body(response).await?;

    if !status.is_success() {
        tracing::error!(
            status = status.as_u16(),
            response_body = %body,
            "Argo CD authentication failed"
        );
        return Err(ApiError::AuthError(format!(
            "session request rejected: {} - {}",
            status.as_u16(),
            body
        )));
    }

    let data: SessionResponse = serde_json::from_str(&body).map_err(|e| {
        tracing::error!(error = %e, "Argo CD session response is not valid JSON");
        ApiError::AuthError(format!("invalid session response: {}", e))
    })?;

    match data.token {
        Some(token) if !token.is_empty() => {
            tracing::debug!("Argo CD session token fetched");
            Ok(token)
        }
        _ => {
            tracing::error!("Argo CD session response did not contain a token");
            Err(ApiError::AuthError("no credential issued".to_string()))
        }
    }
}
