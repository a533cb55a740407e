// Error handling module
// Defines error types and HTTP response conversion

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Errors that can occur while serving a request
#[derive(Error, Debug)]
pub enum ApiError {
    /// The session exchange failed or issued no usable credential
    #[error("Authentication failed: {0}")]
    AuthError(String),

    /// Argo CD answered a data query with a non-success status
    #[error("Argo CD API error: {status} - {message}")]
    UpstreamError { status: u16, message: String },

    /// The request never produced a response (connect failure, timeout, ...)
    #[error("Transport error ({kind}): {message}")]
    TransportError { kind: &'static str, message: String },

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    /// Short machine-readable name used in response bodies and logs
    pub fn error_type(&self) -> &'static str {
        match self {
            ApiError::AuthError(_) => "auth_error",
            ApiError::UpstreamError { .. } => "upstream_error",
            ApiError::TransportError { .. } => "transport_error",
            ApiError::Internal(_) => "internal_error",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::AuthError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::UpstreamError { .. } => StatusCode::BAD_GATEWAY,
            ApiError::TransportError { kind, .. } if *kind == "timeout" => {
                StatusCode::GATEWAY_TIMEOUT
            }
            ApiError::TransportError { .. } => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_type = self.error_type();

        let message = match &self {
            ApiError::Internal(err) => {
                // Log internal errors
                tracing::error!("Internal error: {:?}", err);
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        let body = Json(json!({
            "error": {
                "message": message,
                "type": error_type,
            }
        }));

        (status, body).into_response()
    }
}

// Internal errors keep only their rendered message
impl Clone for ApiError {
    fn clone(&self) -> Self {
        match self {
            ApiError::AuthError(message) => ApiError::AuthError(message.clone()),
            ApiError::UpstreamError { status, message } => ApiError::UpstreamError {
                status: *status,
                message: message.clone(),
            },
            ApiError::TransportError { kind, message } => ApiError::TransportError {
                kind: *kind,
                message: message.clone(),
            },
            ApiError::Internal(err) => ApiError::Internal(anyhow::anyhow!("{:#}", err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = ApiError::AuthError("session request rejected: 401".to_string());
        assert_eq!(
            err.to_string(),
            "Authentication failed: session request rejected: 401"
        );

        let err = ApiError::UpstreamError {
            status: 403,
            message: "permission denied".to_string(),
        };
        assert_eq!(err.to_string(), "Argo CD API error: 403 - permission denied");

        let err = ApiError::TransportError {
            kind: "timeout",
            message: "operation timed out".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Transport error (timeout): operation timed out"
        );
    }

    #[test]
    fn test_clone_keeps_kind_and_message() {
        let err = ApiError::TransportError {
            kind: "timeout",
            message: "timed out".to_string(),
        };
        let copy = err.clone();
        assert_eq!(copy.to_string(), err.to_string());
        assert_eq!(copy.status_code(), StatusCode::GATEWAY_TIMEOUT);

        let err = ApiError::Internal(anyhow::anyhow!("boom").context("while reading"));
        let copy = err.clone();
        assert_eq!(copy.error_type(), "internal_error");
        assert_eq!(copy.to_string(), "Internal error: while reading: boom");
    }

    #[test]
    fn test_error_types() {
        assert_eq!(ApiError::AuthError(String::new()).error_type(), "auth_error");
        assert_eq!(
            ApiError::UpstreamError {
                status: 500,
                message: String::new()
            }
            .error_type(),
            "upstream_error"
        );
        assert_eq!(
            ApiError::Internal(anyhow::anyhow!("boom")).error_type(),
            "internal_error"
        );
    }

    #[tokio::test]
    async fn test_auth_error_response() {
        let response = ApiError::AuthError("no credential issued".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_upstream_error_is_normalized() {
        // Upstream statuses are not forwarded as-is
        for status in [400, 401, 403, 404, 500, 503] {
            let err = ApiError::UpstreamError {
                status,
                message: "failed".to_string(),
            };
            assert_eq!(err.into_response().status(), StatusCode::BAD_GATEWAY);
        }
    }

    #[tokio::test]
    async fn test_transport_error_responses() {
        let err = ApiError::TransportError {
            kind: "timeout",
            message: "timed out".to_string(),
        };
        assert_eq!(err.into_response().status(), StatusCode::GATEWAY_TIMEOUT);

        let err = ApiError::TransportError {
            kind: "connection_failed",
            message: "connection refused".to_string(),
        };
        assert_eq!(err.into_response().status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_internal_error_hides_details() {
        let response = ApiError::Internal(anyhow::anyhow!("secret detail")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"]["message"], "Internal server error");
        assert_eq!(body["error"]["type"], "internal_error");
    }

    #[tokio::test]
    async fn test_error_body_shape() {
        let err = ApiError::UpstreamError {
            status: 403,
            message: "permission denied".to_string(),
        };
        let response = err.into_response();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"]["type"], "upstream_error");
        assert!(body["error"]["message"]
            .as_str()
            .unwrap()
            .contains("403 - permission denied"));
    }
}
