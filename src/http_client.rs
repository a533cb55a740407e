use anyhow::{Context, Result};
use reqwest::{Client, RequestBuilder, Response};
use std::time::Duration;

use crate::error::ApiError;

/// Pooled HTTP client for the Argo CD server
///
/// Shared by the session exchange and the data queries. Every request is
/// bounded by the configured timeout and is never retried here.
pub struct ArgoHttpClient {
    /// Shared HTTP client with connection pooling
    client: Client,

    /// Base URL without trailing slash, e.g. `http://localhost:8080`
    base_url: String,
}

impl ArgoHttpClient {
    /// Create a new HTTP client
    ///
    /// With `verify_tls` off, certificate checks are skipped. That is only
    /// meant for port-forwarded or tunnelled Argo CD servers.
    pub fn new(base_url: impl Into<String>, verify_tls: bool, timeout: Duration) -> Result<Self> {
        if !verify_tls {
            tracing::warn!("TLS certificate verification is disabled for Argo CD requests");
        }

        let client = Client::builder()
            .connect_timeout(timeout)
            .timeout(timeout)
            .danger_accept_invalid_certs(!verify_tls)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Absolute URL for an API path
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get the underlying HTTP client
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Send a request and hand back the response whatever its status
    ///
    /// Only failures that produced no response at all are turned into errors;
    /// status handling belongs to the caller.
    pub async fn send(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        let request = request
            .build()
            .map_err(|e| ApiError::Internal(anyhow::anyhow!("Failed to build request: {}", e)))?;

        let method = request.method().clone();
        let url = request.url().clone();
        tracing::debug!(method = %method, url = %url, "Sending HTTP request");

        match self.client.execute(request).await {
            Ok(response) => {
                tracing::debug!(status = %response.status(), url = %url, "Received HTTP response");
                Ok(response)
            }
            Err(e) => {
                let kind = error_kind(&e);
                tracing::error!(
                    error_kind = kind,
                    error = %e,
                    method = %method,
                    url = %url,
                    "HTTP request failed"
                );
                Err(ApiError::TransportError {
                    kind,
                    message: format!("{} {} failed: {}", method, url, e),
                })
            }
        }
    }

    /// Read a response body as text, mapping read failures to transport errors
    pub async fn read_body(response: Response) -> Result<String, ApiError> {
        response.text().await.map_err(|e| ApiError::TransportError {
            kind: error_kind(&e),
            message: format!("Failed to read response body: {}", e),
        })
    }
}

/// Categorize a reqwest error for logs and error mapping
pub fn error_kind(e: &reqwest::Error) -> &'static str {
    if e.is_timeout() {
        "timeout"
    } else if e.is_connect() {
        "connection_failed"
    } else if e.is_request() {
        "request_error"
    } else if e.is_body() {
        "body_error"
    } else if e.is_decode() {
        "decode_error"
    } else {
        "unknown"
    }
}
