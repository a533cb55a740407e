// CORS and request logging middleware

use axum::{
    body::Body,
    http::{HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, Any, CorsLayer};

/// Create CORS middleware layer
///
/// `*` in the list allows any origin (without credentials). Otherwise only the
/// listed origins are allowed, with credentials, and methods/headers mirror the
/// preflight request. An empty list allows no cross-origin callers.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", o);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
}

/// Request logging middleware
///
/// Tags every request with a short id and logs method, path, status and
/// latency once the response is ready.
pub async fn request_logging(request: Request<Body>, next: Next) -> Response {
    let request_id = uuid::Uuid::new_v4().to_string()[..8].to_string();
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    tracing::debug!("[{}] {} {}", request_id, method, path);

    let response = next.run(request).await;

    let status = response.status();
    let latency_ms = start.elapsed().as_millis();
    if status.is_server_error() {
        tracing::warn!(
            "[{}] {} {} -> {} ({}ms)",
            request_id,
            method,
            path,
            status.as_u16(),
            latency_ms
        );
    } else {
        tracing::info!(
            "[{}] {} {} -> {} ({}ms)",
            request_id,
            method,
            path,
            status.as_u16(),
            latency_ms
        );
    }

    response
}
