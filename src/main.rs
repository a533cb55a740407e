use anyhow::Result;
use std::sync::Arc;

use argocd_querier::{
    auth::CredentialCache,
    config::{Config, LogFormat},
    http_client::ArgoHttpClient,
    middleware,
    querier::ArgoQuerier,
    routes,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (for log level)
    let config = Config::load()?;
    config.validate()?;

    init_logging(&config);

    tracing::info!("🚀 Argo CD Querier starting...");
    tracing::info!(
        "Server configured: {}:{}",
        config.server_host,
        config.server_port
    );
    tracing::debug!("Running with config: {:?}", config);

    // Initialize HTTP client
    let http_client = Arc::new(ArgoHttpClient::new(
        config.argocd_url.clone(),
        config.ssl_verify,
        config.request_timeout(),
    )?);
    tracing::info!("✅ HTTP client initialized for {}", http_client.base_url());

    // Initialize credential cache
    let credential_cache = Arc::new(CredentialCache::new(
        http_client.clone(),
        config.credentials.clone(),
        config.token_cache_ttl,
    ));

    // Warm the cache so misconfigured credentials show up at startup
    tracing::info!("Authenticating with Argo CD...");
    match credential_cache.get_credential().await {
        Ok(credential) => {
            tracing::info!(
                "✅ Authentication successful (session valid until {})",
                credential.expires_at().to_rfc3339()
            );
        }
        Err(e) => {
            tracing::error!("❌ Authentication failed: {}", e);
            tracing::warn!(
                "Server will start but Argo CD requests will fail until authentication succeeds"
            );
        }
    }

    let querier = Arc::new(ArgoQuerier::new(
        http_client.clone(),
        credential_cache.clone(),
        config.session_cookie.clone(),
    ));

    let app_state = routes::AppState { querier };

    // Build the application with routes and middleware
    let app = build_app(app_state, &config);

    // Bind to configured host and port
    let addr = format!("{}:{}", config.server_host, config.server_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    // Print startup banner
    print_startup_banner(&config);

    // Start server with graceful shutdown
    tracing::info!("🚀 Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("👋 Server shutdown complete");

    Ok(())
}

/// Initialize tracing with the configured level and format
fn init_logging(config: &Config) {
    let log_level = config.log_level.to_lowercase();
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level));

    match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .with_file(true)
            .with_line_number(true)
            .init(),
        LogFormat::Text => tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .with_thread_ids(false)
            .with_file(true)
            .with_line_number(true)
            .init(),
    }
}

/// Build the application with all routes and middleware
fn build_app(state: routes::AppState, config: &Config) -> axum::Router {
    use axum::Router;

    // Health check routes (no upstream calls)
    let health_routes = routes::health_routes();

    // Argo CD routes (cached session)
    let argocd_routes = routes::argocd_routes(state);

    Router::new()
        .merge(health_routes)
        .merge(argocd_routes)
        // Apply middleware stack: CORS → request logging
        .layer(middleware::cors_layer(&config.backend_origins))
        .layer(axum::middleware::from_fn(middleware::request_logging))
}

/// Print startup banner
fn print_startup_banner(config: &Config) {
    let banner = r#"
╔═══════════════════════════════════════════════════════════╗
║                                                           ║
║                  🚀 Argo CD Querier                       ║
║                                                           ║
║  Cached-session facade for the Argo CD API                ║
║                                                           ║
╚═══════════════════════════════════════════════════════════╝
"#;

    println!("{}", banner);
    println!("  Version:     {}", env!("CARGO_PKG_VERSION"));
    println!(
        "  Server:      http://{}:{}",
        config.server_host, config.server_port
    );
    println!("  Argo CD:     {}", config.argocd_url);
    println!(
        "  TLS Verify:  {}",
        if config.ssl_verify { "enabled" } else { "disabled" }
    );
    println!("  Token TTL:   {}s (default)", config.token_cache_ttl);
    println!("  Log Level:   {}", config.log_level);
    println!();
}

/// Handle graceful shutdown signal
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received terminate signal, initiating graceful shutdown...");
        },
    }
}
