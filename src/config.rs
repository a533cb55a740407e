use anyhow::{Context, Result};
use clap::Parser;
use std::time::Duration;

use crate::auth::StaticCredentials;

/// Argo CD Querier - cached-session facade for the Argo CD API
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Server host address
    #[arg(short = 'H', long, env = "SERVER_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Server port
    #[arg(short, long, env = "SERVER_PORT", default_value = "9000")]
    pub port: u16,

    /// Argo CD server base URL (http:// is assumed when no scheme is given)
    #[arg(long, env = "ARGOCD_URL")]
    pub argocd_url: Option<String>,

    /// Argo CD username
    #[arg(short, long, env = "ARGOCD_USERNAME")]
    pub username: Option<String>,

    /// Argo CD password
    #[arg(long, env = "ARGOCD_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Session lifetime in seconds when the token carries no expiry claim
    #[arg(long, env = "TOKEN_CACHE_TTL", default_value = "3600")]
    pub token_cache_ttl: u64,

    /// Allowed CORS origins (comma-separated, "*" for any)
    #[arg(long, env = "BACKEND_ORIGINS", value_delimiter = ',', default_value = "")]
    pub backend_origins: Vec<String>,

    /// Verify TLS certificates of the Argo CD server
    #[arg(
        long,
        env = "SSL_VERIFY",
        default_value = "true",
        action = clap::ArgAction::Set,
        value_parser = clap::builder::BoolishValueParser::new()
    )]
    pub ssl_verify: bool,

    /// Upstream request timeout in seconds
    #[arg(long, env = "HTTP_REQUEST_TIMEOUT", default_value = "10")]
    pub http_timeout: u64,

    /// Cookie name Argo CD reads the session token from
    #[arg(long, env = "ARGOCD_SESSION_COOKIE", default_value = "argocd.token")]
    pub session_cookie: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Log format (text, json)
    #[arg(long, env = "LOG_FORMAT", default_value = "text")]
    pub log_format: String,
}

#[derive(Clone, Debug)]
pub struct Config {
    // Server settings
    pub server_host: String,
    pub server_port: u16,

    // Argo CD
    pub argocd_url: String,
    pub credentials: StaticCredentials,
    pub session_cookie: String,

    // Credential cache
    pub token_cache_ttl: u64,

    // HTTP client
    pub http_request_timeout: u64,
    pub ssl_verify: bool,

    // CORS
    pub backend_origins: Vec<String>,

    // Logging
    pub log_level: String,
    pub log_format: LogFormat,
}

#[derive(Clone, Debug, PartialEq)]
pub enum LogFormat {
    Text,
    Json,
}

impl Config {
    /// Load configuration from all sources with priority: CLI > ENV > defaults
    pub fn load() -> Result<Self> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        Self::from_args(CliArgs::parse())
    }

    /// Build a config from already-parsed arguments
    pub fn from_args(args: CliArgs) -> Result<Self> {
        let argocd_url = args
            .argocd_url
            .context("ARGOCD_URL is required (use --argocd-url or set ARGOCD_URL env var)")?;
        let username = args
            .username
            .context("ARGOCD_USERNAME is required (use -u or set ARGOCD_USERNAME env var)")?;
        let password = args
            .password
            .context("ARGOCD_PASSWORD is required (use --password or set ARGOCD_PASSWORD env var)")?;

        Ok(Config {
            server_host: args.host,
            server_port: args.port,
            argocd_url: normalize_base_url(&argocd_url),
            credentials: StaticCredentials::new(username, password),
            session_cookie: args.session_cookie,
            token_cache_ttl: args.token_cache_ttl,
            http_request_timeout: args.http_timeout,
            ssl_verify: args.ssl_verify,
            backend_origins: parse_origins(&args.backend_origins),
            log_level: args.log_level,
            log_format: parse_log_format(&args.log_format),
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.credentials.username.is_empty() {
            anyhow::bail!("ARGOCD_USERNAME cannot be empty");
        }
        if self.credentials.password.is_empty() {
            anyhow::bail!("ARGOCD_PASSWORD cannot be empty");
        }
        if self.token_cache_ttl == 0 {
            anyhow::bail!("TOKEN_CACHE_TTL must be greater than zero");
        }
        if self.http_request_timeout == 0 {
            anyhow::bail!("HTTP_REQUEST_TIMEOUT must be greater than zero");
        }
        if self.session_cookie.is_empty() {
            anyhow::bail!("ARGOCD_SESSION_COOKIE cannot be empty");
        }

        let url = reqwest::Url::parse(&self.argocd_url)
            .with_context(|| format!("ARGOCD_URL is not a valid URL: {}", self.argocd_url))?;
        if !matches!(url.scheme(), "http" | "https") {
            anyhow::bail!("ARGOCD_URL must use http or https, got: {}", url.scheme());
        }

        for origin in &self.backend_origins {
            if origin != "*" && axum::http::HeaderValue::from_str(origin).is_err() {
                anyhow::bail!("BACKEND_ORIGINS contains an invalid origin: {}", origin);
            }
        }

        Ok(())
    }

    /// Upstream request timeout
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.http_request_timeout)
    }
}

/// Prepend http:// when no scheme is given and drop trailing slashes
fn normalize_base_url(url: &str) -> String {
    let url = url.trim().trim_end_matches('/');
    if url.contains("://") {
        url.to_string()
    } else {
        format!("http://{}", url)
    }
}

/// Drop blank entries from the origin list
fn parse_origins(raw: &[String]) -> Vec<String> {
    raw.iter()
        .map(|s| s.trim().trim_end_matches('/').to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Parse log format from string
fn parse_log_format(s: &str) -> LogFormat {
    match s.to_lowercase().as_str() {
        "json" => LogFormat::Json,
        _ => LogFormat::Text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> CliArgs {
        let mut argv = vec!["argocd-querier"];
        argv.extend_from_slice(args);
        CliArgs::try_parse_from(argv).unwrap()
    }

    fn test_config() -> Config {
        Config::from_args(parse(&[
            "--argocd-url",
            "localhost:8080",
            "--username",
            "admin",
            "--password",
            "secret",
        ]))
        .unwrap()
    }

    #[test]
    fn test_normalize_base_url() {
        assert_eq!(normalize_base_url("localhost:8080"), "http://localhost:8080");
        assert_eq!(
            normalize_base_url("https://argocd.example.com/"),
            "https://argocd.example.com"
        );
        assert_eq!(
            normalize_base_url("  argocd-server.argocd.svc.cluster.local  "),
            "http://argocd-server.argocd.svc.cluster.local"
        );
    }

    #[test]
    fn test_parse_origins() {
        let raw = vec![
            "http://localhost:3000".to_string(),
            " ".to_string(),
            "https://ui.example.com/".to_string(),
        ];
        assert_eq!(
            parse_origins(&raw),
            vec!["http://localhost:3000", "https://ui.example.com"]
        );
        assert!(parse_origins(&[String::new()]).is_empty());
    }

    #[test]
    fn test_parse_log_format() {
        assert_eq!(parse_log_format("json"), LogFormat::Json);
        assert_eq!(parse_log_format("JSON"), LogFormat::Json);
        assert_eq!(parse_log_format("text"), LogFormat::Text);
        assert_eq!(parse_log_format("whatever"), LogFormat::Text);
    }

    #[test]
    fn test_defaults() {
        let config = test_config();
        assert_eq!(config.server_host, "0.0.0.0");
        assert_eq!(config.server_port, 9000);
        assert_eq!(config.argocd_url, "http://localhost:8080");
        assert_eq!(config.token_cache_ttl, 3600);
        assert_eq!(config.http_request_timeout, 10);
        assert!(config.ssl_verify);
        assert_eq!(config.session_cookie, "argocd.token");
        assert!(config.backend_origins.is_empty());
        assert_eq!(config.log_format, LogFormat::Text);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_cli_overrides() {
        let config = Config::from_args(parse(&[
            "--argocd-url",
            "https://argocd.example.com",
            "--username",
            "admin",
            "--password",
            "secret",
            "--ssl-verify",
            "false",
            "--backend-origins",
            "http://a.example.com,http://b.example.com",
            "--token-cache-ttl",
            "120",
        ]))
        .unwrap();

        assert!(!config.ssl_verify);
        assert_eq!(config.token_cache_ttl, 120);
        assert_eq!(
            config.backend_origins,
            vec!["http://a.example.com", "http://b.example.com"]
        );
    }

    #[test]
    fn test_missing_required_values() {
        // Only meaningful when the environment does not provide them
        if std::env::var("ARGOCD_URL").is_err() {
            let err = Config::from_args(parse(&["--username", "a", "--password", "b"]))
                .unwrap_err();
            assert!(err.to_string().contains("ARGOCD_URL"));
        }
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = test_config();
        config.token_cache_ttl = 0;
        assert!(config.validate().is_err());

        let mut config = test_config();
        config.http_request_timeout = 0;
        assert!(config.validate().is_err());

        let mut config = test_config();
        config.argocd_url = "ftp://argocd".to_string();
        assert!(config.validate().is_err());

        let mut config = test_config();
        config.credentials = StaticCredentials::new("admin", "");
        assert!(config.validate().is_err());

        let mut config = test_config();
        config.backend_origins = vec!["http://bad\norigin".to_string()];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_debug_output_hides_password() {
        let config = test_config();
        let debug = format!("{:?}", config);
        assert!(!debug.contains("secret"));
    }
}
