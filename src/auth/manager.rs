use chrono::{Duration, Utc};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

use crate::error::ApiError;
use crate::http_client::ArgoHttpClient;

use super::claims;
use super::session;
use super::types::{Credential, StaticCredentials};

/// Single-slot cache for the Argo CD session credential
///
/// Holds at most one credential. Readers take the slot's read lock; the
/// refresh path is the only writer. Refreshes are serialized by
/// `refresh_lock`, and callers that queued behind an in-flight refresh reuse
/// its outcome (credential or error) instead of authenticating again.
pub struct CredentialCache {
    /// Current credential, if any
    slot: RwLock<Option<Credential>>,

    /// Held for the whole duration of a session exchange; guards the error
    /// of the latest attempt, `None` after a success
    refresh_lock: Mutex<Option<ApiError>>,

    /// Number of finished session exchanges
    generation: AtomicU64,

    /// HTTP client for session requests
    http: Arc<ArgoHttpClient>,

    /// Static username/password
    credentials: StaticCredentials,

    /// Lifetime used when the token carries no readable expiry
    default_lifetime: Duration,
}

impl CredentialCache {
    /// Create an empty cache; the first lookup authenticates
    pub fn new(
        http: Arc<ArgoHttpClient>,
        credentials: StaticCredentials,
        default_lifetime_secs: u64,
    ) -> Self {
        Self {
            slot: RwLock::new(None),
            refresh_lock: Mutex::new(None),
            generation: AtomicU64::new(0),
            http,
            credentials,
            default_lifetime: Duration::seconds(default_lifetime_secs.min(u32::MAX as u64) as i64),
        }
    }

    /// Current credential without touching the network
    ///
    /// Returns `None` when the slot is empty or its credential has expired.
    pub async fn cached(&self) -> Option<Credential> {
        let slot = self.slot.read().await;
        slot.as_ref()
            .filter(|c| !c.is_expired_at(Utc::now()))
            .cloned()
    }

    /// Get a valid credential, authenticating if the cache has none
    pub async fn get_credential(&self) -> Result<Credential, ApiError> {
        let observed = self.generation.load(Ordering::Acquire);

        if let Some(credential) = self.cached().await {
            tracing::debug!(
                "Credential cache hit (expires: {})",
                credential.expires_at().to_rfc3339()
            );
            return Ok(credential);
        }

        let mut last_failure = self.refresh_lock.lock().await;

        // Another caller may have refreshed while we waited for the lock
        if let Some(credential) = self.cached().await {
            tracing::debug!("Credential refreshed by a concurrent request, reusing it");
            return Ok(credential);
        }

        // An attempt finished after we started and failed; share its error
        if self.generation.load(Ordering::Acquire) != observed {
            if let Some(err) = &*last_failure {
                tracing::debug!("Concurrent session exchange failed, reusing its error");
                return Err(err.clone());
            }
        }

        tracing::info!("Credential cache is empty or expired, fetching a new session token");
        self.refresh_locked(&mut last_failure).await
    }

    /// Authenticate unconditionally and replace whatever is cached
    pub async fn refresh(&self) -> Result<Credential, ApiError> {
        let mut last_failure = self.refresh_lock.lock().await;
        self.refresh_locked(&mut last_failure).await
    }

    /// Caller must hold `refresh_lock`; `last_failure` is its guarded value
    async fn refresh_locked(
        &self,
        last_failure: &mut Option<ApiError>,
    ) -> Result<Credential, ApiError> {
        let result = self.exchange().await;

        *last_failure = result.as_ref().err().cloned();
        self.generation.fetch_add(1, Ordering::Release);

        result
    }

    /// One session exchange; stores the credential on success
    async fn exchange(&self) -> Result<Credential, ApiError> {
        let token = session::create_session(&self.http, &self.credentials).await?;

        let now = Utc::now();
        let claimed_expiry = claims::unverified_expiry(&token);
        if claimed_expiry.is_none() {
            tracing::debug!(
                "Session token has no readable expiry claim, using default lifetime of {}s",
                self.default_lifetime.num_seconds()
            );
        }
        let lifetime = claims::session_lifetime(claimed_expiry, now, self.default_lifetime);
        let credential = Credential::new(token, now + lifetime);

        {
            let mut slot = self.slot.write().await;
            *slot = Some(credential.clone());
        }

        tracing::info!(
            "Session token cached for {}s (expires: {})",
            lifetime.num_seconds(),
            credential.expires_at().to_rfc3339()
        );

        Ok(credential)
    }
}
