use crate::endpoint::TokenEndpoint;
use crate::types::{ClientIdentity, CredentialStatus, GrantRequest, TokenState};
use crate::{AuthError, Result};
use chrono::{DateTime, Duration, Utc};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

/// Tokens expiring within this window are treated as expiring soon
pub const SAFETY_MARGIN_SECS: i64 = 5 * 60;

/// Credential manager for the LinkedIn OAuth client-credentials flow
///
/// Owns the client identity and the cached access/refresh token pair. Callers
/// use [`CredentialManager::ensure_valid`] before reading the token with
/// [`CredentialManager::current_token`]. Concurrent callers share a single
/// in-flight grant instead of each hitting the token endpoint.
pub struct CredentialManager {
    identity: ClientIdentity,
    endpoint: Arc<dyn TokenEndpoint>,
    state: RwLock<TokenState>,
    grant_gate: Mutex<()>,
    refresh_scheduled: AtomicBool,
    grant_count: AtomicU64,
    last_grant_at: RwLock<Option<DateTime<Utc>>>,
    safety_margin: Duration,
}

impl CredentialManager {
    /// Create a credential manager for `identity` backed by `endpoint`
    pub fn new(identity: ClientIdentity, endpoint: Arc<dyn TokenEndpoint>) -> Self {
        info!("LinkedIn credential manager initialized for client {}", identity.client_id());

        Self {
            identity,
            endpoint,
            state: RwLock::new(TokenState::default()),
            grant_gate: Mutex::new(()),
            refresh_scheduled: AtomicBool::new(false),
            grant_count: AtomicU64::new(0),
            last_grant_at: RwLock::new(None),
            safety_margin: Duration::seconds(SAFETY_MARGIN_SECS),
        }
    }

    pub fn client_id(&self) -> &str {
        self.identity.client_id()
    }

    /// Make sure a token valid beyond the safety margin is cached.
    ///
    /// Order of attempts: cached token, refresh grant, client-credentials
    /// grant. A failed refresh clears the cached state and falls through to a
    /// single client-credentials grant; a failure there is returned as
    /// [`AuthError::AuthenticationFailed`].
    pub async fn ensure_valid(&self) -> Result<()> {
        if self.is_fresh() {
            return Ok(());
        }

        let _gate = self.grant_gate.lock().await;

        // A grant may have completed while this caller waited on the gate.
        if self.is_fresh() {
            debug!("Token refreshed by a concurrent caller");
            return Ok(());
        }

        let refresh_token = self.read_state().refresh_token.clone();
        if let Some(refresh_token) = refresh_token {
            info!("Access token is expired or will expire soon, refreshing...");

            let grant = GrantRequest::RefreshToken {
                client_id: self.identity.client_id().to_string(),
                client_secret: self.identity.client_secret().to_string(),
                refresh_token,
            };

            match self.request_and_store(&grant).await {
                Ok(()) => {
                    info!("Successfully refreshed access token");
                    return Ok(());
                }
                Err(e) => {
                    warn!("Token refresh failed, falling back to a full grant: {}", e);
                    self.write_state().clear();
                }
            }
        }

        info!("Requesting client credentials grant");
        let grant = GrantRequest::ClientCredentials {
            client_id: self.identity.client_id().to_string(),
            client_secret: self.identity.client_secret().to_string(),
        };

        self.request_and_store(&grant).await.map_err(|e| {
            error!("LinkedIn authentication failed: {}", e);
            AuthError::AuthenticationFailed(e.to_string())
        })?;

        info!("LinkedIn authentication successful");
        Ok(())
    }

    /// Return the cached access token.
    ///
    /// When the token is within the safety margin a background refresh is
    /// scheduled; the cached token is still returned to this caller.
    pub fn current_token(self: &Arc<Self>) -> Result<String> {
        let (token, expiring) = {
            let state = self.read_state();
            (
                state.access_token.clone(),
                state.is_expiring_soon_at(Utc::now(), self.safety_margin),
            )
        };

        let token = token.ok_or_else(|| {
            warn!("Access token requested before authentication");
            AuthError::Unauthenticated
        })?;

        if expiring {
            self.schedule_background_refresh();
        }

        Ok(token)
    }

    /// True when no expiry is known or the token expires within the safety margin
    pub fn is_expiring_soon(&self) -> bool {
        self.is_expiring_soon_at(Utc::now())
    }

    pub fn is_expiring_soon_at(&self, now: DateTime<Utc>) -> bool {
        self.read_state().is_expiring_soon_at(now, self.safety_margin)
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.read_state().expires_at
    }

    /// Snapshot of the grant state without any secret material
    pub fn status(&self) -> CredentialStatus {
        let state = self.read_state();
        CredentialStatus {
            authenticated: state.access_token.is_some(),
            expires_at: state.expires_at,
            has_refresh_token: state.refresh_token.is_some(),
            grant_count: self.grant_count.load(Ordering::Relaxed),
            last_grant_at: *self
                .last_grant_at
                .read()
                .unwrap_or_else(PoisonError::into_inner),
        }
    }

    fn schedule_background_refresh(self: &Arc<Self>) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            debug!("No async runtime available, skipping background refresh");
            return;
        };

        if self.refresh_scheduled.swap(true, Ordering::AcqRel) {
            return;
        }

        debug!("Scheduling background token refresh");
        let manager = Arc::clone(self);
        handle.spawn(async move {
            match manager.ensure_valid().await {
                Ok(()) => debug!("Background token refresh completed"),
                Err(e) => warn!("Background token refresh failed: {}", e),
            }
            manager.refresh_scheduled.store(false, Ordering::Release);
        });
    }

    fn is_fresh(&self) -> bool {
        self.read_state().is_fresh_at(Utc::now(), self.safety_margin)
    }

    /// Run one grant and cache its result; nothing is stored on failure
    async fn request_and_store(&self, grant: &GrantRequest) -> Result<()> {
        let response = self.endpoint.request_token(grant).await?;
        let now = Utc::now();
        self.write_state().apply(response, now)?;
        self.grant_count.fetch_add(1, Ordering::Relaxed);
        *self
            .last_grant_at
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(now);
        Ok(())
    }

    fn read_state(&self) -> RwLockReadGuard<'_, TokenState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, TokenState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    #[cfg(test)]
    fn with_state(self, state: TokenState) -> Self {
        *self.write_state() = state;
        self
    }
}
