//! Authentication session with a short-lived verification cache.
//!
//! Verifying the token costs a round trip, so a positive result is trusted
//! for [`AUTH_CACHE_WINDOW`]. A negative result is never cached: the next
//! call checks again.

use std::sync::Mutex as StdMutex;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

use plugdash_domain::error::PlugDashError;
use plugdash_domain::user::{AccessToken, Credentials};

use crate::ports::{TokenStore, UserApi};

/// How long a successful verification is reused.
pub const AUTH_CACHE_WINDOW: Duration = Duration::from_secs(60);

#[derive(Debug, Default)]
struct AuthState {
    authenticated: Option<bool>,
    username: Option<String>,
    checked_at: Option<Instant>,
}

impl AuthState {
    fn fresh(&self) -> bool {
        self.authenticated == Some(true)
            && self
                .checked_at
                .is_some_and(|at| at.elapsed() < AUTH_CACHE_WINDOW)
    }

    fn signed_out(&mut self) {
        self.authenticated = Some(false);
        self.username = None;
    }
}

/// Tracks whether the stored token is valid and who it belongs to.
pub struct AuthSession<U, S> {
    api: U,
    store: S,
    state: Mutex<AuthState>,
}

impl<U: UserApi, S: TokenStore> AuthSession<U, S> {
    pub fn new(api: U, store: S) -> Self {
        Self {
            api,
            store,
            state: Mutex::new(AuthState::default()),
        }
    }

    /// Whether the stored token is currently valid.
    ///
    /// Without a stored token this is `false` and no request is made.
    ///
    /// # Errors
    ///
    /// Only token store failures are returned; a failed verification
    /// yields `Ok(false)`.
    #[tracing::instrument(skip(self))]
    pub async fn validate(&self) -> Result<bool, PlugDashError> {
        let mut state = self.state.lock().await;
        if self.store.load().await?.is_none() {
            tracing::debug!("no stored token");
            state.signed_out();
            return Ok(false);
        }
        if state.fresh() {
            return Ok(true);
        }
        match self.api.verify_token().await {
            Ok(user) => {
                tracing::debug!(username = %user.username, "token verified");
                state.authenticated = Some(true);
                state.username = Some(user.username);
            }
            Err(PlugDashError::Unauthorized) => {
                tracing::info!("stored token rejected");
                state.signed_out();
            }
            Err(err) => {
                tracing::warn!(error = %err, "token verification failed");
                state.signed_out();
            }
        }
        state.checked_at = Some(Instant::now());
        Ok(state.authenticated == Some(true))
    }

    /// Log in and persist the returned token.
    ///
    /// # Errors
    ///
    /// Returns the backend's rejection ([`PlugDashError::Unauthorized`] for
    /// bad credentials) or a token store failure.
    #[tracing::instrument(skip(self, credentials), fields(username = %credentials.username))]
    pub async fn login(&self, credentials: &Credentials) -> Result<AccessToken, PlugDashError> {
        let token = self.api.login(credentials).await?;
        self.store.save(&token).await?;
        let mut state = self.state.lock().await;
        state.authenticated = Some(true);
        state.username = Some(credentials.username.clone());
        state.checked_at = Some(Instant::now());
        tracing::info!("logged in");
        Ok(token)
    }

    /// Forget the token.
    ///
    /// # Errors
    ///
    /// Returns a token store failure.
    #[tracing::instrument(skip(self))]
    pub async fn logout(&self) -> Result<(), PlugDashError> {
        self.store.clear().await?;
        let mut state = self.state.lock().await;
        state.signed_out();
        state.checked_at = None;
        Ok(())
    }

    /// Cached flag: `None` until the first check.
    pub async fn is_authenticated(&self) -> Option<bool> {
        self.state.lock().await.authenticated
    }

    /// Username from the last successful check or login.
    pub async fn username(&self) -> Option<String> {
        self.state.lock().await.username.clone()
    }
}

/// Token store kept in memory, for tests and one-off sessions.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: StdMutex<Option<AccessToken>>,
}

impl MemoryTokenStore {
    #[must_use]
    pub fn with_token(token: AccessToken) -> Self {
        Self {
            token: StdMutex::new(Some(token)),
        }
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<AccessToken>> {
        self.token
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(
        &self,
    ) -> impl std::future::Future<Output = Result<Option<AccessToken>, PlugDashError>> + Send {
        let token = self.slot().clone();
        async { Ok(token) }
    }

    fn save(
        &self,
        token: &AccessToken,
    ) -> impl std::future::Future<Output = Result<(), PlugDashError>> + Send {
        *self.slot() = Some(token.clone());
        async { Ok(()) }
    }

    fn clear(&self) -> impl std::future::Future<Output = Result<(), PlugDashError>> + Send {
        *self.slot() = None;
        async { Ok(()) }
    }
}
