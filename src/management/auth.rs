use std::{future::Future, sync::Arc};

use chrono::Utc;
use reqwest::Client;
use tokio::sync::Mutex;

use crate::{
    config::{ClientCredentials, Settings},
    error::{Error, Result},
    management::{SessionState, TokenStore},
    spotify::auth::{GrantFailure, request_token},
    types::Credential,
};

/// Access tokens are refreshed once they are this close to expiring.
pub const REFRESH_MARGIN_MS: i64 = 300_000;

/// Source of the current time in epoch milliseconds.
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> i64;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// Owns the credential lifecycle: code exchange, proactive refresh and
/// clearing the session when it can no longer be trusted.
pub struct TokenManager {
    settings: Settings,
    store: TokenStore,
    http: Client,
    clock: Arc<dyn Clock>,
    refresh_lock: Mutex<()>,
}

impl TokenManager {
    pub fn new(settings: Settings, store: TokenStore) -> Self {
        TokenManager {
            settings,
            store,
            http: Client::new(),
            clock: Arc::new(SystemClock),
            refresh_lock: Mutex::new(()),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_http_client(mut self, http: Client) -> Self {
        self.http = http;
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn store(&self) -> &TokenStore {
        &self.store
    }

    pub fn http(&self) -> &Client {
        &self.http
    }

    /// Exchanges an authorization code for a credential and stores it.
    ///
    /// Configuration is validated before anything else and leaves the session
    /// untouched. Any later failure clears the stored session, and nothing new
    /// is written.
    pub async fn exchange_code(&self, code: &str) -> Result<Credential> {
        let credentials = self.settings.client_credentials()?;
        let redirect_uri = self.settings.redirect_uri()?;

        match self.grant_code(&credentials, &redirect_uri, code).await {
            Ok(credential) => {
                self.store.save(&credential).await?;
                Ok(credential)
            }
            Err(e) => {
                log::debug!("code exchange failed, clearing stored credential: {e}");
                self.store.clear().await?;
                Err(e)
            }
        }
    }

    async fn grant_code(
        &self,
        credentials: &ClientCredentials,
        redirect_uri: &str,
        code: &str,
    ) -> Result<Credential> {
        if code.trim().is_empty() {
            return Err(Error::TokenExchange {
                status: None,
                error: "no_code".to_string(),
                description: Some("authorization code is empty".to_string()),
            });
        }

        log::debug!("exchanging authorization code ({} chars)", code.len());
        let issued_at = self.clock.now_ms();
        let form = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", redirect_uri),
        ];

        let response = request_token(&self.http, &self.settings.token_url, credentials, &form)
            .await
            .map_err(|failure| match failure {
                GrantFailure::Rejected {
                    status,
                    error,
                    description,
                } => Error::TokenExchange {
                    status: Some(status),
                    error,
                    description,
                },
                GrantFailure::Transport(e) => Error::Http(e),
                GrantFailure::Malformed(m) => Error::MalformedResponse(m),
            })?;

        Credential::issue(&response, issued_at, None)
    }

    /// Returns an access token that is valid for at least [`REFRESH_MARGIN_MS`].
    ///
    /// Refreshes through the token endpoint when the stored one is about to
    /// expire. Overlapping callers share a single refresh. This never clears
    /// the store itself; [`TokenManager::with_valid_token`] does that.
    pub async fn ensure_valid_access_token(&self) -> Result<String> {
        let credential = self.store.load().await?.ok_or(Error::NotAuthenticated)?;
        if !self.needs_refresh(&credential) {
            return Ok(credential.access_token);
        }

        let _guard = self.refresh_lock.lock().await;

        // another caller may have refreshed while we waited for the lock
        let credential = self.store.load().await?.ok_or(Error::NotAuthenticated)?;
        if !self.needs_refresh(&credential) {
            return Ok(credential.access_token);
        }

        let Some(refresh_token) = credential.refresh_token.clone() else {
            return Err(Error::NotAuthenticated);
        };

        log::debug!("access token expiring, refreshing");
        let refreshed = self.refresh(&refresh_token).await?;
        self.store.save(&refreshed).await?;
        log::debug!("access token refreshed");

        Ok(refreshed.access_token)
    }

    /// Runs `op` with a valid access token.
    ///
    /// Every authenticated API call goes through here. If the token cannot be
    /// obtained, or `op` fails with a session failure, the stored credential
    /// is cleared before the error is returned.
    pub async fn with_valid_token<T, F, Fut>(&self, op: F) -> Result<T>
    where
        F: FnOnce(String) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let result = match self.ensure_valid_access_token().await {
            Ok(token) => op(token).await,
            Err(e) => Err(e),
        };

        if let Err(e) = &result {
            if e.is_session_failure() {
                log::debug!("session failure, clearing stored credential: {e}");
                self.store.clear().await?;
            }
        }

        result
    }

    pub async fn logout(&self) -> Result<()> {
        self.store.clear().await
    }

    pub async fn credential(&self) -> Result<Option<Credential>> {
        self.store.load().await
    }

    pub async fn session_state(&self) -> Result<SessionState> {
        Ok(match self.store.load().await? {
            None => SessionState::LoggedOut,
            Some(c) if self.needs_refresh(&c) => SessionState::TokenExpiring,
            Some(_) => SessionState::LoggedIn,
        })
    }

    fn needs_refresh(&self, credential: &Credential) -> bool {
        self.clock.now_ms() >= credential.expires_at_ms - REFRESH_MARGIN_MS
    }

    async fn refresh(&self, refresh_token: &str) -> Result<Credential> {
        let credentials = self.settings.client_credentials()?;
        let issued_at = self.clock.now_ms();
        let form = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ];

        let response = request_token(&self.http, &self.settings.token_url, &credentials, &form)
            .await
            .map_err(|e| Error::TokenRefresh(e.to_string()))?;

        Credential::issue(&response, issued_at, Some(refresh_token.to_string()))
            .map_err(|e| Error::TokenRefresh(e.to_string()))
    }
}
