use std::{net::SocketAddr, str::FromStr, sync::Arc};

use axum::{Extension, Router, routing::get};
use tokio::{sync::Mutex, task::JoinHandle};

use crate::{
    api,
    error::{Error, Result},
    management::TokenManager,
    types::Credential,
};

pub enum LoginOutcome {
    Authenticated(Credential),
    Failed(Error),
}

/// State shared between the login flow and the callback handler.
pub struct LoginState {
    pub expected_state: String,
    pub tokens: Arc<TokenManager>,
    outcome: Mutex<Option<LoginOutcome>>,
}

impl LoginState {
    pub fn new(expected_state: String, tokens: Arc<TokenManager>) -> Self {
        LoginState {
            expected_state,
            tokens,
            outcome: Mutex::new(None),
        }
    }

    pub async fn finish(&self, outcome: LoginOutcome) {
        *self.outcome.lock().await = Some(outcome);
    }

    pub async fn take_outcome(&self) -> Option<LoginOutcome> {
        self.outcome.lock().await.take()
    }
}

pub fn router(state: Arc<LoginState>) -> Router {
    Router::new()
        .route("/health", get(api::health))
        .route("/callback", get(api::callback).layer(Extension(state)))
}

/// Binds the callback server and serves it in the background.
pub async fn start_api_server(state: Arc<LoginState>, address: &str) -> Result<JoinHandle<()>> {
    let addr = SocketAddr::from_str(address)
        .map_err(|e| Error::Server(format!("failed to parse server address {address}: {e}")))?;

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| Error::Server(format!("failed to bind {addr}: {e}")))?;
    log::debug!("callback server listening on {addr}");

    let app = router(state);
    Ok(tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            log::error!("callback server stopped: {e}");
        }
    }))
}
