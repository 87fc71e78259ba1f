//! # Spotify Integration Module
//!
//! Thin, authenticated access to the Spotify Web API. Every call made through
//! [`SpotifyClient`] first goes through
//! [`TokenManager::with_valid_token`](crate::management::TokenManager::with_valid_token),
//! so a request is never sent with a token that is about to expire, and a
//! session failure clears the stored credential.
//!
//! ```text
//! CLI / ReceiptLoader
//!          ↓
//! SpotifyClient ── TokenManager ── token endpoint
//!          ↓
//! Spotify Web API
//! ```
//!
//! ## Submodules
//!
//! - [`auth`] - token endpoint grants, authorization URL, interactive login
//! - [`profile`] - `GET /me`
//! - [`top`] - `GET /me/top/{tracks|artists}`
//! - [`player`] - `GET /me/player/recently-played`
//! - [`library`] - `GET /me/tracks` (saved tracks count)
//! - [`playlist`] - playlist creation and track insertion
//!
//! ## Error handling
//!
//! Non-2xx responses become [`Error::UpstreamApi`] with the status and body;
//! a 2xx body that does not decode becomes [`Error::MalformedResponse`].
//! Nothing is retried automatically.

pub mod auth;
pub mod library;
pub mod player;
pub mod playlist;
pub mod profile;
pub mod top;

use std::sync::Arc;

use reqwest::{Client, Response};
use serde::{Serialize, de::DeserializeOwned};

use crate::{
    error::{Error, Result},
    management::TokenManager,
};

/// Largest page the Spotify API returns for top items and recent plays.
pub const MAX_PAGE_LIMIT: u32 = 50;

#[derive(Clone)]
pub struct SpotifyClient {
    tokens: Arc<TokenManager>,
    http: Client,
    api_url: String,
}

impl SpotifyClient {
    pub fn new(tokens: Arc<TokenManager>) -> Self {
        let http = tokens.http().clone();
        let api_url = tokens.settings().api_url.trim_end_matches('/').to_string();
        SpotifyClient {
            tokens,
            http,
            api_url,
        }
    }

    pub fn tokens(&self) -> &Arc<TokenManager> {
        &self.tokens
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        token: String,
    ) -> Result<T> {
        log::debug!("GET {path}");
        let response = self
            .http
            .get(self.url(path))
            .bearer_auth(token)
            .query(query)
            .send()
            .await?;

        decode(response).await
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        token: String,
    ) -> Result<T> {
        log::debug!("POST {path}");
        let response = self
            .http
            .post(self.url(path))
            .bearer_auth(token)
            .json(body)
            .send()
            .await?;

        decode(response).await
    }
}

/// Clamps a requested page size to what the API accepts.
pub fn clamp_limit(limit: u32) -> u32 {
    limit.clamp(1, MAX_PAGE_LIMIT)
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(Error::UpstreamApi {
            status: status.as_u16(),
            body,
        });
    }

    serde_json::from_str(&body).map_err(|e| Error::MalformedResponse(e.to_string()))
}
