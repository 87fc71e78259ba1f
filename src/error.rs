//! Error taxonomy shared by the token lifecycle, the API client and the CLI.
//!
//! Errors fall into two families. Session failures (`TokenExchange`,
//! `TokenRefresh`, `NotAuthenticated` and an upstream `401`) mean the stored
//! credential can no longer be trusted and must be cleared. Everything else is
//! reported to the user without touching the session.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Missing configuration: {0}")]
    Configuration(String),

    #[error("Token exchange failed: {}", exchange_message(.error, .description.as_deref()))]
    TokenExchange {
        status: Option<u16>,
        error: String,
        description: Option<String>,
    },

    #[error("Token refresh failed: {0}")]
    TokenRefresh(String),

    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Spotify API returned {status}: {body}")]
    UpstreamApi { status: u16, body: String },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Session storage error: {0}")]
    Storage(String),

    #[error("Callback server error: {0}")]
    Server(String),
}

impl Error {
    /// True when the failure invalidates the current session.
    pub fn is_session_failure(&self) -> bool {
        match self {
            Error::TokenExchange { .. } | Error::TokenRefresh(_) | Error::NotAuthenticated => true,
            Error::UpstreamApi { status, .. } => *status == 401,
            _ => false,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Storage(err.to_string())
    }
}

fn exchange_message(error: &str, description: Option<&str>) -> String {
    let detail = description.unwrap_or(error);
    match error {
        "invalid_grant" => format!(
            "{detail}. Authorization code expired or already used, please log in again"
        ),
        "redirect_uri_mismatch" => format!(
            "{detail}. Redirect URI mismatch, check SPOTIFY_REDIRECT_URI against the app settings"
        ),
        _ => detail.to_string(),
    }
}

pub type Result<T> = std::result::Result<T, Error>;
