//! Configuration management for Receiptify.
//!
//! Values come from environment variables, optionally seeded from a `.env`
//! file in the local data directory. The Spotify client id, client secret and
//! redirect URI are required and have no defaults; endpoint URLs and the
//! callback server address fall back to the public Spotify endpoints and a
//! loopback address.
//!
//! Required values are validated by the operation that needs them rather than
//! at startup, so `receiptify status` keeps working on a half-configured
//! machine while `receiptify auth` fails with [`Error::Configuration`] before
//! touching the network.

use std::{env, path::PathBuf};

use crate::error::{Error, Result};

pub const CLIENT_ID_VAR: &str = "SPOTIFY_CLIENT_ID";
pub const CLIENT_SECRET_VAR: &str = "SPOTIFY_CLIENT_SECRET";
pub const REDIRECT_URI_VAR: &str = "SPOTIFY_REDIRECT_URI";

pub const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";
pub const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
pub const DEFAULT_AUTH_URL: &str = "https://accounts.spotify.com/authorize";
pub const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:8888";

/// Permissions requested during login.
pub const SCOPES: &[&str] = &[
    "user-read-private",
    "user-read-email",
    "user-top-read",
    "playlist-modify-public",
    "playlist-modify-private",
    "user-library-read",
    "user-read-recently-played",
];

/// Loads environment variables from a `.env` file in the local data directory.
///
/// Looks for `receiptify/.env` under the platform data directory:
/// - Linux: `~/.local/share/receiptify/.env`
/// - macOS: `~/Library/Application Support/receiptify/.env`
/// - Windows: `%LOCALAPPDATA%/receiptify/.env`
///
/// A missing file is not an error; variables already present in the process
/// environment always win.
pub async fn load_env() -> Result<()> {
    let path = data_dir().join(".env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent).await?;
    }

    match dotenv::from_path(&path) {
        Ok(()) => log::debug!("loaded environment from {}", path.display()),
        Err(dotenv::Error::Io(_)) => log::debug!("no .env at {}", path.display()),
        Err(e) => return Err(Error::Configuration(format!("{}: {}", path.display(), e))),
    }
    Ok(())
}

/// Root of everything Receiptify keeps on disk.
pub fn data_dir() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("receiptify");
    path
}

/// Client credentials for the token endpoint.
#[derive(Debug, Clone)]
pub struct ClientCredentials {
    pub client_id: String,
    pub client_secret: String,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub redirect_uri: Option<String>,
    pub api_url: String,
    pub token_url: String,
    pub auth_url: String,
    pub server_address: String,
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds settings from an arbitrary key lookup. Blank values count as missing.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Settings {
            client_id: get(CLIENT_ID_VAR),
            client_secret: get(CLIENT_SECRET_VAR),
            redirect_uri: get(REDIRECT_URI_VAR),
            api_url: get("SPOTIFY_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            token_url: get("SPOTIFY_API_TOKEN_URL")
                .unwrap_or_else(|| DEFAULT_TOKEN_URL.to_string()),
            auth_url: get("SPOTIFY_API_AUTH_URL").unwrap_or_else(|| DEFAULT_AUTH_URL.to_string()),
            server_address: get("SERVER_ADDRESS")
                .unwrap_or_else(|| DEFAULT_SERVER_ADDRESS.to_string()),
        }
    }

    pub fn client_credentials(&self) -> Result<ClientCredentials> {
        Ok(ClientCredentials {
            client_id: require(&self.client_id, CLIENT_ID_VAR)?,
            client_secret: require(&self.client_secret, CLIENT_SECRET_VAR)?,
        })
    }

    pub fn redirect_uri(&self) -> Result<String> {
        require(&self.redirect_uri, REDIRECT_URI_VAR)
    }
}

fn require(value: &Option<String>, name: &str) -> Result<String> {
    value
        .clone()
        .ok_or_else(|| Error::Configuration(format!("{name} must be set")))
}
