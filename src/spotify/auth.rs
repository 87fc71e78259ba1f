use std::{sync::Arc, time::Duration};

use reqwest::{Client, Url};

use crate::{
    config::{self, ClientCredentials, Settings},
    error::{Error, Result},
    management::TokenManager,
    server::{LoginOutcome, LoginState, start_api_server},
    types::{Credential, TokenErrorResponse, TokenResponse},
    utils, warning,
};

/// How long the interactive login waits for Spotify to redirect back.
const LOGIN_TIMEOUT: Duration = Duration::from_secs(120);

/// Why a grant request to the token endpoint did not produce a token.
#[derive(Debug)]
pub enum GrantFailure {
    /// The endpoint answered with a non-success status.
    Rejected {
        status: u16,
        error: String,
        description: Option<String>,
    },
    /// The request never produced a response.
    Transport(reqwest::Error),
    /// A success status whose body is not a usable token response.
    Malformed(String),
}

impl std::fmt::Display for GrantFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GrantFailure::Rejected {
                status,
                error,
                description,
            } => match description {
                Some(d) => write!(f, "{error} ({status}): {d}"),
                None => write!(f, "{error} ({status})"),
            },
            GrantFailure::Transport(e) => write!(f, "{e}"),
            GrantFailure::Malformed(m) => write!(f, "{m}"),
        }
    }
}

/// Posts one form-encoded grant to the token endpoint.
///
/// Authenticates with `Authorization: Basic base64(client_id:client_secret)`.
/// A success response without an `access_token` is reported as
/// [`GrantFailure::Malformed`], never as an empty token.
pub async fn request_token(
    http: &Client,
    token_url: &str,
    credentials: &ClientCredentials,
    form: &[(&str, &str)],
) -> std::result::Result<TokenResponse, GrantFailure> {
    let res = http
        .post(token_url)
        .header(
            reqwest::header::AUTHORIZATION,
            utils::basic_auth_header(&credentials.client_id, &credentials.client_secret),
        )
        .form(form)
        .send()
        .await
        .map_err(GrantFailure::Transport)?;

    let status = res.status();
    let body = res.text().await.map_err(GrantFailure::Transport)?;

    if !status.is_success() {
        let parsed: TokenErrorResponse = serde_json::from_str(&body).unwrap_or_default();
        return Err(GrantFailure::Rejected {
            status: status.as_u16(),
            error: parsed.error.unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("unknown_error")
                    .to_string()
            }),
            description: parsed.error_description,
        });
    }

    let token: TokenResponse = serde_json::from_str(&body)
        .map_err(|e| GrantFailure::Malformed(format!("unreadable token response: {e}")))?;

    match token.access_token.as_deref() {
        Some(t) if !t.is_empty() => Ok(token),
        _ => Err(GrantFailure::Malformed(
            "token response missing access_token".to_string(),
        )),
    }
}

/// Builds the Spotify authorization URL the user is sent to.
pub fn authorize_url(settings: &Settings, state: &str) -> Result<Url> {
    let credentials = settings.client_credentials()?;
    let redirect_uri = settings.redirect_uri()?;
    let scope = config::SCOPES.join(" ");

    Url::parse_with_params(
        &settings.auth_url,
        &[
            ("client_id", credentials.client_id.as_str()),
            ("response_type", "code"),
            ("redirect_uri", redirect_uri.as_str()),
            ("scope", scope.as_str()),
            ("show_dialog", "true"),
            ("state", state),
        ],
    )
    .map_err(|e| Error::Configuration(format!("invalid authorization URL: {e}")))
}

/// Runs the interactive authorization-code login.
///
/// 1. Validates configuration and builds the authorization URL
/// 2. Starts the local callback server on `SERVER_ADDRESS`
/// 3. Opens the URL in the default browser (or prints it)
/// 4. Waits for the callback, which exchanges the code via
///    [`TokenManager::exchange_code`] and stores the credential
///
/// Fails with [`Error::Configuration`] before any network activity if the
/// client id, secret or redirect URI is missing.
pub async fn login(tokens: Arc<TokenManager>) -> Result<Credential> {
    let state = utils::generate_state();
    let auth_url = authorize_url(tokens.settings(), &state)?;

    let login_state = Arc::new(LoginState::new(state, Arc::clone(&tokens)));
    let server = start_api_server(Arc::clone(&login_state), &tokens.settings().server_address)
        .await?;

    if webbrowser::open(auth_url.as_str()).is_err() {
        warning!(
            "Failed to open browser. Please navigate to the following URL manually:\n{}",
            auth_url
        );
    }

    let outcome = wait_for_outcome(&login_state).await;
    server.abort();

    match outcome {
        Some(LoginOutcome::Authenticated(credential)) => Ok(credential),
        Some(LoginOutcome::Failed(err)) => Err(err),
        None => Err(Error::Server(
            "authentication timed out waiting for the Spotify callback".to_string(),
        )),
    }
}

/// Polls the shared login state until the callback has produced an outcome
/// or [`LOGIN_TIMEOUT`] elapses.
async fn wait_for_outcome(login_state: &LoginState) -> Option<LoginOutcome> {
    let start = std::time::Instant::now();

    while start.elapsed() < LOGIN_TIMEOUT {
        if let Some(outcome) = login_state.take_outcome().await {
            return Some(outcome);
        }
        tokio::time::sleep(Duration::from_millis(500)).await;
    }

    None
}
