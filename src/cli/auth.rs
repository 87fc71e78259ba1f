use chrono::{Local, TimeZone};

use crate::{
    cli::session, error, info,
    management::SessionState,
    spotify, success, warning,
};

pub async fn auth() {
    let tokens = session::token_manager();
    info!("Session: {}", SessionState::Authenticating);

    match spotify::auth::login(tokens).await {
        Ok(credential) => success!(
            "Authentication successful! Access token valid until {}.",
            format_expiry(credential.expires_at_ms)
        ),
        Err(e) if e.is_session_failure() => {
            warning!("Login was not completed: {}", e);
            error!("Please run receiptify auth again.");
        }
        Err(e) => error!("Authentication failed: {}", e),
    }
}

pub async fn logout() {
    match session::token_manager().logout().await {
        Ok(()) => success!("Logged out."),
        Err(e) => error!("Failed to clear session: {}", e),
    }
}

pub async fn status() {
    let tokens = session::token_manager();
    let state = match tokens.session_state().await {
        Ok(state) => state,
        Err(e) => error!("Failed to read session: {}", e),
    };

    info!("Session: {}", state);
    if let Ok(Some(credential)) = tokens.credential().await {
        info!("Access token expires: {}", format_expiry(credential.expires_at_ms));
        if credential.refresh_token.is_none() {
            warning!("No refresh token stored, you will need to log in again once it expires.");
        }
    }
    if state == SessionState::LoggedOut {
        info!("Run receiptify auth to log in.");
    }
}

fn format_expiry(expires_at_ms: i64) -> String {
    Local
        .timestamp_millis_opt(expires_at_ms)
        .single()
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| expires_at_ms.to_string())
}
