use std::{collections::HashMap, sync::Arc};

use axum::{Extension, extract::Query, response::Html};

use crate::{
    error::Error,
    server::{LoginOutcome, LoginState},
    warning,
};

pub async fn callback(
    Query(params): Query<HashMap<String, String>>,
    Extension(login): Extension<Arc<LoginState>>,
) -> Html<&'static str> {
    if params.get("state") != Some(&login.expected_state) {
        warning!("Ignoring callback with an unexpected state parameter.");
        return Html("<h4>Login failed: state mismatch.</h4>");
    }

    if let Some(error) = params.get("error") {
        if let Err(e) = login.tokens.logout().await {
            warning!("Failed to clear stored session: {}", e);
        }
        login
            .finish(LoginOutcome::Failed(Error::TokenExchange {
                status: None,
                error: error.clone(),
                description: Some("authorization was not granted".to_string()),
            }))
            .await;
        return Html("<h4>Login failed.</h4><p>Spotify did not grant access.</p>");
    }

    let code = params.get("code").map(String::as_str).unwrap_or_default();
    match login.tokens.exchange_code(code).await {
        Ok(credential) => {
            login.finish(LoginOutcome::Authenticated(credential)).await;
            Html("<h2>Authentication successful.</h2><p>Close this browser window.</p>")
        }
        Err(e) => {
            warning!("Token exchange failed: {}", e);
            login.finish(LoginOutcome::Failed(e)).await;
            Html("<h4>Login failed.</h4>")
        }
    }
}
