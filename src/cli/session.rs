use std::sync::Arc;

use crate::{
    config::Settings,
    management::{FileSessionStore, TokenManager, TokenStore},
    spotify::SpotifyClient,
};

/// Token manager over the on-disk session store and environment settings.
pub fn token_manager() -> Arc<TokenManager> {
    let store = TokenStore::new(Arc::new(FileSessionStore::default_location()));
    Arc::new(TokenManager::new(Settings::from_env(), store))
}

pub fn client() -> SpotifyClient {
    SpotifyClient::new(token_manager())
}
