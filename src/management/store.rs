use std::{
    collections::{BTreeMap, HashMap},
    path::PathBuf,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;

use crate::{
    config,
    error::{Error, Result},
    types::Credential,
};

pub const ACCESS_TOKEN_KEY: &str = "spotify_access_token";
pub const REFRESH_TOKEN_KEY: &str = "spotify_refresh_token";
pub const EXPIRATION_KEY: &str = "token_expiration";

/// Key-value persistence for session data.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;
    async fn set(&self, key: &str, value: &str) -> Result<()>;
    async fn remove(&self, key: &str) -> Result<()>;
    async fn clear(&self) -> Result<()>;
}

/// In-process store, used by tests and for throwaway sessions.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries().insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.entries().remove(key);
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.entries().clear();
        Ok(())
    }
}

/// Store backed by a flat JSON object on disk.
///
/// Every write rewrites the whole file; the mutex keeps concurrent writers
/// from interleaving read-modify-write cycles.
pub struct FileSessionStore {
    path: PathBuf,
    write_lock: tokio::sync::Mutex<()>,
}

impl FileSessionStore {
    pub fn new(path: PathBuf) -> Self {
        FileSessionStore {
            path,
            write_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// Store at `<data_local_dir>/receiptify/cache/session.json`.
    pub fn default_location() -> Self {
        Self::new(config::data_dir().join("cache").join("session.json"))
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    async fn read_all(&self) -> Result<BTreeMap<String, String>> {
        match async_fs::read_to_string(&self.path).await {
            Ok(content) if content.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_all(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            async_fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_string_pretty(entries)?;
        async_fs::write(&self.path, json).await?;
        Ok(())
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_all().await?.remove(key))
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut entries = self.read_all().await?;
        entries.insert(key.to_string(), value.to_string());
        self.write_all(&entries).await
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut entries = self.read_all().await?;
        if entries.remove(key).is_some() {
            self.write_all(&entries).await?;
        }
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        match async_fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Maps a [`Credential`] onto the three persisted session keys.
#[derive(Clone)]
pub struct TokenStore {
    store: Arc<dyn SessionStore>,
}

impl TokenStore {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        TokenStore { store }
    }

    /// Returns the stored credential, or `None` if any required key is
    /// missing or the expiration is unreadable.
    pub async fn load(&self) -> Result<Option<Credential>> {
        let Some(access_token) = self.store.get(ACCESS_TOKEN_KEY).await? else {
            return Ok(None);
        };
        let Some(expiration) = self.store.get(EXPIRATION_KEY).await? else {
            return Ok(None);
        };
        let Ok(expires_at_ms) = expiration.trim().parse::<i64>() else {
            log::warn!("ignoring unreadable {EXPIRATION_KEY} value");
            return Ok(None);
        };

        Ok(Some(Credential {
            access_token,
            refresh_token: self.store.get(REFRESH_TOKEN_KEY).await?,
            expires_at_ms,
        }))
    }

    pub async fn save(&self, credential: &Credential) -> Result<()> {
        if credential.access_token.is_empty() {
            return Err(Error::Storage("refusing to store an empty access token".into()));
        }

        self.store
            .set(ACCESS_TOKEN_KEY, &credential.access_token)
            .await?;
        match &credential.refresh_token {
            Some(refresh) => self.store.set(REFRESH_TOKEN_KEY, refresh).await?,
            None => self.store.remove(REFRESH_TOKEN_KEY).await?,
        }
        self.store
            .set(EXPIRATION_KEY, &credential.expires_at_ms.to_string())
            .await
    }

    pub async fn clear(&self) -> Result<()> {
        self.store.remove(ACCESS_TOKEN_KEY).await?;
        self.store.remove(REFRESH_TOKEN_KEY).await?;
        self.store.remove(EXPIRATION_KEY).await
    }

    pub fn session_store(&self) -> Arc<dyn SessionStore> {
        Arc::clone(&self.store)
    }
}
