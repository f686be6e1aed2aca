use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::error::{ApiError, ApiResult};

/// Storage key for the access token.
pub const ACCESS_TOKEN_KEY: &str = "access_token";
/// Storage key for the refresh token.
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";

/// The live credential pair. Created on login or refresh, destroyed on
/// logout, unrecoverable refresh failure, or a malformed access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialPair {
    pub access_token: String,
    pub refresh_token: String,
}

impl CredentialPair {
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
        }
    }
}

/// Durable key-value storage for the credential pair. Under normal
/// operation both keys are present or neither is; a refresh overwrites the
/// access token alone.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn access_token(&self) -> ApiResult<Option<String>>;

    async fn refresh_token(&self) -> ApiResult<Option<String>>;

    /// Store both tokens, replacing any previous pair.
    async fn store_pair(&self, pair: &CredentialPair) -> ApiResult<()>;

    /// Overwrite the access token, leaving the refresh token unchanged.
    async fn store_access_token(&self, token: &str) -> ApiResult<()>;

    /// Remove both tokens.
    async fn purge(&self) -> ApiResult<()>;
}

/// In-process credential store. Used by tests and by embedders that manage
/// persistence themselves.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn get(&self, key: &str) -> Option<String> {
        self.values.read().await.get(key).cloned()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn access_token(&self) -> ApiResult<Option<String>> {
        Ok(self.get(ACCESS_TOKEN_KEY).await)
    }

    async fn refresh_token(&self) -> ApiResult<Option<String>> {
        Ok(self.get(REFRESH_TOKEN_KEY).await)
    }

    async fn store_pair(&self, pair: &CredentialPair) -> ApiResult<()> {
        let mut values = self.values.write().await;
        values.insert(ACCESS_TOKEN_KEY.to_string(), pair.access_token.clone());
        values.insert(REFRESH_TOKEN_KEY.to_string(), pair.refresh_token.clone());
        Ok(())
    }

    async fn store_access_token(&self, token: &str) -> ApiResult<()> {
        self.values
            .write()
            .await
            .insert(ACCESS_TOKEN_KEY.to_string(), token.to_string());
        Ok(())
    }

    async fn purge(&self) -> ApiResult<()> {
        let mut values = self.values.write().await;
        values.remove(ACCESS_TOKEN_KEY);
        values.remove(REFRESH_TOKEN_KEY);
        Ok(())
    }
}

/// Credential store persisted as a JSON document on disk, surviving
/// process restarts. The whole document is rewritten on every mutation.
#[derive(Debug)]
pub struct FileCredentialStore {
    path: PathBuf,
    cache: Arc<RwLock<HashMap<String, String>>>,
}

impl FileCredentialStore {
    /// Open a store at the given path, loading any existing document.
    pub async fn open(path: impl AsRef<Path>) -> ApiResult<Self> {
        let path = path.as_ref().to_path_buf();
        let values = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => serde_json::from_str(&contents)
                .map_err(|e| ApiError::Storage(format!("corrupt credential file: {}", e)))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no credential file found, starting empty");
                HashMap::new()
            }
            Err(e) => return Err(ApiError::Storage(e.to_string())),
        };

        Ok(Self {
            path,
            cache: Arc::new(RwLock::new(values)),
        })
    }

    async fn save(&self, values: &HashMap<String, String>) -> ApiResult<()> {
        let contents = serde_json::to_string_pretty(values)
            .map_err(|e| ApiError::Storage(e.to_string()))?;
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| ApiError::Storage(e.to_string()))?;
        }
        tokio::fs::write(&self.path, contents)
            .await
            .map_err(|e| ApiError::Storage(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    async fn access_token(&self) -> ApiResult<Option<String>> {
        Ok(self.cache.read().await.get(ACCESS_TOKEN_KEY).cloned())
    }

    async fn refresh_token(&self) -> ApiResult<Option<String>> {
        Ok(self.cache.read().await.get(REFRESH_TOKEN_KEY).cloned())
    }

    async fn store_pair(&self, pair: &CredentialPair) -> ApiResult<()> {
        let mut values = self.cache.write().await;
        values.insert(ACCESS_TOKEN_KEY.to_string(), pair.access_token.clone());
        values.insert(REFRESH_TOKEN_KEY.to_string(), pair.refresh_token.clone());
        self.save(&values).await?;
        info!(path = %self.path.display(), "credential pair stored");
        Ok(())
    }

    async fn store_access_token(&self, token: &str) -> ApiResult<()> {
        let mut values = self.cache.write().await;
        values.insert(ACCESS_TOKEN_KEY.to_string(), token.to_string());
        self.save(&values).await?;
        debug!(path = %self.path.display(), "access token overwritten");
        Ok(())
    }

    async fn purge(&self) -> ApiResult<()> {
        let mut values = self.cache.write().await;
        values.remove(ACCESS_TOKEN_KEY);
        values.remove(REFRESH_TOKEN_KEY);
        self.save(&values).await?;
        info!(path = %self.path.display(), "credentials purged");
        Ok(())
    }
}
