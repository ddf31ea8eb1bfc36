//! API key storage.
//!
//! The key lives in `~/.jules-handoff/credentials.json`, a JSON map of
//! secret name to value. `JULES_API_KEY` takes precedence over the file
//! and is never written back.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::{debug, info, warn};

use crate::error::{HandoffError, HandoffResult};

pub const API_KEY_SECRET: &str = "jules.apiKey";
pub const API_KEY_ENV: &str = "JULES_API_KEY";
pub const CREDENTIALS_FILE: &str = "credentials.json";

static API_KEY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._-]{10,256}$").expect("api key regex should compile")
});

/// Named secret storage.
pub trait SecretStore: Send + Sync {
    fn get(&self, name: &str) -> impl Future<Output = HandoffResult<Option<String>>> + Send;
    fn set(&self, name: &str, value: &str) -> impl Future<Output = HandoffResult<()>> + Send;
    fn delete(&self, name: &str) -> impl Future<Output = HandoffResult<()>> + Send;
}

/// An API key that never prints itself.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Check the key's shape before it is stored or sent.
    pub fn parse(raw: &str) -> HandoffResult<Self> {
        let key = raw.trim();
        if key.is_empty() {
            return Err(HandoffError::validation("API key", "key is empty"));
        }
        if !API_KEY_RE.is_match(key) {
            return Err(HandoffError::validation(
                "API key",
                "expected 10-256 characters of letters, digits, '.', '_' or '-'",
            ));
        }
        Ok(Self(key.to_string()))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ApiKey([REDACTED])")
    }
}

/// Where the active key came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySource {
    Environment,
    File,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
struct CredentialFile {
    secrets: BTreeMap<String, String>,
}

/// File-backed [`SecretStore`] with an environment override.
pub struct FileSecretStore {
    path: PathBuf,
    env_override: Option<String>,
}

impl FileSecretStore {
    pub fn new(cache_dir: &Path) -> Self {
        Self {
            path: cache_dir.join(CREDENTIALS_FILE),
            env_override: std::env::var(API_KEY_ENV).ok().filter(|v| !v.trim().is_empty()),
        }
    }

    /// Store that ignores the process environment.
    #[cfg(test)]
    pub fn without_env(cache_dir: &Path) -> Self {
        Self {
            path: cache_dir.join(CREDENTIALS_FILE),
            env_override: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn has_env_override(&self) -> bool {
        self.env_override.is_some()
    }

    /// Where the API key would be read from, if one is configured.
    pub async fn key_source(&self) -> HandoffResult<Option<KeySource>> {
        if self.env_override.is_some() {
            return Ok(Some(KeySource::Environment));
        }
        let file = self.read_file().await?;
        Ok(file
            .secrets
            .contains_key(API_KEY_SECRET)
            .then_some(KeySource::File))
    }

    async fn read_file(&self) -> HandoffResult<CredentialFile> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(file) => Ok(file),
                Err(e) => {
                    warn!("Ignoring malformed credentials file {:?}: {}", self.path, e);
                    Ok(CredentialFile::default())
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(CredentialFile::default()),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_file(&self, file: &CredentialFile) -> HandoffResult<()> {
        let content = serde_json::to_string_pretty(file)
            .map_err(|e| HandoffError::Io(std::io::Error::other(e)))?;
        tokio::fs::write(&self.path, content).await?;
        restrict_permissions(&self.path).await?;
        debug!("Credentials saved to {:?}", self.path);
        Ok(())
    }
}

#[cfg(unix)]
async fn restrict_permissions(path: &Path) -> HandoffResult<()> {
    use std::os::unix::fs::PermissionsExt;
    tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600)).await?;
    Ok(())
}

#[cfg(not(unix))]
async fn restrict_permissions(_path: &Path) -> HandoffResult<()> {
    Ok(())
}

impl SecretStore for FileSecretStore {
    async fn get(&self, name: &str) -> HandoffResult<Option<String>> {
        if name == API_KEY_SECRET {
            if let Some(key) = &self.env_override {
                debug!("Using API key from {}", API_KEY_ENV);
                return Ok(Some(key.clone()));
            }
        }
        Ok(self.read_file().await?.secrets.get(name).cloned())
    }

    async fn set(&self, name: &str, value: &str) -> HandoffResult<()> {
        let mut file = self.read_file().await?;
        file.secrets.insert(name.to_string(), value.to_string());
        self.write_file(&file).await?;
        info!("Stored secret {}", name);
        Ok(())
    }

    async fn delete(&self, name: &str) -> HandoffResult<()> {
        let mut file = self.read_file().await?;
        if file.secrets.remove(name).is_none() {
            return Ok(());
        }
        if file.secrets.is_empty() {
            tokio::fs::remove_file(&self.path).await?;
        } else {
            self.write_file(&file).await?;
        }
        info!("Removed secret {}", name);
        Ok(())
    }
}

/// Fetch and validate the API key; `None` when no key is configured.
pub async fn load_api_key<S: SecretStore>(store: &S) -> HandoffResult<Option<ApiKey>> {
    match store.get(API_KEY_SECRET).await? {
        Some(raw) => ApiKey::parse(&raw).map(Some),
        None => Ok(None),
    }
}

/// Like [`load_api_key`] but a missing key is a configuration error.
pub async fn require_api_key<S: SecretStore>(store: &S) -> HandoffResult<ApiKey> {
    load_api_key(store)
        .await?
        .ok_or_else(HandoffError::missing_credential)
}
