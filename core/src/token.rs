//! Token Store and its persistence backends.
//!
//! # Design
//! The store keeps at most one `TokenPair` in memory and is read
//! synchronously on every request. Persistence (device storage, a file,
//! a browser cookie jar behind the FFI) is delegated to a `TokenPersistence`
//! implementation; its failures are logged and never fail the in-memory
//! operation.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::StorageError;

/// Storage key for the access token.
pub const KEY_ACCESS_TOKEN: &str = "KEY_ACCESS_TOKEN";
/// Storage key for the refresh token.
pub const KEY_REFRESH_TOKEN: &str = "KEY_REFRESH_TOKEN";

/// Credentials issued by a successful sign-in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

impl TokenPair {
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
        }
    }

    /// A pair without an access token cannot authenticate anything.
    pub fn is_empty(&self) -> bool {
        self.access_token.is_empty()
    }
}

/// Where the token pair survives process restarts.
pub trait TokenPersistence: Send + Sync {
    fn load(&self) -> Result<Option<TokenPair>, StorageError>;

    fn save(&self, pair: &TokenPair) -> Result<(), StorageError>;

    fn remove(&self) -> Result<(), StorageError>;

    fn name(&self) -> &str {
        "unknown"
    }
}

/// In-memory persistence, mostly for tests and hosts that persist on their own.
#[derive(Debug, Default)]
pub struct MemoryPersistence {
    slot: RwLock<Option<TokenPair>>,
}

impl MemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pair(pair: TokenPair) -> Self {
        Self {
            slot: RwLock::new(Some(pair)),
        }
    }
}

impl TokenPersistence for MemoryPersistence {
    fn load(&self) -> Result<Option<TokenPair>, StorageError> {
        Ok(self.slot.read().unwrap_or_else(PoisonError::into_inner).clone())
    }

    fn save(&self, pair: &TokenPair) -> Result<(), StorageError> {
        *self.slot.write().unwrap_or_else(PoisonError::into_inner) = Some(pair.clone());
        Ok(())
    }

    fn remove(&self) -> Result<(), StorageError> {
        *self.slot.write().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}

/// JSON file holding the two fixed storage keys, written with 0600 permissions.
#[derive(Debug, Clone)]
pub struct FilePersistence {
    path: PathBuf,
}

impl FilePersistence {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn io_error(&self, err: impl std::fmt::Display) -> StorageError {
        StorageError::Io {
            path: self.path.display().to_string(),
            message: err.to_string(),
        }
    }

    fn read_all(&self) -> Result<HashMap<String, String>, StorageError> {
        if !self.path.exists() {
            return Ok(HashMap::new());
        }
        let content = std::fs::read_to_string(&self.path).map_err(|e| self.io_error(e))?;
        if content.trim().is_empty() {
            return Ok(HashMap::new());
        }
        serde_json::from_str(&content).map_err(|e| StorageError::Serialization(e.to_string()))
    }

    fn write_all(&self, data: &HashMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        let content = serde_json::to_string_pretty(data)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        std::fs::write(&self.path, content).map_err(|e| self.io_error(e))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(&self.path, perms).map_err(|e| self.io_error(e))?;
        }

        debug!(path = %self.path.display(), "tokens written");
        Ok(())
    }
}

impl TokenPersistence for FilePersistence {
    fn load(&self) -> Result<Option<TokenPair>, StorageError> {
        let data = self.read_all()?;
        let access = data.get(KEY_ACCESS_TOKEN).cloned().unwrap_or_default();
        if access.is_empty() {
            return Ok(None);
        }
        let refresh = data.get(KEY_REFRESH_TOKEN).cloned().unwrap_or_default();
        Ok(Some(TokenPair::new(access, refresh)))
    }

    fn save(&self, pair: &TokenPair) -> Result<(), StorageError> {
        let mut data = self.read_all()?;
        data.insert(KEY_ACCESS_TOKEN.to_string(), pair.access_token.clone());
        data.insert(KEY_REFRESH_TOKEN.to_string(), pair.refresh_token.clone());
        self.write_all(&data)
    }

    fn remove(&self) -> Result<(), StorageError> {
        let mut data = self.read_all()?;
        data.remove(KEY_ACCESS_TOKEN);
        data.remove(KEY_REFRESH_TOKEN);
        self.write_all(&data)
    }

    fn name(&self) -> &str {
        "file"
    }
}

/// Holds the current token pair for one client instance.
pub struct TokenStore {
    current: RwLock<Option<TokenPair>>,
    persistence: Arc<dyn TokenPersistence>,
}

impl TokenStore {
    pub fn new(persistence: Arc<dyn TokenPersistence>) -> Self {
        Self {
            current: RwLock::new(None),
            persistence,
        }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryPersistence::new()))
    }

    /// Read the persisted pair into memory. Called once at startup.
    pub fn restore(&self) -> Option<TokenPair> {
        let loaded = match self.persistence.load() {
            Ok(pair) => pair.filter(|p| !p.is_empty()),
            Err(e) => {
                warn!(backend = self.persistence.name(), error = %e, "failed to load tokens");
                None
            }
        };
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = loaded.clone();
        loaded
    }

    pub fn get(&self) -> Option<TokenPair> {
        self.current.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn access_token(&self) -> Option<String> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|pair| pair.access_token.clone())
    }

    pub fn set(&self, pair: TokenPair) {
        if let Err(e) = self.persistence.save(&pair) {
            warn!(backend = self.persistence.name(), error = %e, "failed to persist tokens");
        }
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Some(pair);
    }

    /// Drop the pair. Returns whether one was held.
    pub fn clear(&self) -> bool {
        let previous = self.current.write().unwrap_or_else(PoisonError::into_inner).take();
        if let Err(e) = self.persistence.remove() {
            warn!(backend = self.persistence.name(), error = %e, "failed to remove persisted tokens");
        }
        previous.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.current.read().unwrap_or_else(PoisonError::into_inner).is_none()
    }
}

impl std::fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenStore")
            .field("authenticated", &!self.is_empty())
            .field("persistence", &self.persistence.name())
            .finish()
    }
}
