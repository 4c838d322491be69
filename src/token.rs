//! Token providers for the authorization header
//!
//! The fetch controller only reads tokens. Writing happens through the
//! concrete stores, e.g. from the `token` CLI subcommand.

use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tracing::{debug, warn};

use crate::config::TokenConfig;
use crate::errors::FormFetchError;

/// Source of the token sent with every request.
///
/// `None` means "no authorization"; the header is still sent, empty.
pub trait TokenProvider: Send + Sync {
    fn token(&self) -> Option<String>;
}

/// A token fixed at construction time
#[derive(Debug, Clone, Default)]
pub struct StaticToken(pub Option<String>);

impl StaticToken {
    pub fn new(token: &str) -> Self {
        Self(Some(token.to_string()))
    }

    pub fn none() -> Self {
        Self(None)
    }
}

impl TokenProvider for StaticToken {
    fn token(&self) -> Option<String> {
        self.0.clone()
    }
}

/// In-memory key-value store; the token is read from one named key
#[derive(Debug)]
pub struct MemoryTokenStore {
    key: String,
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryTokenStore {
    pub fn new(key: &str) -> Self {
        Self {
            key: key.to_string(),
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn set(&self, key: &str, value: &str) {
        if let Ok(mut entries) = self.entries.write() {
            entries.insert(key.to_string(), value.to_string());
        }
    }

    pub fn remove(&self, key: &str) {
        if let Ok(mut entries) = self.entries.write() {
            entries.remove(key);
        }
    }

    pub fn set_token(&self, token: &str) {
        self.set(&self.key, token);
    }

    pub fn clear_token(&self) {
        self.remove(&self.key);
    }
}

impl TokenProvider for MemoryTokenStore {
    fn token(&self) -> Option<String> {
        self.entries
            .read()
            .ok()
            .and_then(|entries| entries.get(&self.key).cloned())
    }
}

/// Key-value store persisted as a JSON object on disk.
///
/// The file is re-read on every lookup so a token written by another
/// process is picked up by the next dispatch.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
    key: String,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>, key: &str) -> Self {
        Self {
            path: path.into(),
            key: key.to_string(),
        }
    }

    pub fn from_config(config: &TokenConfig) -> Self {
        Self::new(config.store_path.clone(), &config.key)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load every entry; a missing file is an empty store
    pub fn load(&self) -> Result<Map<String, Value>, FormFetchError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(source) => {
                return Err(FormFetchError::TokenStoreRead {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        if content.trim().is_empty() {
            return Ok(Map::new());
        }

        serde_json::from_str(&content).map_err(|source| FormFetchError::TokenStoreFormat {
            path: self.path.clone(),
            source,
        })
    }

    fn save(&self, entries: &Map<String, Value>) -> Result<(), FormFetchError> {
        let content = serde_json::to_string_pretty(entries).map_err(|source| {
            FormFetchError::TokenStoreFormat {
                path: self.path.clone(),
                source,
            }
        })?;

        std::fs::write(&self.path, content).map_err(|source| FormFetchError::TokenStoreWrite {
            path: self.path.clone(),
            source,
        })
    }

    pub fn set_token(&self, token: &str) -> Result<(), FormFetchError> {
        let mut entries = self.load()?;
        entries.insert(self.key.clone(), Value::String(token.to_string()));
        self.save(&entries)?;
        debug!("Stored token under '{}' in {}", self.key, self.path.display());
        Ok(())
    }

    pub fn clear_token(&self) -> Result<(), FormFetchError> {
        let mut entries = self.load()?;
        if entries.remove(&self.key).is_some() {
            self.save(&entries)?;
        }
        Ok(())
    }

    fn read_token(&self) -> Result<Option<String>, FormFetchError> {
        let entries = self.load()?;
        Ok(match entries.get(&self.key) {
            Some(Value::String(token)) => Some(token.clone()),
            Some(Value::Null) | None => None,
            Some(other) => Some(other.to_string()),
        })
    }
}

impl TokenProvider for FileTokenStore {
    fn token(&self) -> Option<String> {
        match self.read_token() {
            Ok(token) => token,
            Err(e) => {
                warn!("Ignoring unreadable token store: {}", e);
                None
            }
        }
    }
}

/// Value of the `authorization` header for an optional token.
///
/// An absent or empty token yields the empty string, never a missing header.
pub fn authorization_header(token: Option<&str>) -> String {
    match token {
        Some(token) if !token.is_empty() => format!("Token {}", token),
        _ => String::new(),
    }
}
