use std::fs;
use std::path::PathBuf;

use thiserror::Error;

use super::TokenSet;
use crate::config::AppConfig;

const SESSION_FILE: &str = "session.json";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("session storage io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("session file is not valid JSON: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Persistent storage for the token set, one JSON session file per gateway.
///
/// This is the browser-persistent-storage analog: the file is the single
/// source of truth for token state, and in-memory caches are read-through
/// mirrors keyed by the current access-token value. Concurrent writers are
/// last-write-wins; there is no file locking.
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(storage_dir: PathBuf) -> Self {
        Self {
            path: storage_dir.join(SESSION_FILE),
        }
    }

    /// Resolve the storage directory from configuration, falling back to
    /// `$HOME/.config/talent-gateway`.
    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let dir = match &config.session.storage_dir {
            Some(dir) => PathBuf::from(dir),
            None => {
                let home = std::env::var("HOME")
                    .map_err(|_| anyhow::anyhow!("HOME environment variable not set"))?;
                PathBuf::from(home).join(".config").join("talent-gateway")
            }
        };
        Ok(Self::new(dir))
    }

    /// Read the persisted token set. A missing or unreadable session file
    /// yields the empty set; a broken file never fails a navigation.
    pub fn read(&self) -> TokenSet {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return TokenSet::default(),
            Err(e) => {
                tracing::warn!("Failed to read session file {}: {}", self.path.display(), e);
                return TokenSet::default();
            }
        };

        match serde_json::from_str(&content) {
            Ok(set) => set,
            Err(e) => {
                tracing::warn!("Discarding corrupt session file {}: {}", self.path.display(), e);
                TokenSet::default()
            }
        }
    }

    pub fn write(&self, tokens: &TokenSet) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(tokens)?;
        fs::write(&self.path, content)?;
        Ok(())
    }

    /// Remove the session file. An already-absent file is a successful clear.
    pub fn clear(&self) -> Result<(), StoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::Io(e)),
        }
    }
}
