//! Resume store implementation
//!
//! Provides file-based persistence of continuation tokens with atomic writes.

use super::types::ResumeState;
use crate::error::{Error, Result};
use crate::pagination::ContinuationToken;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Store for persisting and loading continuation tokens
#[derive(Debug, Clone)]
pub struct ResumeStore {
    /// Path to the state file; empty in memory mode
    path: PathBuf,
    /// Current state (cached)
    state: Arc<RwLock<ResumeState>>,
    /// Whether to save on every update
    auto_save: bool,
}

impl ResumeStore {
    /// Create a store writing to `path`, starting empty
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            state: Arc::new(RwLock::new(ResumeState::new())),
            auto_save: true,
        }
    }

    /// Create a store that only writes on explicit `save`
    pub fn without_auto_save(path: impl AsRef<Path>) -> Self {
        Self {
            auto_save: false,
            ..Self::new(path)
        }
    }

    /// Create an in-memory store (no file persistence)
    pub fn in_memory() -> Self {
        Self {
            path: PathBuf::new(),
            state: Arc::new(RwLock::new(ResumeState::new())),
            auto_save: false,
        }
    }

    /// Open a store, loading existing state if the file is present
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let state = if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .map_err(|e| Error::state(format!("Failed to read state file: {e}")))?;
            parse_state(&contents)?
        } else {
            ResumeState::new()
        };

        Ok(Self {
            path,
            state: Arc::new(RwLock::new(state)),
            auto_save: true,
        })
    }

    /// Reload state from the file, if it exists
    pub async fn load(&self) -> Result<()> {
        if self.is_in_memory() || !self.path.exists() {
            return Ok(());
        }

        let contents = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| Error::state(format!("Failed to read state file: {e}")))?;
        let loaded = parse_state(&contents)?;

        *self.state.write().await = loaded;
        Ok(())
    }

    /// Write current state to the file
    ///
    /// Writes a sibling temp file first and renames it over the target.
    pub async fn save(&self) -> Result<()> {
        if self.is_in_memory() {
            return Ok(());
        }

        let contents = self.to_json_pretty().await?;
        let temp_path = self.path.with_extension("tmp");
        tokio::fs::write(&temp_path, &contents)
            .await
            .map_err(|e| Error::state(format!("Failed to write state file: {e}")))?;
        tokio::fs::rename(&temp_path, &self.path)
            .await
            .map_err(|e| Error::state(format!("Failed to rename state file: {e}")))?;

        debug!(path = %self.path.display(), "saved resume state");
        Ok(())
    }

    /// Token saved under `name`, or an empty token
    pub async fn get(&self, name: &str) -> ContinuationToken {
        self.state
            .read()
            .await
            .token(name)
            .cloned()
            .unwrap_or_default()
    }

    /// Save a token under `name`
    pub async fn set(&self, name: &str, token: ContinuationToken) -> Result<()> {
        self.state.write().await.set_token(name, token);

        if self.auto_save {
            self.save().await?;
        }
        Ok(())
    }

    /// Forget the token saved under `name`
    pub async fn remove(&self, name: &str) -> Result<()> {
        self.state.write().await.remove(name);

        if self.auto_save {
            self.save().await?;
        }
        Ok(())
    }

    /// Forget every saved token
    pub async fn clear(&self) -> Result<()> {
        *self.state.write().await = ResumeState::new();

        if self.auto_save {
            self.save().await?;
        }
        Ok(())
    }

    /// Snapshot of the current state
    pub async fn snapshot(&self) -> ResumeState {
        self.state.read().await.clone()
    }

    /// Export state as pretty-printed JSON
    pub async fn to_json_pretty(&self) -> Result<String> {
        let state = self.state.read().await;
        serde_json::to_string_pretty(&*state)
            .map_err(|e| Error::state(format!("Failed to serialize state: {e}")))
    }

    /// Get the state file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check if using in-memory mode
    pub fn is_in_memory(&self) -> bool {
        self.path.as_os_str().is_empty()
    }
}

fn parse_state(contents: &str) -> Result<ResumeState> {
    serde_json::from_str(contents)
        .map_err(|e| Error::state(format!("Failed to parse state file: {e}")))
}
