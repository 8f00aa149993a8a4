use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use super::{file_store::FileTokenStore, memory_store::MemoryTokenStore};
use crate::config::StoreConfig;
use crate::models::TokenKind;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("token store I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("token store at {path} is not valid JSON: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to serialize token store: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// The TokenStore trait abstracts durable token storage (set, get, remove).
///
/// It is pure storage: values are never inspected. Every consumer holding the
/// same store sees the same two entries.
pub trait TokenStore: Send + Sync {
    /// Returns the stored token, or `None` when absent or unreadable.
    fn get(&self, kind: TokenKind) -> Option<String>;
    fn set(&self, kind: TokenKind, value: &str) -> Result<(), StoreError>;
    fn remove(&self, kind: TokenKind) -> Result<(), StoreError>;

    /// Removes both tokens.
    fn clear(&self) -> Result<(), StoreError> {
        for kind in TokenKind::ALL {
            self.remove(kind)?;
        }
        Ok(())
    }

    /// A short backend name for logs.
    fn backend(&self) -> &str;
}

/// Creates a concrete store implementation based on the StoreConfig.
pub fn create_store(config: &StoreConfig) -> Arc<dyn TokenStore> {
    match config {
        StoreConfig::File(file_config) => {
            info!(
                path = %file_config.path.display(),
                "Using file-backed token store."
            );
            Arc::new(FileTokenStore::new(&file_config.path))
        }
        StoreConfig::Memory => {
            info!("Using in-memory token store; tokens will not survive a restart.");
            Arc::new(MemoryTokenStore::new())
        }
    }
}
