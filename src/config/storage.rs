use std::path::PathBuf;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub const DEFAULT_SESSION_FILE: &str = ".shiksha/session.json";

/// The token store backends. We differentiate them via a "type" tag in the YAML.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
#[serde(tag = "type")]
pub enum StoreConfig {
    /// Tokens persisted in a JSON document; survives restarts.
    #[serde(rename = "file")]
    File(FileStoreConfig),
    /// Tokens kept in process memory only.
    #[serde(rename = "memory")]
    Memory,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig::File(FileStoreConfig::default())
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct FileStoreConfig {
    #[serde(default = "default_session_file")]
    pub path: PathBuf,
}

fn default_session_file() -> PathBuf {
    PathBuf::from(DEFAULT_SESSION_FILE)
}

impl Default for FileStoreConfig {
    fn default() -> Self {
        FileStoreConfig {
            path: default_session_file(),
        }
    }
}
