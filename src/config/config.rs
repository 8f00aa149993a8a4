use std::path::Path;

use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use schemars::{schema_for, JsonSchema};
use serde::{Deserialize, Serialize};

use super::api::ApiConfig;
use super::logging::LoggingConfig;
use super::storage::StoreConfig;

pub const CURRENT_VERSION: &str = "1.0.0";
pub const ENV_PREFIX: &str = "SHIKSHA_";

/// A top-level enum for versioned configurations.
#[derive(Deserialize, Serialize, JsonSchema)]
#[serde(tag = "version")]
pub enum Config {
    #[serde(rename = "1.0.0")]
    ConfigV1(ConfigV1),
}

/// Main config for v1.0.0: where the API lives, where tokens are kept, how we log.
#[derive(Deserialize, Serialize, Debug, Clone, Default, JsonSchema)]
pub struct ConfigV1 {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub storage: StoreConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Builds the figment used by [`load_config`]: version default, then the
/// YAML file (optional), then `SHIKSHA_*` environment overrides.
///
/// Nested keys use a double underscore, e.g. `SHIKSHA_API__BASE_URL`.
pub fn figment(path: &Path) -> Figment {
    Figment::new()
        .merge(Serialized::default("version", CURRENT_VERSION))
        .merge(Yaml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
}

/// Load config from the given YAML file. A missing file yields the defaults.
pub fn load_config(path: &Path) -> Result<ConfigV1, figment::Error> {
    from_figment(figment(path))
}

pub fn from_figment(figment: Figment) -> Result<ConfigV1, figment::Error> {
    match figment.extract::<Config>()? {
        Config::ConfigV1(c) => Ok(c),
    }
}

/// Render the JSON schema for the configuration.
pub fn schema_json() -> String {
    let schema = schema_for!(Config);
    serde_json::to_string_pretty(&schema).unwrap_or_default()
}
