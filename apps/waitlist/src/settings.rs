use std::{collections::HashMap, path::Path};

use anyhow::Context;
use config::{Config, Environment, File};
use document_store::{config::DEFAULT_ENDPOINT, BackendConfig};
use serde::Deserialize;

pub const DEFAULT_CONFIG_FILE: &str = "waitlist.toml";
const ENV_PREFIX: &str = "APP";
const ENV_SEPARATOR: &str = "__";

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub endpoint: String,
    #[serde(default)]
    pub project_id: String,
    #[serde(default)]
    pub database_id: String,
    #[serde(default)]
    pub collection_id: String,
    #[serde(default)]
    pub api_key: Option<String>,
}

impl Settings {
    pub fn into_backend_config(self) -> anyhow::Result<BackendConfig> {
        let config = BackendConfig::new(
            &self.endpoint,
            self.project_id.trim(),
            self.database_id.trim(),
            self.collection_id.trim(),
        )
        .context("invalid document store settings")?;

        Ok(match self.api_key {
            Some(key) => config.with_api_key(key),
            None => config,
        })
    }
}

/// Defaults, then the optional settings file, then `APP__*` environment variables.
pub fn load_settings(path: Option<&Path>) -> anyhow::Result<Settings> {
    load_settings_with_env(path, None)
}

fn load_settings_with_env(
    path: Option<&Path>,
    env: Option<HashMap<String, String>>,
) -> anyhow::Result<Settings> {
    let file = match path {
        Some(path) => File::from(path).required(true),
        None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
    };

    let settings = Config::builder()
        .set_default("endpoint", DEFAULT_ENDPOINT)?
        .add_source(file)
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator(ENV_SEPARATOR)
                .separator(ENV_SEPARATOR)
                .source(env),
        )
        .build()
        .context("failed to load waitlist settings")?;

    settings
        .try_deserialize::<Settings>()
        .context("failed to parse waitlist settings")
}

#[cfg(test)]
#[path = "tests/settings_tests.rs"]
mod tests;
