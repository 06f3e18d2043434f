// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::{error::Error, path::PathBuf, str::FromStr};

use tokio::fs;

use tasksync_core::{APP_NAME, SyncConfig, get_config_dir};
use tasksync_gtasks::GTasksConfig;

const TASKSYNC_CONFIG_ENV: &str = "TASKSYNC_CONFIG";

/// Loads the configuration from `path`, `$TASKSYNC_CONFIG`, or the user's
/// config directory, in that order.
#[tracing::instrument]
pub async fn parse_config(path: Option<PathBuf>) -> Result<Config, Box<dyn Error>> {
    let path = if let Some(path) = path {
        path
    } else if let Ok(env_path) = std::env::var(TASKSYNC_CONFIG_ENV) {
        PathBuf::from(env_path)
    } else {
        let config = get_config_dir()?.join(format!("{APP_NAME}/config.toml"));
        if !config.exists() {
            return Err(format!("No config found at: {}", config.display()).into());
        }
        config
    };

    fs::read_to_string(&path)
        .await
        .map_err(|e| format!("Failed to read config file at {}: {}", path.display(), e))?
        .parse()
}

/// Configuration of the tasksync application.
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct Config {
    /// Which list to keep in sync, and where the cache lives.
    #[serde(default)]
    pub sync: SyncConfig,

    /// Google Tasks server and credentials.
    #[serde(default)]
    pub gtasks: GTasksConfig,
}

impl FromStr for Config {
    type Err = Box<dyn Error>;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut config: Self = toml::from_str(s)?;
        config.sync.normalize()?;
        Ok(config)
    }
}
