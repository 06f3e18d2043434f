// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::error::Error;
use std::path::{Path, PathBuf};

use crate::types::ListId;

/// The name of the application.
pub const APP_NAME: &str = "tasksync";

/// Configuration of one synchronized list.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct SyncConfig {
    /// Identity of the remote list. Empty or absent picks the server default.
    #[serde(default)]
    pub list_id: Option<String>,

    /// Number of items requested per page.
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Directory for storing the local cache.
    #[serde(default)]
    pub state_dir: Option<PathBuf>,
}

const fn default_page_size() -> u32 {
    100
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            list_id: None,
            page_size: default_page_size(),
            state_dir: None,
        }
    }
}

impl SyncConfig {
    /// The configured list identity, if any.
    #[must_use]
    pub fn list(&self) -> Option<ListId> {
        self.list_id.as_deref().and_then(ListId::from_configured)
    }

    /// Normalize the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the state directory cannot be resolved.
    pub fn normalize(&mut self) -> Result<(), Box<dyn Error>> {
        if self.page_size == 0 {
            return Err("page_size must be greater than zero".into());
        }

        match &self.state_dir {
            Some(a) => {
                self.state_dir = Some(
                    expand_path(a)
                        .map_err(|e| format!("Failed to expand state directory path: {e}"))?,
                );
            }

            None => match get_state_dir() {
                Ok(a) => self.state_dir = Some(a.join(APP_NAME)),
                Err(e) => tracing::warn!(err = %e, "failed to get state directory"),
            },
        }

        Ok(())
    }
}

/// Handle tilde (~) and environment variables in the path
///
/// # Errors
///
/// Returns an error if the home or config directory cannot be found.
pub fn expand_path(path: &Path) -> Result<PathBuf, Box<dyn Error>> {
    if path.is_absolute() {
        return Ok(path.to_owned());
    }

    let path = path.to_str().ok_or("Invalid path")?;

    // Handle tilde and home directory
    let home_prefixes: &[&str] = if cfg!(unix) {
        &["~/", "$HOME/", "${HOME}/"]
    } else {
        &[r"~\", "~/", r"%UserProfile%\", r"%UserProfile%/"]
    };
    for prefix in home_prefixes {
        if let Some(stripped) = path.strip_prefix(prefix) {
            return Ok(get_home_dir()?.join(stripped));
        }
    }

    // Handle config directories
    let config_prefixes: &[&str] = if cfg!(unix) {
        &["$XDG_CONFIG_HOME/", "${XDG_CONFIG_HOME}/"]
    } else {
        &[r"%LOCALAPPDATA%\", "%LOCALAPPDATA%/"]
    };
    for prefix in config_prefixes {
        if let Some(stripped) = path.strip_prefix(prefix) {
            return Ok(get_config_dir()?.join(stripped));
        }
    }

    Ok(path.into())
}

fn get_home_dir() -> Result<PathBuf, Box<dyn Error>> {
    dirs::home_dir().ok_or_else(|| "User-specific home directory not found".into())
}

/// The user-specific configuration directory.
///
/// # Errors
///
/// Returns an error if the directory cannot be determined.
pub fn get_config_dir() -> Result<PathBuf, Box<dyn Error>> {
    #[cfg(unix)]
    let config_dir = xdg::BaseDirectories::new().get_config_home();
    #[cfg(windows)]
    let config_dir = dirs::config_dir();
    config_dir.ok_or_else(|| "User-specific config directory not found".into())
}

fn get_state_dir() -> Result<PathBuf, Box<dyn Error>> {
    #[cfg(unix)]
    let state_dir = xdg::BaseDirectories::new().get_state_home();
    #[cfg(windows)]
    let state_dir = dirs::data_dir();
    state_dir.ok_or_else(|| "User-specific state directory not found".into())
}
