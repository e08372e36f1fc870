//! Configuration handling for the TUI

use crate::dnd::LayoutMode;
use crate::state::ProjectId;
use anyhow::Result;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Default server address
const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:5000";

/// Default per-request timeout
const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Environment variable overriding the server address
const SERVER_URL_ENV: &str = "KEYSHELF_SERVER_URL";

/// User configuration for the TUI
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ClientConfig {
    /// Server address
    pub server_url: Option<String>,
    /// Per-request timeout in seconds
    pub request_timeout_secs: Option<u64>,
    /// Key panel layout
    pub key_layout: Option<LayoutMode>,
    /// Project selected when the TUI last exited
    pub selected_project: Option<ProjectId>,
}

impl ClientConfig {
    /// Get the config file path
    fn config_path() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.config_dir().join("config.json"))
    }

    fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("io", "keyshelf", "keyshelf-tui")
    }

    /// Directory for the log file
    pub fn log_dir() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.data_local_dir().to_path_buf())
    }

    /// Load configuration from file
    pub fn load() -> Result<Self> {
        if let Some(path) = Self::config_path() {
            if path.exists() {
                let content = fs::read_to_string(&path)?;
                let config: ClientConfig = serde_json::from_str(&content)?;
                return Ok(config);
            }
        }

        Ok(Self::default())
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        if let Some(path) = Self::config_path() {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            let content = serde_json::to_string_pretty(self)?;
            fs::write(&path, content)?;
        }
        Ok(())
    }

    /// Server address: environment, then file, then default
    pub fn server_url(&self) -> String {
        std::env::var(SERVER_URL_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .or_else(|| self.server_url.clone())
            .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string())
    }

    /// Request timeout, never zero
    pub fn request_timeout_secs(&self) -> u64 {
        self.request_timeout_secs
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_TIMEOUT_SECS)
    }

    pub fn key_layout(&self) -> LayoutMode {
        self.key_layout.unwrap_or_default()
    }
}
