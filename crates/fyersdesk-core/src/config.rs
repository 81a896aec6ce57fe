//! Application configuration management.
//!
//! This module loads the application configuration: the app ID, redirect
//! URI, endpoint overrides, and logging options. The secret key and access
//! token are never part of it.
//!
//! Configuration is read from `~/.config/fyersdesk/config.json` and is never
//! written back; edit the file by hand.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::api::Endpoints;

/// Application name used for config directory paths
const APP_NAME: &str = "fyersdesk";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Redirect URI registered by default for new API apps
pub const DEFAULT_REDIRECT_URI: &str = "https://127.0.0.1/";

/// Environment overrides, applied after `.env` is loaded
pub const ENV_APP_ID: &str = "FYERS_APP_ID";
pub const ENV_SECRET_KEY: &str = "FYERS_SECRET_KEY";
pub const ENV_REDIRECT_URI: &str = "FYERS_REDIRECT_URI";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub app_id: Option<String>,
    pub redirect_uri: String,
    pub api_base_url: Option<String>,
    pub data_base_url: Option<String>,
    /// Default tracing filter when `RUST_LOG` is unset
    pub log_level: String,
    /// Write logs to daily files here instead of stderr
    pub log_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_id: None,
            redirect_uri: DEFAULT_REDIRECT_URI.to_string(),
            api_base_url: None,
            data_base_url: None,
            log_level: "warn".to_string(),
            log_dir: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config file {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    /// Apply `FYERS_APP_ID` / `FYERS_REDIRECT_URI` from the environment
    pub fn apply_env(&mut self) {
        self.apply_overrides(
            std::env::var(ENV_APP_ID).ok(),
            std::env::var(ENV_REDIRECT_URI).ok(),
        );
    }

    fn apply_overrides(&mut self, app_id: Option<String>, redirect_uri: Option<String>) {
        if let Some(app_id) = app_id.filter(|v| !v.trim().is_empty()) {
            self.app_id = Some(app_id.trim().to_string());
        }
        if let Some(uri) = redirect_uri.filter(|v| !v.trim().is_empty()) {
            self.redirect_uri = uri.trim().to_string();
        }
    }

    /// Endpoints with any configured base URL overrides applied
    pub fn endpoints(&self) -> Endpoints {
        let defaults = Endpoints::default();
        Endpoints {
            api_base: self.api_base_url.clone().unwrap_or(defaults.api_base),
            data_base: self.data_base_url.clone().unwrap_or(defaults.data_base),
        }
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }
}
