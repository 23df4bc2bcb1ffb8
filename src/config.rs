//! Configuration Management
//!
//! Handles persistent configuration storage for tshop.

use crate::notification::{DetailLevel, NotificationManager};
use crate::resource::{ManagerSettings, PageResetPolicy};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable overriding the configured API URL
pub const API_URL_ENV: &str = "TSHOP_API_URL";
/// API URL used when nothing else is configured
pub const DEFAULT_API_URL: &str = "http://localhost:8080";

fn default_page_size() -> usize {
    10
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_toast_secs() -> u64 {
    5
}

fn default_max_history() -> usize {
    50
}

/// Notification preferences
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NotificationSettings {
    #[serde(default = "default_toast_secs")]
    pub toast_duration_secs: u64,
    #[serde(default = "default_max_history")]
    pub max_history: usize,
    #[serde(default)]
    pub detail_level: DetailLevel,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            toast_duration_secs: default_toast_secs(),
            max_history: default_max_history(),
            detail_level: DetailLevel::default(),
        }
    }
}

/// User configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Base URL of the admin API
    #[serde(default)]
    pub api_url: Option<String>,
    /// Rows per page in list views
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    /// Page behavior when a filter changes
    #[serde(default)]
    pub page_reset: PageResetPolicy,
    /// Last viewed resource
    #[serde(default)]
    pub last_resource: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default)]
    pub notifications: NotificationSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: None,
            page_size: default_page_size(),
            page_reset: PageResetPolicy::default(),
            last_resource: None,
            request_timeout_secs: default_timeout_secs(),
            notifications: NotificationSettings::default(),
        }
    }
}

impl Config {
    /// Directory holding config, credentials and the log file
    pub fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("tshop"))
    }

    /// Get the config file path
    fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join("config.json"))
    }

    /// Load configuration from disk (defaults when missing or corrupt)
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };

        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(&path) {
            Ok(content) => Self::parse(&content),
            Err(e) => {
                tracing::warn!("Failed to read {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Parse config JSON, falling back to defaults
    pub fn parse(content: &str) -> Self {
        serde_json::from_str(content).unwrap_or_else(|e| {
            tracing::warn!("Ignoring invalid config: {}", e);
            Self::default()
        })
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        let Some(path) = Self::config_path() else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, content)
            .with_context(|| format!("Failed to write {}", path.display()))?;

        Ok(())
    }

    /// Get effective API URL (CLI > env > config > default)
    pub fn effective_api_url(&self, cli: Option<&str>) -> String {
        let env = std::env::var(API_URL_ENV).ok();
        Self::resolve_api_url(cli, env.as_deref(), self.api_url.as_deref())
    }

    fn resolve_api_url(cli: Option<&str>, env: Option<&str>, config: Option<&str>) -> String {
        [cli, env, config]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|s| !s.is_empty())
            .unwrap_or(DEFAULT_API_URL)
            .to_string()
    }

    /// Settings shared by every resource manager
    pub fn manager_settings(&self) -> ManagerSettings {
        ManagerSettings {
            page_size: self.page_size.max(1),
            page_reset: self.page_reset,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    /// Notification manager configured from these settings
    pub fn notification_manager(&self) -> NotificationManager {
        let mut manager = NotificationManager::new();
        manager.toast_duration = Duration::from_secs(self.notifications.toast_duration_secs);
        manager.max_history = self.notifications.max_history.max(1);
        manager.detail_level = self.notifications.detail_level;
        manager
    }

    /// Remember the last viewed resource and save
    pub fn set_last_resource(&mut self, key: &str) -> Result<()> {
        if self.last_resource.as_deref() == Some(key) {
            return Ok(());
        }
        self.last_resource = Some(key.to_string());
        self.save()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_url_precedence() {
        assert_eq!(
            Config::resolve_api_url(Some("http://cli"), Some("http://env"), Some("http://cfg")),
            "http://cli"
        );
        assert_eq!(
            Config::resolve_api_url(None, Some("http://env"), Some("http://cfg")),
            "http://env"
        );
        assert_eq!(Config::resolve_api_url(None, Some(" "), Some("http://cfg")), "http://cfg");
        assert_eq!(Config::resolve_api_url(None, None, None), DEFAULT_API_URL);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config = Config::parse(r#"{"page_reset": "preserve", "notifications": {"max_history": 5}}"#);
        assert_eq!(config.page_size, 10);
        assert_eq!(config.page_reset, PageResetPolicy::Preserve);
        assert_eq!(config.notifications.max_history, 5);
        assert_eq!(config.notifications.toast_duration_secs, 5);
    }

    #[test]
    fn test_corrupt_config_falls_back() {
        assert_eq!(Config::parse("{not json"), Config::default());
    }

    #[test]
    fn test_manager_settings_floor_page_size() {
        let config = Config {
            page_size: 0,
            ..Default::default()
        };
        assert_eq!(config.manager_settings().page_size, 1);
    }
}
