//! Settings file management

use serde::{Deserialize, Serialize};

use crate::logs::LogLevel;
use crate::server::launcher::ServerOptions;

/// Publish core settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,

    /// Deploy helper configuration
    #[serde(default)]
    pub helper: HelperSettings,

    /// Tool registry configuration
    #[serde(default)]
    pub registry: RegistrySettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Info,
            helper: HelperSettings::default(),
            registry: RegistrySettings::default(),
        }
    }
}

impl Settings {
    /// Server options derived from the helper settings
    pub fn server_options(&self) -> ServerOptions {
        ServerOptions {
            binary_path: self.helper.binary_path.clone().into(),
            host: self.helper.host.clone(),
            port: self.helper.port,
            startup_timeout: std::time::Duration::from_secs(self.helper.startup_timeout_secs),
            ..ServerOptions::default()
        }
    }
}

/// Deploy helper settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HelperSettings {
    /// Path to the helper binary
    #[serde(default = "default_binary_path")]
    pub binary_path: String,

    /// Host the helper binds to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port the helper listens on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Seconds to wait for the helper to become healthy
    #[serde(default = "default_startup_timeout_secs")]
    pub startup_timeout_secs: u64,
}

fn default_binary_path() -> String {
    "stevedore-helper".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    7732
}

fn default_startup_timeout_secs() -> u64 {
    30
}

impl Default for HelperSettings {
    fn default() -> Self {
        Self {
            binary_path: default_binary_path(),
            host: default_host(),
            port: default_port(),
            startup_timeout_secs: default_startup_timeout_secs(),
        }
    }
}

/// Tool registry settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrySettings {
    /// Base URL of the tool version registry
    #[serde(default = "default_registry_url")]
    pub base_url: String,
}

fn default_registry_url() -> String {
    "https://registry.stevedore.dev/v1".to_string()
}

impl Default for RegistrySettings {
    fn default() -> Self {
        Self {
            base_url: default_registry_url(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_defaults_from_empty_json() {
        let settings: Settings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings.log_level, LogLevel::Info);
        assert_eq!(settings.helper.host, "127.0.0.1");
        assert_eq!(settings.helper.port, 7732);
        assert_eq!(settings.registry.base_url, "https://registry.stevedore.dev/v1");
    }

    #[test]
    fn test_partial_helper_settings_keep_defaults() {
        let settings: Settings =
            serde_json::from_str(r#"{"helper": {"port": 9000}}"#).unwrap();
        assert_eq!(settings.helper.port, 9000);
        assert_eq!(settings.helper.host, "127.0.0.1");
    }
}
