use serde::{Deserialize, Serialize};
use std::path::Path;

use super::category::{default_ban, default_sanction, CategoryConfig};
use super::dispatch::DispatchConfig;
use super::errors::ConfigError;
use super::hosts::HostsConfig;
use super::logging::LoggingConfig;
use super::server::ServerConfig;
use super::upstream::UpstreamConfig;
use super::CheckerConfig;
use crate::Category;

const LOCAL_CONFIG_PATH: &str = "banwatch.toml";
const SYSTEM_CONFIG_PATH: &str = "/etc/banwatch/config.toml";

/// Main configuration structure for Banwatch
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Listener configuration (port, bind address)
    #[serde(default)]
    pub server: ServerConfig,

    /// Resolvers answering client queries
    #[serde(default)]
    pub upstream: UpstreamConfig,

    /// Resolvers re-queried for classification
    #[serde(default)]
    pub checker: CheckerConfig,

    #[serde(default = "default_ban")]
    pub ban: CategoryConfig,

    #[serde(default = "default_sanction")]
    pub sanction: CategoryConfig,

    #[serde(default)]
    pub hosts: HostsConfig,

    /// Classification worker pool
    #[serde(default)]
    pub dispatch: DispatchConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            upstream: UpstreamConfig::default(),
            checker: CheckerConfig::default(),
            ban: default_ban(),
            sanction: default_sanction(),
            hosts: HostsConfig::default(),
            dispatch: DispatchConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file or use defaults
    ///
    /// Priority order:
    /// 1. Explicitly provided path
    /// 2. banwatch.toml in current directory
    /// 3. /etc/banwatch/config.toml
    /// 4. Default configuration
    pub fn load(path: Option<&str>, cli_overrides: CliOverrides) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = path {
            Self::from_file(path)?
        } else if let Some(found) = Self::get_config_path() {
            Self::from_file(&found)?
        } else {
            Self::default()
        };

        config.apply_cli_overrides(cli_overrides);
        Ok(config)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileRead(path.to_string(), e.to_string()))?;
        Self::from_toml(&contents)
    }

    fn apply_cli_overrides(&mut self, overrides: CliOverrides) {
        if let Some(port) = overrides.dns_port {
            self.server.dns_port = port;
        }
        if let Some(bind) = overrides.bind_address {
            self.server.bind_address = bind;
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
    }

    pub fn category(&self, category: Category) -> &CategoryConfig {
        match category {
            Category::Ban => &self.ban,
            Category::Sanction => &self.sanction,
        }
    }

    /// Validate configuration; any error here prevents startup.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.dns_port == 0 {
            return Err(ConfigError::Validation("DNS port cannot be 0".to_string()));
        }

        if self.checker.servers.is_empty() {
            return Err(ConfigError::Validation(
                "checker.servers requires at least one resolver".to_string(),
            ));
        }
        self.checker.socket_addrs()?;
        if self.checker.timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "checker.timeout_ms must be positive".to_string(),
            ));
        }

        if self.upstream.servers.is_empty() {
            return Err(ConfigError::Validation(
                "upstream.servers requires at least one resolver".to_string(),
            ));
        }
        self.upstream.socket_addrs()?;
        if self.upstream.timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "upstream.timeout_ms must be positive".to_string(),
            ));
        }

        for category in Category::ALL {
            let section = self.category(category);
            if section.destination_ips.is_empty() {
                return Err(ConfigError::Validation(format!(
                    "{}.destination_ips requires at least one address",
                    category
                )));
            }
            section.destination_addrs(category)?;
            if section.buffer_size == 0 {
                return Err(ConfigError::Validation(format!(
                    "{}.buffer_size must be a positive integer",
                    category
                )));
            }
            require_absolute(&format!("{}.hosts_file", category), &section.hosts_file)?;
        }
        require_absolute("hosts.result_file", &self.hosts.result_file)?;

        let paths = [
            ("ban.hosts_file", &self.ban.hosts_file),
            ("sanction.hosts_file", &self.sanction.hosts_file),
            ("hosts.result_file", &self.hosts.result_file),
        ];
        for (i, (name_a, a)) in paths.iter().enumerate() {
            for (name_b, b) in &paths[i + 1..] {
                if Path::new(a) == Path::new(b) {
                    return Err(ConfigError::Validation(format!(
                        "{} should not be the same as {}",
                        name_a, name_b
                    )));
                }
            }
        }

        if self.dispatch.max_in_flight == 0 || self.dispatch.queue_capacity == 0 {
            return Err(ConfigError::Validation(
                "dispatch.max_in_flight and dispatch.queue_capacity must be positive".to_string(),
            ));
        }

        Ok(())
    }

    /// Non-fatal findings worth logging at startup.
    pub fn warnings(&self) -> Vec<String> {
        Category::ALL
            .into_iter()
            .filter(|c| self.category(*c).markers.is_empty())
            .map(|c| format!("{}.markers is empty; nothing will be classified as {}", c, c))
            .collect()
    }

    /// Save configuration to file
    pub fn save(&self, path: &str) -> Result<(), ConfigError> {
        let toml_string = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::Parse(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, toml_string)
            .map_err(|e| ConfigError::FileWrite(path.to_string(), e.to_string()))?;
        Ok(())
    }

    /// Get the path to the configuration file being used
    pub fn get_config_path() -> Option<String> {
        [LOCAL_CONFIG_PATH, SYSTEM_CONFIG_PATH]
            .into_iter()
            .find(|p| Path::new(p).exists())
            .map(str::to_string)
    }
}

fn require_absolute(field: &str, value: &str) -> Result<(), ConfigError> {
    if value.len() < 2 || !Path::new(value).is_absolute() {
        return Err(ConfigError::Validation(format!(
            "{} only accepts an absolute path, got '{}'",
            field, value
        )));
    }
    Ok(())
}

/// Command-line overrides for configuration
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub dns_port: Option<u16>,
    pub bind_address: Option<String>,
    pub log_level: Option<String>,
}
