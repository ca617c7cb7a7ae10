use super::errors::ConfigError;
use crate::Category;
use serde::{Deserialize, Serialize};
use std::net::IpAddr;

/// Settings for one classification category.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CategoryConfig {
    /// Substrings that mark a rendered checker response as belonging here.
    #[serde(default)]
    pub markers: Vec<String>,

    pub hosts_file: String,

    /// Every classified domain is written once per address in this list.
    #[serde(default)]
    pub destination_ips: Vec<String>,

    /// Pending entries (not domains) tolerated before a flush.
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,
}

impl CategoryConfig {
    pub fn defaults_for(category: Category) -> Self {
        let hosts_file = match category {
            Category::Ban => "/etc/hosts-ban",
            Category::Sanction => "/etc/hosts-sanction",
        };
        Self {
            markers: vec![],
            hosts_file: hosts_file.to_string(),
            destination_ips: vec![],
            buffer_size: default_buffer_size(),
        }
    }

    pub fn destination_addrs(&self, category: Category) -> Result<Vec<IpAddr>, ConfigError> {
        self.destination_ips
            .iter()
            .map(|ip| {
                ip.trim().parse::<IpAddr>().map_err(|_| {
                    ConfigError::Validation(format!(
                        "{}.destination_ips must be a list of valid IP addresses, got '{}'",
                        category, ip
                    ))
                })
            })
            .collect()
    }
}

pub(crate) fn default_ban() -> CategoryConfig {
    CategoryConfig::defaults_for(Category::Ban)
}

pub(crate) fn default_sanction() -> CategoryConfig {
    CategoryConfig::defaults_for(Category::Sanction)
}

fn default_buffer_size() -> usize {
    10
}
