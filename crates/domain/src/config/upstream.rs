use super::checker::parse_server_addr;
use super::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

/// Resolvers that actually answer client queries.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UpstreamConfig {
    #[serde(default = "default_upstream_servers")]
    pub servers: Vec<String>,

    #[serde(default = "default_upstream_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            servers: default_upstream_servers(),
            timeout_ms: default_upstream_timeout_ms(),
        }
    }
}

impl UpstreamConfig {
    pub fn socket_addrs(&self) -> Result<Vec<SocketAddr>, ConfigError> {
        self.servers.iter().map(|s| parse_server_addr(s)).collect()
    }
}

fn default_upstream_servers() -> Vec<String> {
    vec!["1.1.1.1:53".to_string(), "8.8.8.8:53".to_string()]
}

fn default_upstream_timeout_ms() -> u64 {
    3000
}
