use super::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr, ToSocketAddrs};

const DEFAULT_DNS_PORT: u16 = 53;

/// Resolvers that are re-queried to observe how a domain is being filtered.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CheckerConfig {
    /// Ordered list; earlier servers take priority.
    #[serde(default)]
    pub servers: Vec<String>,

    #[serde(default = "default_checker_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            servers: vec![],
            timeout_ms: default_checker_timeout_ms(),
        }
    }
}

impl CheckerConfig {
    pub fn socket_addrs(&self) -> Result<Vec<SocketAddr>, ConfigError> {
        self.servers.iter().map(|s| parse_server_addr(s)).collect()
    }
}

/// Parses `ip:port`, `[v6]:port` or a bare IP (port 53). Anything else is
/// treated as a host name, with or without a port, and resolved once here;
/// the first resolved address is used.
pub fn parse_server_addr(value: &str) -> Result<SocketAddr, ConfigError> {
    let value = value.trim();
    if let Ok(addr) = value.parse::<SocketAddr>() {
        return Ok(addr);
    }
    if let Ok(ip) = value.parse::<IpAddr>() {
        return Ok(SocketAddr::new(ip, DEFAULT_DNS_PORT));
    }

    let resolved = if value.contains(':') {
        value.to_socket_addrs()
    } else {
        (value, DEFAULT_DNS_PORT).to_socket_addrs()
    };

    resolved
        .map_err(|e| e.to_string())
        .and_then(|mut addrs| {
            addrs
                .next()
                .ok_or_else(|| "no addresses found".to_string())
        })
        .map_err(|reason| {
            ConfigError::Validation(format!(
                "'{}' is not a valid DNS server address: {}",
                value, reason
            ))
        })
}

fn default_checker_timeout_ms() -> u64 {
    2000
}
