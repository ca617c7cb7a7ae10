use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum DomainError {
    #[error("Invalid DNS response: {0}")]
    InvalidDnsResponse(String),

    #[error("Transport timeout talking to {server}")]
    TransportTimeout { server: String },

    #[error("Transport error talking to {server}: {reason}")]
    TransportIo { server: String, reason: String },

    #[error("All upstream servers are unreachable")]
    TransportAllServersUnreachable,

    #[error("Hosts file I/O error on {path}: {reason}")]
    HostsFileIo { path: String, reason: String },

    #[error("Failed to merge hosts files into {destination}: {reason}")]
    MergeFailed { destination: String, reason: String },

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl DomainError {
    pub fn hosts_io(path: impl AsRef<std::path::Path>, err: impl std::fmt::Display) -> Self {
        Self::HostsFileIo {
            path: path.as_ref().display().to_string(),
            reason: err.to_string(),
        }
    }

    /// True for failures that only affect one checker exchange.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::TransportTimeout { .. }
                | Self::TransportIo { .. }
                | Self::InvalidDnsResponse(_)
                | Self::TransportAllServersUnreachable
        )
    }
}
