use serde::{Deserialize, Serialize};

/// What happens to queued and in-flight classifications at shutdown.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ShutdownPolicy {
    /// Finish every accepted query, then flush both buffers.
    #[default]
    Drain,
    /// Drop queued queries, abort in-flight ones, leave buffers as they are.
    Abandon,
}

impl ShutdownPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Drain => "drain",
            Self::Abandon => "abandon",
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DispatchConfig {
    #[serde(default = "default_max_in_flight")]
    pub max_in_flight: usize,

    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    #[serde(default)]
    pub shutdown_policy: ShutdownPolicy,

    /// Periodic flush of non-empty buffers; 0 disables it.
    #[serde(default)]
    pub flush_interval_secs: u64,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            max_in_flight: default_max_in_flight(),
            queue_capacity: default_queue_capacity(),
            shutdown_policy: ShutdownPolicy::default(),
            flush_interval_secs: 0,
        }
    }
}

fn default_max_in_flight() -> usize {
    256
}

fn default_queue_capacity() -> usize {
    1024
}
