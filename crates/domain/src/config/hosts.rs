use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HostsConfig {
    /// Merged file consumed by downstream resolvers.
    #[serde(default = "default_result_file")]
    pub result_file: String,
}

impl Default for HostsConfig {
    fn default() -> Self {
        Self {
            result_file: default_result_file(),
        }
    }
}

fn default_result_file() -> String {
    "/etc/hosts-banwatch".to_string()
}
