pub mod category;
pub mod checker;
pub mod dispatch;
pub mod errors;
pub mod hosts;
pub mod logging;
pub mod root;
pub mod server;
pub mod upstream;

pub use category::CategoryConfig;
pub use checker::{parse_server_addr, CheckerConfig};
pub use dispatch::{DispatchConfig, ShutdownPolicy};
pub use errors::ConfigError;
pub use hosts::HostsConfig;
pub use logging::LoggingConfig;
pub use root::{CliOverrides, Config};
pub use server::ServerConfig;
pub use upstream::UpstreamConfig;
