//! Banwatch Domain Layer
pub mod category;
pub mod classification;
pub mod config;
pub mod errors;

pub use category::Category;
pub use classification::{normalize_domain, ClassificationEntry, HostsLine};
pub use config::{CliOverrides, Config, ConfigError, ShutdownPolicy};
pub use errors::DomainError;
