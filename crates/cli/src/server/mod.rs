pub mod dns;

pub use dns::{shutdown_signal, start_dns_server};
