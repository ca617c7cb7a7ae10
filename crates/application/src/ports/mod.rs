mod checker_exchange;
mod classification_queue;
mod hosts_file_store;

pub use checker_exchange::CheckerExchange;
pub use classification_queue::ClassificationQueue;
pub use hosts_file_store::HostsFileStore;
