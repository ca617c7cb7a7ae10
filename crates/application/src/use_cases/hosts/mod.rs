mod bootstrap_hosts;
mod flush_buffers;

pub use bootstrap_hosts::{BootstrapHostsUseCase, BootstrapReport};
pub use flush_buffers::{FlushBuffersUseCase, FlushReport};
