pub mod classify;
pub mod hosts;

pub use classify::{ClassificationOutcome, ClassifyQueryUseCase};
pub use hosts::{BootstrapHostsUseCase, BootstrapReport, FlushBuffersUseCase, FlushReport};
