pub mod buffer_flush;
pub mod classification_workers;
pub mod runner;

pub use buffer_flush::BufferFlushJob;
pub use classification_workers::{
    ClassificationSender, ClassificationWorkers, DispatchStats, WorkersHandle,
};
pub use runner::{JobRunner, RunningJobs};
