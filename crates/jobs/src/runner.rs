use crate::{BufferFlushJob, ClassificationWorkers, WorkersHandle};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Started background work; the worker handle is needed to wire handlers
/// and to await the final drain at shutdown.
pub struct RunningJobs {
    pub workers: Option<WorkersHandle>,
    pub buffer_flush: Option<JoinHandle<()>>,
}

pub struct JobRunner {
    workers: Option<ClassificationWorkers>,
    buffer_flush: Option<BufferFlushJob>,
    shutdown: Option<CancellationToken>,
}

impl JobRunner {
    pub fn new() -> Self {
        Self {
            workers: None,
            buffer_flush: None,
            shutdown: None,
        }
    }

    pub fn with_classification_workers(mut self, workers: ClassificationWorkers) -> Self {
        self.workers = Some(workers);
        self
    }

    pub fn with_buffer_flush(mut self, job: BufferFlushJob) -> Self {
        self.buffer_flush = Some(job);
        self
    }

    pub fn with_shutdown_token(mut self, token: CancellationToken) -> Self {
        self.shutdown = Some(token);
        self
    }

    pub fn start(self) -> RunningJobs {
        info!("Starting background job runner");

        let workers = self.workers.map(|workers| {
            let workers = match &self.shutdown {
                Some(token) => workers.with_cancellation(token.clone()),
                None => workers,
            };
            workers.start()
        });

        let buffer_flush = self.buffer_flush.map(|job| {
            let job = match &self.shutdown {
                Some(token) => job.with_cancellation(token.clone()),
                None => job,
            };
            let job = Arc::new(job);
            tokio::spawn(async move { job.start().await })
        });

        info!(
            classification_workers = workers.is_some(),
            buffer_flush = buffer_flush.is_some(),
            "All background jobs started"
        );

        RunningJobs {
            workers,
            buffer_flush,
        }
    }
}

impl Default for JobRunner {
    fn default() -> Self {
        Self::new()
    }
}
