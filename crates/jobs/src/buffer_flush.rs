use banwatch_application::use_cases::FlushBuffersUseCase;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Periodically pushes partially filled buffers to disk so low-traffic
/// categories do not sit below their threshold indefinitely.
pub struct BufferFlushJob {
    flush: Arc<FlushBuffersUseCase>,
    interval_secs: u64,
    shutdown: CancellationToken,
}

impl BufferFlushJob {
    pub fn new(flush: Arc<FlushBuffersUseCase>, interval_secs: u64) -> Self {
        Self {
            flush,
            interval_secs,
            shutdown: CancellationToken::new(),
        }
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    pub async fn start(self: Arc<Self>) {
        info!(interval_secs = self.interval_secs, "Starting buffer flush job");

        let mut interval = tokio::time::interval(Duration::from_secs(self.interval_secs));
        // first tick fires immediately
        interval.tick().await;

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    info!("BufferFlushJob: shutting down");
                    break;
                }
                _ = interval.tick() => {
                    self.run_once().await;
                }
            }
        }
    }

    pub async fn run_once(&self) {
        let report = self.flush.execute().await;
        debug!(
            entries = report.entries(),
            failed = report.failed(),
            "Periodic flush pass finished"
        );
    }
}
