//! Bounded hand-off between the serving path and classification.
//!
//! Handlers push query clones into a bounded channel through
//! [`ClassificationSender`]; a dispatcher task pulls them off and runs
//! [`ClassifyQueryUseCase`] with at most `max_in_flight` tasks alive at once.
//! On cancellation the configured [`ShutdownPolicy`] decides whether queued
//! and in-flight work finishes (followed by a final buffer flush) or is
//! dropped.

use banwatch_application::ports::ClassificationQueue;
use banwatch_application::use_cases::{
    ClassificationOutcome, ClassifyQueryUseCase, FlushBuffersUseCase,
};
use banwatch_domain::ShutdownPolicy;
use hickory_proto::op::Message;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, OwnedSemaphorePermit, Semaphore};
use tokio::task::{JoinError, JoinHandle, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

const DEFAULT_MAX_IN_FLIGHT: usize = 256;
const DEFAULT_QUEUE_CAPACITY: usize = 1024;

/// Producer side of the classification queue.
pub struct ClassificationSender {
    tx: mpsc::Sender<Message>,
    dropped: AtomicU64,
}

impl ClassificationSender {
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl ClassificationQueue for ClassificationSender {
    fn submit(&self, query: Message) -> bool {
        match self.tx.try_send(query) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                let dropped = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
                warn!(dropped, "Classification queue full, dropping query");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                debug!("Classification queue closed, dropping query");
                false
            }
        }
    }
}

/// Counters reported when the dispatcher exits.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DispatchStats {
    pub classified: u64,
    pub unclassified: u64,
    pub failed: u64,
    /// Queued or in-flight queries dropped by an abandon shutdown.
    pub abandoned: u64,
}

impl DispatchStats {
    pub fn completed(&self) -> u64 {
        self.classified + self.unclassified
    }

    fn record(&mut self, result: Result<ClassificationOutcome, JoinError>) {
        match result {
            Ok(ClassificationOutcome::Classified { .. }) => self.classified += 1,
            Ok(ClassificationOutcome::Unclassified) => self.unclassified += 1,
            Err(e) if e.is_cancelled() => self.abandoned += 1,
            Err(e) => {
                self.failed += 1;
                error!(error = %e, "Classification task panicked");
            }
        }
    }
}

/// Handles returned by [`ClassificationWorkers::start`].
pub struct WorkersHandle {
    pub sender: Arc<ClassificationSender>,
    pub task: JoinHandle<DispatchStats>,
}

pub struct ClassificationWorkers {
    classify: Arc<ClassifyQueryUseCase>,
    flush: Arc<FlushBuffersUseCase>,
    max_in_flight: usize,
    queue_capacity: usize,
    policy: ShutdownPolicy,
    shutdown: CancellationToken,
}

impl ClassificationWorkers {
    pub fn new(classify: Arc<ClassifyQueryUseCase>, flush: Arc<FlushBuffersUseCase>) -> Self {
        Self {
            classify,
            flush,
            max_in_flight: DEFAULT_MAX_IN_FLIGHT,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            policy: ShutdownPolicy::default(),
            shutdown: CancellationToken::new(),
        }
    }

    pub fn with_limits(mut self, max_in_flight: usize, queue_capacity: usize) -> Self {
        self.max_in_flight = max_in_flight.max(1);
        self.queue_capacity = queue_capacity.max(1);
        self
    }

    pub fn with_shutdown_policy(mut self, policy: ShutdownPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    pub fn start(self) -> WorkersHandle {
        let (tx, rx) = mpsc::channel(self.queue_capacity);
        let sender = Arc::new(ClassificationSender {
            tx,
            dropped: AtomicU64::new(0),
        });

        info!(
            max_in_flight = self.max_in_flight,
            queue_capacity = self.queue_capacity,
            shutdown_policy = self.policy.as_str(),
            "Starting classification workers"
        );

        let task = tokio::spawn(self.run(rx));
        WorkersHandle { sender, task }
    }

    async fn run(self, mut rx: mpsc::Receiver<Message>) -> DispatchStats {
        let permits = Arc::new(Semaphore::new(self.max_in_flight));
        let mut tasks: JoinSet<ClassificationOutcome> = JoinSet::new();
        let mut stats = DispatchStats::default();

        loop {
            let permit = tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => break,
                permit = Arc::clone(&permits).acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => break,
                },
            };

            let query = tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => break,
                query = rx.recv() => match query {
                    Some(query) => query,
                    None => break,
                },
            };

            self.spawn_classification(&mut tasks, query, permit);

            while let Some(result) = tasks.try_join_next() {
                stats.record(result);
            }
        }

        rx.close();

        match self.policy {
            ShutdownPolicy::Drain => self.drain(rx, permits, tasks, &mut stats).await,
            ShutdownPolicy::Abandon => Self::abandon(rx, tasks, &mut stats).await,
        }

        info!(
            classified = stats.classified,
            unclassified = stats.unclassified,
            failed = stats.failed,
            abandoned = stats.abandoned,
            "Classification workers stopped"
        );
        stats
    }

    fn spawn_classification(
        &self,
        tasks: &mut JoinSet<ClassificationOutcome>,
        query: Message,
        permit: OwnedSemaphorePermit,
    ) {
        let classify = Arc::clone(&self.classify);
        tasks.spawn(async move {
            let _permit = permit;
            classify.execute(&query).await
        });
    }

    async fn drain(
        &self,
        mut rx: mpsc::Receiver<Message>,
        permits: Arc<Semaphore>,
        mut tasks: JoinSet<ClassificationOutcome>,
        stats: &mut DispatchStats,
    ) {
        info!(
            in_flight = tasks.len(),
            queued = rx.len(),
            "Draining classification queue"
        );

        while let Some(query) = rx.recv().await {
            let Ok(permit) = Arc::clone(&permits).acquire_owned().await else {
                break;
            };
            self.spawn_classification(&mut tasks, query, permit);
        }

        while let Some(result) = tasks.join_next().await {
            stats.record(result);
        }

        let report = self.flush.execute().await;
        info!(
            entries = report.entries(),
            failed = report.failed(),
            "Final flush completed"
        );
    }

    async fn abandon(
        mut rx: mpsc::Receiver<Message>,
        mut tasks: JoinSet<ClassificationOutcome>,
        stats: &mut DispatchStats,
    ) {
        tasks.abort_all();
        while let Some(result) = tasks.join_next().await {
            stats.record(result);
        }

        while rx.try_recv().is_ok() {
            stats.abandoned += 1;
        }

        warn!(abandoned = stats.abandoned, "Classification work abandoned");
    }
}
