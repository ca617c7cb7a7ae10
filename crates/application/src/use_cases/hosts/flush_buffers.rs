use crate::services::CategoryBuffers;
use banwatch_domain::{Category, DomainError};

/// Per-category results of one flush pass.
#[derive(Debug, Default)]
pub struct FlushReport {
    pub results: Vec<(Category, Result<usize, DomainError>)>,
}

impl FlushReport {
    /// Entries written across every category that flushed cleanly.
    pub fn entries(&self) -> usize {
        self.results
            .iter()
            .filter_map(|(_, r)| r.as_ref().ok())
            .sum()
    }

    pub fn failed(&self) -> usize {
        self.results.iter().filter(|(_, r)| r.is_err()).count()
    }
}

/// Flushes both category buffers regardless of their thresholds.
///
/// Each buffer logs its own flush outcome; callers only report totals.
pub struct FlushBuffersUseCase {
    buffers: CategoryBuffers,
}

impl FlushBuffersUseCase {
    pub fn new(buffers: CategoryBuffers) -> Self {
        Self { buffers }
    }

    /// Every category is attempted even if an earlier one fails.
    pub async fn execute(&self) -> FlushReport {
        let mut report = FlushReport::default();
        for buffer in self.buffers.iter() {
            let result = buffer.flush().await;
            report.results.push((buffer.category(), result));
        }
        report
    }
}
