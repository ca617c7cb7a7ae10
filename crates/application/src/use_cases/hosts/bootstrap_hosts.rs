use crate::ports::HostsFileStore;
use crate::services::{CategoryBuffers, MergePlan};
use banwatch_domain::{normalize_domain, Category, ClassificationEntry, DomainError};
use rustc_hash::FxHashSet;
use std::sync::Arc;
use tracing::info;

const RESULT_HEADER: &str = "\n\n# merged ban and sanction domains\n";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BootstrapReport {
    pub created: Vec<String>,
    pub ban_domains: usize,
    pub sanction_domains: usize,
}

impl BootstrapReport {
    pub fn domains(&self, category: Category) -> usize {
        match category {
            Category::Ban => self.ban_domains,
            Category::Sanction => self.sanction_domains,
        }
    }
}

/// Startup pass over the hosts files.
///
/// Missing fragments are created with a header, existing fragments are
/// deduplicated and rewritten with the currently configured destination
/// addresses, the buffers learn which domains are already on disk and the
/// result file is rebuilt. Any failure here is fatal to startup.
pub struct BootstrapHostsUseCase {
    store: Arc<dyn HostsFileStore>,
    buffers: CategoryBuffers,
    merge_plan: Arc<MergePlan>,
}

impl BootstrapHostsUseCase {
    pub fn new(
        store: Arc<dyn HostsFileStore>,
        buffers: CategoryBuffers,
        merge_plan: Arc<MergePlan>,
    ) -> Self {
        Self {
            store,
            buffers,
            merge_plan,
        }
    }

    pub async fn execute(&self) -> Result<BootstrapReport, DomainError> {
        let mut report = BootstrapReport::default();

        for buffer in self.buffers.iter() {
            let header = buffer.category().fragment_header();
            if self.store.ensure_exists(buffer.fragment(), &header).await? {
                report.created.push(buffer.fragment().display().to_string());
            }
        }
        if self
            .store
            .ensure_exists(&self.merge_plan.result, RESULT_HEADER)
            .await?
        {
            report
                .created
                .push(self.merge_plan.result.display().to_string());
        }

        for buffer in self.buffers.iter() {
            let hosts = self.store.read_hosts(buffer.fragment()).await?;
            let domains = dedup_domains(hosts);

            let lines: Vec<String> = domains
                .iter()
                .flat_map(|d| ClassificationEntry::expand(d, buffer.destinations()))
                .map(|e| e.to_hosts_line())
                .collect();
            self.store
                .rewrite_data_lines(buffer.fragment(), &lines)
                .await?;

            info!(
                category = %buffer.category(),
                domains = domains.len(),
                entries = lines.len(),
                fragment = %buffer.fragment().display(),
                "Fragment deduplicated"
            );

            match buffer.category() {
                Category::Ban => report.ban_domains = domains.len(),
                Category::Sanction => report.sanction_domains = domains.len(),
            }
            buffer.seed_known(domains).await;
        }

        let plan = &self.merge_plan;
        self.store
            .merge(&plan.first, &plan.second, &plan.result)
            .await?;

        Ok(report)
    }
}

/// Normalized host names in first-seen order without repeats.
pub(crate) fn dedup_domains(hosts: Vec<String>) -> Vec<Arc<str>> {
    let mut seen = FxHashSet::default();
    hosts
        .into_iter()
        .map(|h| normalize_domain(&h))
        .filter(|d| !d.is_empty())
        .filter(|d| seen.insert(d.clone()))
        .map(Arc::from)
        .collect()
}
