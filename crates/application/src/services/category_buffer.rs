use crate::ports::HostsFileStore;
use banwatch_domain::{Category, ClassificationEntry, DomainError};
use rustc_hash::FxHashSet;
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Where a successful flush re-merges the fragments to.
#[derive(Debug, Clone)]
pub struct MergePlan {
    pub first: PathBuf,
    pub second: PathBuf,
    pub result: PathBuf,
}

impl MergePlan {
    /// The result file is the sanction fragment followed by the ban fragment.
    pub fn new(
        sanction_fragment: impl Into<PathBuf>,
        ban_fragment: impl Into<PathBuf>,
        result: impl Into<PathBuf>,
    ) -> Self {
        Self {
            first: sanction_fragment.into(),
            second: ban_fragment.into(),
            result: result.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BufferOutcome {
    /// Domain is already pending or already in the fragment file.
    Duplicate,
    Buffered { pending: usize },
    Flushed { entries: usize },
}

#[derive(Default)]
struct PendingState {
    entries: Vec<ClassificationEntry>,
    pending_domains: FxHashSet<Arc<str>>,
    /// Domains already written to the fragment file.
    known_domains: FxHashSet<Arc<str>>,
}

/// Deduplicated pending entries for one category.
///
/// The pending collection is only reachable through `classify_and_buffer`
/// and `flush`, both of which hold the category lock for their whole
/// duration, including file I/O.
pub struct CategoryBuffer {
    category: Category,
    fragment: PathBuf,
    destinations: Arc<[IpAddr]>,
    threshold: usize,
    store: Arc<dyn HostsFileStore>,
    merge_plan: Arc<MergePlan>,
    state: Mutex<PendingState>,
}

impl CategoryBuffer {
    pub fn new(
        category: Category,
        fragment: impl Into<PathBuf>,
        destinations: Vec<IpAddr>,
        threshold: usize,
        store: Arc<dyn HostsFileStore>,
        merge_plan: Arc<MergePlan>,
    ) -> Self {
        Self {
            category,
            fragment: fragment.into(),
            destinations: destinations.into(),
            threshold,
            store,
            merge_plan,
            state: Mutex::new(PendingState::default()),
        }
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn fragment(&self) -> &Path {
        &self.fragment
    }

    pub fn destinations(&self) -> &[IpAddr] {
        &self.destinations
    }

    /// Buffers `domain` once per destination address.
    ///
    /// The threshold is compared against the entry count, so with N
    /// destinations a flush happens after roughly `threshold / N` domains.
    /// Only a flush can fail; on failure the entries stay buffered and the
    /// next crossing of the threshold retries.
    pub async fn classify_and_buffer(&self, domain: &str) -> Result<BufferOutcome, DomainError> {
        let mut state = self.state.lock().await;

        if state.pending_domains.contains(domain) || state.known_domains.contains(domain) {
            debug!(category = %self.category, domain = %domain, "Domain already classified");
            return Ok(BufferOutcome::Duplicate);
        }

        let domain: Arc<str> = Arc::from(domain);
        let entries = ClassificationEntry::expand(&domain, &self.destinations);
        state.entries.extend(entries);
        state.pending_domains.insert(domain);

        let pending = state.entries.len();
        if pending > self.threshold {
            let entries = self.flush_locked(&mut state).await?;
            return Ok(BufferOutcome::Flushed { entries });
        }

        Ok(BufferOutcome::Buffered { pending })
    }

    /// Writes every pending entry to the fragment and re-merges the result
    /// file. Returns the number of entries written.
    pub async fn flush(&self) -> Result<usize, DomainError> {
        let mut state = self.state.lock().await;
        self.flush_locked(&mut state).await
    }

    async fn flush_locked(&self, state: &mut PendingState) -> Result<usize, DomainError> {
        if state.entries.is_empty() {
            return Ok(0);
        }

        let lines: Vec<String> = state
            .entries
            .iter()
            .map(ClassificationEntry::to_hosts_line)
            .collect();

        if let Err(e) = self.store.append_lines(&self.fragment, &lines).await {
            warn!(
                category = %self.category,
                pending = state.entries.len(),
                error = %e,
                "Flush failed, keeping buffered entries"
            );
            return Err(e);
        }

        let written = state.entries.len();
        state.entries.clear();
        let flushed = std::mem::take(&mut state.pending_domains);
        let domains = flushed.len();
        state.known_domains.extend(flushed);

        info!(
            category = %self.category,
            entries = written,
            domains,
            fragment = %self.fragment.display(),
            "Flushed classification buffer"
        );

        let plan = &self.merge_plan;
        if let Err(e) = self
            .store
            .merge(&plan.first, &plan.second, &plan.result)
            .await
        {
            warn!(
                category = %self.category,
                result = %plan.result.display(),
                error = %e,
                "Merge after flush failed; result file is stale until the next flush"
            );
            return Err(e);
        }

        Ok(written)
    }

    /// Marks domains already present in the fragment so they are not
    /// appended again.
    pub async fn seed_known<I, S>(&self, domains: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<Arc<str>>,
    {
        let mut state = self.state.lock().await;
        state.known_domains.extend(domains.into_iter().map(Into::into));
    }

    pub async fn pending_entries(&self) -> Vec<ClassificationEntry> {
        self.state.lock().await.entries.clone()
    }

    pub async fn pending_len(&self) -> usize {
        self.state.lock().await.entries.len()
    }

    pub async fn is_known(&self, domain: &str) -> bool {
        self.state.lock().await.known_domains.contains(domain)
    }
}

/// The two category buffers, addressed by `Category`.
#[derive(Clone)]
pub struct CategoryBuffers {
    ban: Arc<CategoryBuffer>,
    sanction: Arc<CategoryBuffer>,
}

impl CategoryBuffers {
    pub fn new(ban: Arc<CategoryBuffer>, sanction: Arc<CategoryBuffer>) -> Self {
        Self { ban, sanction }
    }

    pub fn get(&self, category: Category) -> &Arc<CategoryBuffer> {
        match category {
            Category::Ban => &self.ban,
            Category::Sanction => &self.sanction,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<CategoryBuffer>> {
        Category::ALL.into_iter().map(move |c| self.get(c))
    }
}
