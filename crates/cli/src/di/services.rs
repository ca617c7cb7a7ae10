use banwatch_application::ports::{CheckerExchange, HostsFileStore};
use banwatch_application::services::{CategoryBuffer, CategoryBuffers, MergePlan, PatternMatcher};
use banwatch_application::use_cases::{
    BootstrapHostsUseCase, ClassifyQueryUseCase, FlushBuffersUseCase,
};
use banwatch_domain::{Category, Config};
use banwatch_infrastructure::dns::{HickoryCheckerExchange, UpstreamForwarder};
use banwatch_infrastructure::hosts::FsHostsStore;
use banwatch_jobs::ClassificationWorkers;
use std::sync::Arc;
use tracing::info;

pub struct Services {
    pub classify: Arc<ClassifyQueryUseCase>,
    pub flush: Arc<FlushBuffersUseCase>,
    pub bootstrap: BootstrapHostsUseCase,
    pub forwarder: Arc<UpstreamForwarder>,
}

impl Services {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let store: Arc<dyn HostsFileStore> = Arc::new(FsHostsStore::new());
        let merge_plan = Arc::new(MergePlan::new(
            &config.sanction.hosts_file,
            &config.ban.hosts_file,
            &config.hosts.result_file,
        ));

        let ban = Self::build_buffer(config, Category::Ban, &store, &merge_plan)?;
        let sanction = Self::build_buffer(config, Category::Sanction, &store, &merge_plan)?;
        let buffers = CategoryBuffers::new(ban, sanction);

        let checkers = config.checker.socket_addrs()?;
        let exchange: Arc<dyn CheckerExchange> =
            Arc::new(HickoryCheckerExchange::new(config.checker.timeout_ms));
        let ban_markers = PatternMatcher::new(&config.ban.markers)?;
        let sanction_markers = PatternMatcher::new(&config.sanction.markers)?;

        info!(
            checkers = checkers.len(),
            ban_markers = ban_markers.marker_count(),
            sanction_markers = sanction_markers.marker_count(),
            "Classification configured"
        );

        let classify = Arc::new(ClassifyQueryUseCase::new(
            checkers,
            exchange,
            ban_markers,
            sanction_markers,
            buffers.clone(),
        ));
        let flush = Arc::new(FlushBuffersUseCase::new(buffers.clone()));
        let bootstrap = BootstrapHostsUseCase::new(store, buffers, merge_plan);

        let upstreams = config.upstream.socket_addrs()?;
        info!(upstreams = ?upstreams, "Upstream resolvers configured");
        let forwarder = Arc::new(UpstreamForwarder::new(upstreams, config.upstream.timeout_ms));

        Ok(Self {
            classify,
            flush,
            bootstrap,
            forwarder,
        })
    }

    fn build_buffer(
        config: &Config,
        category: Category,
        store: &Arc<dyn HostsFileStore>,
        merge_plan: &Arc<MergePlan>,
    ) -> anyhow::Result<Arc<CategoryBuffer>> {
        let settings = config.category(category);
        let destinations = settings.destination_addrs(category)?;

        info!(
            category = %category,
            fragment = %settings.hosts_file,
            destinations = ?destinations,
            threshold = settings.buffer_size,
            "Category buffer configured"
        );

        Ok(Arc::new(CategoryBuffer::new(
            category,
            &settings.hosts_file,
            destinations,
            settings.buffer_size,
            Arc::clone(store),
            Arc::clone(merge_plan),
        )))
    }

    pub fn classification_workers(&self, config: &Config) -> ClassificationWorkers {
        ClassificationWorkers::new(Arc::clone(&self.classify), Arc::clone(&self.flush))
            .with_limits(config.dispatch.max_in_flight, config.dispatch.queue_capacity)
            .with_shutdown_policy(config.dispatch.shutdown_policy)
    }
}
