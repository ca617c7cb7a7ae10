use banwatch_application::ports::ClassificationQueue;
use banwatch_domain::{CliOverrides, ShutdownPolicy};
use banwatch_infrastructure::dns::{ClassifyingHandler, ForwardingHandler};
use banwatch_jobs::{BufferFlushJob, JobRunner};
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

mod bootstrap;
mod di;
mod server;

#[derive(Parser)]
#[command(name = "banwatch")]
#[command(version)]
#[command(about = "Banwatch - forwarding DNS server that classifies ban and sanction domains")]
struct Cli {
    /// Configuration file path
    #[arg(short = 'c', long, value_name = "FILE")]
    config: Option<String>,

    /// DNS server port
    #[arg(short = 'd', long)]
    dns_port: Option<u16>,

    /// Bind address
    #[arg(short = 'b', long)]
    bind: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Write the effective configuration to FILE and exit
    #[arg(long, value_name = "FILE")]
    write_config: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let cli_overrides = CliOverrides {
        dns_port: cli.dns_port,
        bind_address: cli.bind.clone(),
        log_level: cli.log_level.clone(),
    };

    let config = bootstrap::load_config(cli.config.as_deref(), cli_overrides)?;

    if let Some(path) = cli.write_config.as_deref() {
        config.save(path)?;
        println!("Configuration written to {}", path);
        return Ok(());
    }

    bootstrap::init_logging(&config);

    info!("Starting Banwatch v{}", env!("CARGO_PKG_VERSION"));
    for warning in config.warnings() {
        warn!("{}", warning);
    }

    let services = di::Services::new(&config)?;

    let report = services.bootstrap.execute().await?;
    info!(
        created = ?report.created,
        ban_domains = report.ban_domains,
        sanction_domains = report.sanction_domains,
        "Hosts files ready"
    );

    let shutdown = CancellationToken::new();

    let mut runner = JobRunner::new()
        .with_classification_workers(services.classification_workers(&config))
        .with_shutdown_token(shutdown.clone());
    if config.dispatch.flush_interval_secs > 0 {
        runner = runner.with_buffer_flush(BufferFlushJob::new(
            services.flush.clone(),
            config.dispatch.flush_interval_secs,
        ));
    }
    let running = runner.start();

    let workers = running
        .workers
        .ok_or_else(|| anyhow::anyhow!("classification workers did not start"))?;

    let queue: Arc<dyn ClassificationQueue> = workers.sender.clone();
    let handler = ClassifyingHandler::new(queue, ForwardingHandler::new(services.forwarder.clone()));

    let dns_addr = format!("{}:{}", config.server.bind_address, config.server.dns_port);
    let tcp_timeout = Duration::from_secs(config.server.tcp_timeout_secs);

    let server_shutdown = shutdown.clone();
    let mut server_task = tokio::spawn(async move {
        server::start_dns_server(dns_addr, handler, tcp_timeout, server_shutdown).await
    });

    tokio::select! {
        result = &mut server_task => {
            match result {
                Ok(Ok(())) => info!("DNS server stopped"),
                Ok(Err(e)) => error!(error = %e, "DNS server error"),
                Err(e) => error!(error = %e, "DNS server task failed"),
            }
        }
        _ = server::shutdown_signal() => {}
    }

    info!(
        policy = config.dispatch.shutdown_policy.as_str(),
        "Stopping classification workers"
    );
    shutdown.cancel();

    if !server_task.is_finished() {
        if let Ok(Err(e)) = server_task.await {
            error!(error = %e, "DNS server shutdown error");
        }
    }

    let stats = workers.task.await?;
    if let Some(flush_task) = running.buffer_flush {
        flush_task.await?;
    }

    if config.dispatch.shutdown_policy == ShutdownPolicy::Abandon && stats.abandoned > 0 {
        warn!(
            abandoned = stats.abandoned,
            "Pending classifications were abandoned"
        );
    }
    info!(
        classified = stats.classified,
        dropped = workers.sender.dropped(),
        "Server shutdown complete"
    );
    Ok(())
}
