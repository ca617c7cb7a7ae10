use hickory_server::server::RequestHandler;
use hickory_server::ServerFuture;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::{TcpListener, UdpSocket};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Serves UDP and TCP on `bind_addr` until `shutdown` is cancelled.
pub async fn start_dns_server<H: RequestHandler>(
    bind_addr: String,
    handler: H,
    tcp_timeout: Duration,
    shutdown: CancellationToken,
) -> anyhow::Result<()> {
    let socket_addr: SocketAddr = bind_addr.parse()?;

    let udp_socket = UdpSocket::bind(socket_addr).await?;
    let tcp_listener = TcpListener::bind(socket_addr).await?;

    info!(
        bind_address = %socket_addr,
        tcp_timeout_secs = tcp_timeout.as_secs(),
        "DNS server listening on UDP and TCP"
    );

    let mut server = ServerFuture::new(handler);
    server.register_socket(udp_socket);
    server.register_listener(tcp_listener, tcp_timeout);

    tokio::select! {
        result = server.block_until_done() => {
            if let Err(e) = &result {
                error!(error = %e, "DNS server terminated");
            }
            return result.map_err(Into::into);
        }
        _ = shutdown.cancelled() => {}
    }

    info!("Stopping DNS listeners");
    server.shutdown_gracefully().await?;
    Ok(())
}

/// Resolves on Ctrl+C or, on unix, SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
                info!("Received SIGTERM");
            }
            Err(e) => {
                error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
