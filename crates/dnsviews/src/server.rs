//! DNS server runner: binds UDP+TCP and serves the views.

use hickory_server::authority::Catalog;
use hickory_server::server::{RequestHandler, ServerFuture};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, UdpSocket};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::ViewsConfig;
use crate::handler::ViewsHandler;
use crate::refresh::Refresher;
use crate::snapshot::ResolverState;

/// TCP connection timeout for DNS queries.
const TCP_TIMEOUT: Duration = Duration::from_secs(30);

/// Start the views server and run until `cancel` fires.
///
/// Sources are loaded once before the sockets are bound. If that first load
/// fails the server still starts, declining every query until a reload
/// succeeds. Queries the views decline are handed to an empty catalog,
/// which refuses them.
pub async fn run(config: &ViewsConfig, cancel: CancellationToken) -> crate::Result<()> {
    let state = Arc::new(ResolverState::new());
    let refresher = Refresher::from_config(config, Arc::clone(&state))?;

    if refresher.refresh().await.is_err() {
        warn!("initial view load failed, serving no views until the next reload");
    }

    let reload_interval = config.reload_interval()?;
    let reload_cancel = cancel.child_token();
    let reload_task = refresher.spawn(reload_cancel.clone());

    let udp_socket = UdpSocket::bind(config.listen)
        .await
        .map_err(|e| crate::ViewsError::Server(format!("UDP bind {}: {e}", config.listen)))?;
    info!(addr = %config.listen, "UDP socket bound");

    let tcp_listener = TcpListener::bind(config.listen)
        .await
        .map_err(|e| crate::ViewsError::Server(format!("TCP bind {}: {e}", config.listen)))?;
    info!(addr = %config.listen, "TCP listener bound");

    info!(
        addr = %config.listen,
        reload = ?reload_interval,
        "dnsviews server running"
    );

    let handler = ViewsHandler::new(state, Catalog::new());
    let result = serve(handler, udp_socket, tcp_listener, cancel).await;

    reload_cancel.cancel();
    if let Err(e) = reload_task.await {
        warn!(error = %e, "view reload task ended abnormally");
    }

    info!("dnsviews server stopped");
    result
}

/// Serve `handler` on already bound sockets until `cancel` fires.
pub async fn serve<H: RequestHandler>(
    handler: H,
    udp_socket: UdpSocket,
    tcp_listener: TcpListener,
    cancel: CancellationToken,
) -> crate::Result<()> {
    let mut server = ServerFuture::new(handler);
    server.register_socket(udp_socket);
    server.register_listener(tcp_listener, TCP_TIMEOUT);

    let server_token = server.shutdown_token().clone();
    let mut server_task = tokio::spawn(async move { server.block_until_done().await });

    tokio::select! {
        () = cancel.cancelled() => {
            server_token.cancel();
        }
        _ = &mut server_task => {}
    }

    match server_task.await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(crate::ViewsError::Server(format!("server error: {e}"))),
        Err(e) => Err(crate::ViewsError::Server(format!("server task failed: {e}"))),
    }
}
