//! `dnsviews serve` - Run the DNS server.

use anyhow::Result;
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::Context;
use crate::cli::args::ServeArgs;

pub async fn execute(ctx: Context, args: ServeArgs) -> Result<()> {
    let mut config = ctx.config;
    if let Some(listen) = args.listen {
        config.listen = listen;
    }

    let cancel = CancellationToken::new();
    let shutdown = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown requested");
        }
        shutdown.cancel();
    });

    dnsviews::server::run(&config, cancel).await?;
    Ok(())
}
