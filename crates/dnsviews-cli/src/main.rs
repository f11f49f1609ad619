//! dnsviews - split-horizon DNS server

use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    dnsviews_cli::run().await
}
