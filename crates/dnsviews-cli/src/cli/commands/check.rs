//! `dnsviews check` - Load both sources once and report.

use anyhow::{Context as _, Result};

use super::Context;
use crate::output;

pub async fn execute(ctx: Context) -> Result<()> {
    let refresher = ctx.refresher()?;
    let snapshot = refresher
        .load()
        .await
        .context("failed to load view sources")?;

    println!("{}", output::snapshot_report(&snapshot, ctx.output_format));
    Ok(())
}
