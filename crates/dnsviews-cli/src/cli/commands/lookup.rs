//! `dnsviews lookup` - Resolve one query as a given client would.

use anyhow::{Context as _, Result};
use dnsviews::records::RecordKind;

use super::Context;
use crate::cli::args::LookupArgs;
use crate::output;

pub async fn execute(ctx: Context, args: LookupArgs) -> Result<()> {
    let kind: RecordKind = args.record_type.parse()?;
    if kind == RecordKind::Unknown {
        anyhow::bail!(
            "unsupported record type: {}\nSupported types: A, AAAA, CNAME, TXT",
            args.record_type
        );
    }

    let refresher = ctx.refresher()?;
    let snapshot = refresher
        .load()
        .await
        .context("failed to load view sources")?;

    let resolution = snapshot.resolve(args.from, &args.name, kind);
    println!("{}", output::resolution_report(&resolution, ctx.output_format));
    Ok(())
}
