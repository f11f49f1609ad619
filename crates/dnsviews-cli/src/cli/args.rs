//! Command-line argument definitions using clap.

use clap::{Args, Parser, Subcommand};
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use crate::output::OutputFormat;

/// Split-horizon DNS: answer queries from per-network views.
///
/// Client groups and record sets are read from YAML files or HTTP(S)
/// endpoints serving JSON, and reloaded on a fixed interval.
#[derive(Parser, Debug)]
#[command(name = "dnsviews")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Config file (TOML). Defaults to the platform config directory.
    #[arg(short, long, env = "DNSVIEWS_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Client-group source: a .yaml/.yml file or an http(s) URL
    #[arg(long, env = "DNSVIEWS_CLIENT", global = true)]
    pub client: Option<String>,

    /// Record-set source: a .yaml/.yml file or an http(s) URL
    #[arg(long, env = "DNSVIEWS_RECORD", global = true)]
    pub record: Option<String>,

    /// Interval between source reloads, e.g. 30s, 500ms or 1m30s
    #[arg(long, value_name = "DURATION", global = true)]
    pub reload: Option<String>,

    /// Seconds before an HTTP source fetch is abandoned
    #[arg(long, global = true)]
    pub http_timeout_secs: Option<u64>,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Pretty)]
    pub output: OutputFormat,

    /// Increase verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the DNS server
    Serve(ServeArgs),

    /// Load both sources once and report what was found
    Check,

    /// Resolve one query as a given client would see it
    Lookup(LookupArgs),
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// UDP/TCP listen address
    #[arg(short, long)]
    pub listen: Option<SocketAddr>,
}

#[derive(Args, Debug)]
pub struct LookupArgs {
    /// Client address the query appears to come from
    #[arg(long, value_name = "IP")]
    pub from: IpAddr,

    /// Query name
    pub name: String,

    /// Query type (A, AAAA, CNAME, TXT)
    #[arg(default_value = "A")]
    pub record_type: String,
}
