//! # dnsviews-cli
//!
//! Command-line front end for the dnsviews split-horizon resolver.
//!
//! - `serve`: run the DNS server with periodic source reloads
//! - `check`: validate sources and print what each view contains
//! - `lookup`: show the answer a given client address would receive

pub mod cli;
pub mod config;
pub mod output;

pub use cli::run;
