//! Command implementations.

pub mod check;
pub mod lookup;
pub mod serve;

use dnsviews::refresh::Refresher;
use dnsviews::{ResolverState, ViewsConfig};
use std::sync::Arc;

use crate::output::OutputFormat;

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Effective configuration (file plus flags)
    pub config: ViewsConfig,

    /// Output format
    pub output_format: OutputFormat,
}

impl Context {
    /// Build a refresher for one-shot loading, validating the sources.
    pub fn refresher(&self) -> anyhow::Result<Refresher> {
        Ok(Refresher::from_config(
            &self.config,
            Arc::new(ResolverState::new()),
        )?)
    }
}
