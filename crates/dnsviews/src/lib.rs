//! dnsviews: split-horizon DNS answering.
//!
//! Operators describe named groups of client networks ("views") and, in a
//! separate document, named record sets. A query is answered from the record
//! set whose name matches the first view containing the client address.
//! Anything else is passed on to the next handler in the chain.
//!
//! # Architecture
//!
//! - [`acl`] - ordered client groups, first matching group wins
//! - [`records`] - per-view record sets keyed by normalized name
//! - [`snapshot`] - one immutable generation of both, published atomically
//! - [`refresh`] - loads sources at startup and on a fixed interval
//! - [`resolver`] - the hot path: (client, name, type) to answer or decline
//! - [`handler`] - hickory-server adapter that chains to a next handler
//! - [`server`] - binds UDP/TCP and ties the pieces together
//!
//! # Sources
//!
//! Each of the two documents is read either from a local YAML file
//! (`*.yaml` / `*.yml`) or from an HTTP(S) endpoint returning JSON.

pub mod acl;
pub mod config;
pub mod error;
pub mod handler;
pub mod records;
pub mod refresh;
pub mod resolver;
pub mod server;
pub mod snapshot;
pub mod source;

// Re-exports for convenience.
pub use config::ViewsConfig;
pub use error::ViewsError;
pub use resolver::{Answer, Resolution};
pub use snapshot::{ConfigSnapshot, ResolverState};

/// Result type for dnsviews operations.
pub type Result<T> = std::result::Result<T, ViewsError>;
