//! Error types for the dnsviews resolver.

use thiserror::Error;

/// Errors that can occur while setting up or refreshing views.
///
/// Query answering never produces one of these: a query the views cannot
/// answer is a [`crate::resolver::Resolution::NotHandled`], not an error.
#[derive(Error, Debug)]
pub enum ViewsError {
    /// Configuration is invalid or missing required fields.
    #[error("config error: {0}")]
    Config(String),

    /// Source locator is neither an HTTP URL nor a YAML file.
    #[error("unknown schema: {0}")]
    Source(String),

    /// HTTP request to a remote source failed (including timeouts).
    #[error("http error: {0}")]
    Http(String),

    /// Remote source answered with a non-success status.
    #[error("http {status} from {url}")]
    HttpStatus { url: String, status: u16 },

    /// DNS server failed to bind or stopped with an error.
    #[error("dns server error: {0}")]
    Server(String),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML source document could not be decoded.
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON source document could not be decoded.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
