//! View sources: where the client-group and record-set documents come from.
//!
//! The kind of source is decided once, from the shape of the locator string:
//! `http://` / `https://` locators are fetched and decoded as JSON, `.yaml` /
//! `.yml` locators are read from disk and decoded as YAML.

use reqwest::Client as HttpClient;
use serde::de::{Deserialize, DeserializeOwned, Deserializer};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Treat an explicit `null` like a missing field.
///
/// JSON producers commonly encode an empty list as `null`.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// A classified source locator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// JSON document served over HTTP(S).
    Http(Url),
    /// YAML document on the local filesystem.
    Yaml(PathBuf),
}

impl Source {
    /// Classify a locator string.
    pub fn parse(locator: &str) -> crate::Result<Self> {
        if locator.starts_with("http://") || locator.starts_with("https://") {
            let url = Url::parse(locator)
                .map_err(|e| crate::ViewsError::Source(format!("{locator} ({e})")))?;
            Ok(Self::Http(url))
        } else if locator.ends_with(".yaml") || locator.ends_with(".yml") {
            Ok(Self::Yaml(PathBuf::from(locator)))
        } else {
            Err(crate::ViewsError::Source(locator.to_string()))
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http(url) => write!(f, "{url}"),
            Self::Yaml(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Reads and decodes source documents.
///
/// Holds one HTTP client so connections are reused across refresh cycles.
#[derive(Debug, Clone)]
pub struct Fetcher {
    http: HttpClient,
}

impl Fetcher {
    /// Create a fetcher whose HTTP requests give up after `timeout`.
    pub fn new(timeout: Duration) -> crate::Result<Self> {
        let http = HttpClient::builder()
            .timeout(timeout)
            .user_agent(format!("dnsviews/{}", env!("CARGO_PKG_VERSION")))
            .gzip(true)
            .build()
            .map_err(|e| crate::ViewsError::Http(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { http })
    }

    /// Fetch and decode one document.
    ///
    /// An empty YAML file decodes to `T::default()`.
    pub async fn fetch<T>(&self, source: &Source) -> crate::Result<T>
    where
        T: DeserializeOwned + Default,
    {
        match source {
            Source::Yaml(path) => {
                debug!(path = %path.display(), "reading YAML source");
                let content = tokio::fs::read_to_string(path).await?;
                if content.trim().is_empty() {
                    return Ok(T::default());
                }
                Ok(serde_yaml::from_str(&content)?)
            }
            Source::Http(url) => self.fetch_json(url).await,
        }
    }

    async fn fetch_json<T: DeserializeOwned>(&self, url: &Url) -> crate::Result<T> {
        debug!(url = %url, "GET source");

        let response = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(|e| crate::ViewsError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(crate::ViewsError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| crate::ViewsError::Http(e.to_string()))?;
        Ok(serde_json::from_str(&body)?)
    }
}
