//! Resolver configuration.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;

use crate::source::Source;

/// Configuration for a dnsviews node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewsConfig {
    /// UDP/TCP listen address (default: 0.0.0.0:5353).
    #[serde(default = "default_listen")]
    pub listen: SocketAddr,

    /// Locator of the client-group document (URL or YAML path).
    #[serde(default)]
    pub client: Option<String>,

    /// Locator of the record-set document (URL or YAML path).
    #[serde(default)]
    pub record: Option<String>,

    /// How often to reload both documents (seconds).
    #[serde(default = "default_reload_interval")]
    pub reload_interval_secs: u64,

    /// Reload interval as a duration string (`500ms`, `45s`, `1m30s`).
    /// Takes precedence over `reload_interval_secs` when set.
    #[serde(default)]
    pub reload: Option<String>,

    /// Timeout for a single HTTP fetch (seconds).
    #[serde(default = "default_http_timeout")]
    pub http_timeout_secs: u64,
}

impl Default for ViewsConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            client: None,
            record: None,
            reload_interval_secs: default_reload_interval(),
            reload: None,
            http_timeout_secs: default_http_timeout(),
        }
    }
}

impl ViewsConfig {
    /// Load config from a TOML file, falling back to defaults.
    pub fn load(path: &std::path::Path) -> crate::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            toml::from_str(&content).map_err(|e| crate::ViewsError::Config(e.to_string()))
        } else {
            Ok(Self::default())
        }
    }

    /// Classify the client-group locator.
    pub fn client_source(&self) -> crate::Result<Source> {
        required_source(self.client.as_deref(), "client")
    }

    /// Classify the record-set locator.
    pub fn record_source(&self) -> crate::Result<Source> {
        required_source(self.record.as_deref(), "record")
    }

    /// Interval between refreshes. Zero is rejected.
    pub fn reload_interval(&self) -> crate::Result<Duration> {
        let interval = match self.reload.as_deref() {
            Some(reload) => parse_duration(reload)?,
            None => Duration::from_secs(self.reload_interval_secs),
        };
        if interval.is_zero() {
            return Err(crate::ViewsError::Config(
                "reload interval must be greater than zero".into(),
            ));
        }
        Ok(interval)
    }

    /// Timeout applied to each HTTP fetch. Zero is rejected.
    pub fn http_timeout(&self) -> crate::Result<Duration> {
        if self.http_timeout_secs == 0 {
            return Err(crate::ViewsError::Config(
                "http timeout must be at least one second".into(),
            ));
        }
        Ok(Duration::from_secs(self.http_timeout_secs))
    }
}

fn required_source(locator: Option<&str>, field: &str) -> crate::Result<Source> {
    match locator.map(str::trim) {
        Some(locator) if !locator.is_empty() => Source::parse(locator),
        _ => Err(crate::ViewsError::Config(format!(
            "required argument is missing: '{field}'"
        ))),
    }
}

/// Parse a duration such as `500ms`, `45s`, `1m30s` or `1.5h`.
///
/// Units are `ns`, `us` (or `µs`), `ms`, `s`, `m` and `h`. Every number
/// needs a unit, and components may be chained.
pub fn parse_duration(input: &str) -> crate::Result<Duration> {
    let input = input.trim();
    let invalid =
        |reason: &str| crate::ViewsError::Config(format!("invalid duration '{input}': {reason}"));
    if input.is_empty() {
        return Err(invalid("empty"));
    }

    let mut total = Duration::ZERO;
    let mut rest = input;
    while !rest.is_empty() {
        let number_len = rest
            .find(|c: char| !c.is_ascii_digit() && c != '.')
            .unwrap_or(rest.len());
        let (number, tail) = rest.split_at(number_len);
        let unit_len = tail
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(tail.len());
        let (unit, tail) = tail.split_at(unit_len);

        let value: f64 = number.parse().map_err(|_| invalid("expected a number"))?;
        let nanos_per_unit = match unit {
            "ns" => 1.0,
            "us" | "µs" => 1e3,
            "ms" => 1e6,
            "s" => 1e9,
            "m" => 60e9,
            "h" => 3600e9,
            "" => return Err(invalid("missing unit")),
            other => return Err(invalid(&format!("unknown unit '{other}'"))),
        };
        total += Duration::try_from_secs_f64(value * nanos_per_unit / 1e9)
            .map_err(|e| invalid(&e.to_string()))?;
        rest = tail;
    }
    Ok(total)
}

// Default value functions for serde.
fn default_listen() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 5353))
}

const fn default_reload_interval() -> u64 {
    30
}

const fn default_http_timeout() -> u64 {
    60
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ViewsConfig::default();
        assert_eq!(config.listen.port(), 5353);
        assert_eq!(config.reload_interval_secs, 30);
        assert_eq!(config.http_timeout_secs, 60);
        assert!(config.client.is_none());
        assert!(config.record.is_none());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: ViewsConfig = toml::from_str(
            r#"
            client = "clients.yaml"
            record = "https://views.example.net/records"
            "#,
        )
        .unwrap();
        assert_eq!(config.reload_interval_secs, 30);
        assert_eq!(config.listen.port(), 5353);
        assert!(matches!(config.client_source().unwrap(), Source::Yaml(_)));
        assert!(matches!(config.record_source().unwrap(), Source::Http(_)));
    }

    #[test]
    fn test_missing_client_is_config_error() {
        let config = ViewsConfig {
            record: Some("records.yml".into()),
            ..Default::default()
        };
        let err = config.client_source().unwrap_err();
        assert!(err.to_string().contains("'client'"));
        assert!(config.record_source().is_ok());
    }

    #[test]
    fn test_unknown_schema_rejected() {
        let config = ViewsConfig {
            client: Some("clients.json".into()),
            ..Default::default()
        };
        assert!(matches!(
            config.client_source(),
            Err(crate::ViewsError::Source(_))
        ));
    }

    #[test]
    fn test_zero_intervals_rejected() {
        let config = ViewsConfig {
            reload_interval_secs: 0,
            http_timeout_secs: 0,
            ..Default::default()
        };
        assert!(config.reload_interval().is_err());
        assert!(config.http_timeout().is_err());
    }

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("500ms").unwrap(), Duration::from_millis(500));
        assert_eq!(parse_duration("45s").unwrap(), Duration::from_secs(45));
        assert_eq!(parse_duration("1m30s").unwrap(), Duration::from_secs(90));
        assert_eq!(parse_duration("1.5h").unwrap(), Duration::from_secs(5400));
        assert_eq!(parse_duration(" 2m ").unwrap(), Duration::from_secs(120));
        assert_eq!(parse_duration("1h15m").unwrap(), Duration::from_secs(4500));

        assert!(parse_duration("").is_err());
        assert!(parse_duration("30").is_err());
        assert!(parse_duration("5d").is_err());
        assert!(parse_duration("ms").is_err());
        assert!(parse_duration("-1s").is_err());
        assert!(parse_duration("1.2.3s").is_err());
    }

    #[test]
    fn test_reload_string_takes_precedence() {
        let config: ViewsConfig = toml::from_str(
            r#"
            reload_interval_secs = 10
            reload = "250ms"
            "#,
        )
        .unwrap();
        assert_eq!(config.reload_interval().unwrap(), Duration::from_millis(250));

        let config = ViewsConfig {
            reload_interval_secs: 10,
            ..Default::default()
        };
        assert_eq!(config.reload_interval().unwrap(), Duration::from_secs(10));

        let config = ViewsConfig {
            reload: Some("0s".into()),
            ..Default::default()
        };
        assert!(config.reload_interval().is_err());

        let config = ViewsConfig {
            reload: Some("soon".into()),
            ..Default::default()
        };
        assert!(matches!(
            config.reload_interval(),
            Err(crate::ViewsError::Config(_))
        ));
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let config = ViewsConfig::load(std::path::Path::new("/nonexistent/dnsviews.toml")).unwrap();
        assert_eq!(config.reload_interval_secs, 30);
    }

    #[test]
    fn test_load_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dnsviews.toml");
        std::fs::write(
            &path,
            "listen = \"127.0.0.1:1053\"\nreload_interval_secs = 5\nclient = \"c.yml\"\n",
        )
        .unwrap();
        let config = ViewsConfig::load(&path).unwrap();
        assert_eq!(config.listen.port(), 1053);
        assert_eq!(config.reload_interval().unwrap(), Duration::from_secs(5));
        assert_eq!(config.client.as_deref(), Some("c.yml"));
    }
}
