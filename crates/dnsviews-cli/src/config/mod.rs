//! Configuration management.

use anyhow::Result;
use directories::ProjectDirs;
use dnsviews::ViewsConfig;
use std::path::PathBuf;

use crate::cli::args::Cli;

/// Default config file path (`<config dir>/dnsviews/config.toml`).
pub fn default_path() -> Option<PathBuf> {
    ProjectDirs::from("org", "dnsviews", "dnsviews")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Load the config file and apply command-line overrides.
///
/// An explicitly named file that does not exist is an error; a missing
/// default file just means defaults.
pub fn load(cli: &Cli) -> Result<ViewsConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            if !path.exists() {
                anyhow::bail!("config file not found: {}", path.display());
            }
            ViewsConfig::load(path)?
        }
        None => match default_path() {
            Some(path) => ViewsConfig::load(&path)?,
            None => ViewsConfig::default(),
        },
    };

    apply_overrides(&mut config, cli);
    Ok(config)
}

fn apply_overrides(config: &mut ViewsConfig, cli: &Cli) {
    if let Some(client) = &cli.client {
        config.client = Some(client.clone());
    }
    if let Some(record) = &cli.record {
        config.record = Some(record.clone());
    }
    if let Some(reload) = &cli.reload {
        config.reload = Some(reload.clone());
    }
    if let Some(secs) = cli.http_timeout_secs {
        config.http_timeout_secs = secs;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_flags_override_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "client = \"file-clients.yaml\"\nrecord = \"file-records.yaml\"\nreload_interval_secs = 90\n",
        )
        .unwrap();

        let cli = Cli::try_parse_from([
            "dnsviews",
            "--config",
            path.to_str().unwrap(),
            "--client",
            "https://views.example.net/clients",
            "check",
        ])
        .unwrap();

        let config = load(&cli).unwrap();
        assert_eq!(config.client.as_deref(), Some("https://views.example.net/clients"));
        assert_eq!(config.record.as_deref(), Some("file-records.yaml"));
        assert_eq!(config.reload_interval_secs, 90);
    }

    #[test]
    fn test_reload_flag_overrides_seconds() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "reload_interval_secs = 90\n").unwrap();

        let cli = Cli::try_parse_from([
            "dnsviews",
            "--config",
            path.to_str().unwrap(),
            "--reload",
            "500ms",
            "check",
        ])
        .unwrap();

        let config = load(&cli).unwrap();
        assert_eq!(
            config.reload_interval().unwrap(),
            std::time::Duration::from_millis(500)
        );
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let cli = Cli::try_parse_from([
            "dnsviews",
            "--config",
            "/nonexistent/dnsviews.toml",
            "check",
        ])
        .unwrap();
        assert!(load(&cli).is_err());
    }
}
