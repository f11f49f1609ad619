//! Periodic reload of the view sources.
//!
//! Each cycle fetches both documents, builds a fresh [`ConfigSnapshot`] and
//! publishes it. A failed cycle leaves the previous snapshot in force and is
//! retried on the next tick.

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::acl::RawClientAcl;
use crate::config::ViewsConfig;
use crate::records::RawRecordSet;
use crate::snapshot::{ConfigSnapshot, ResolverState};
use crate::source::{Fetcher, Source};

/// Loads view sources and publishes snapshots into a [`ResolverState`].
#[derive(Debug, Clone)]
pub struct Refresher {
    client: Source,
    record: Source,
    fetcher: Fetcher,
    state: Arc<ResolverState>,
    interval: Duration,
}

impl Refresher {
    pub fn new(
        client: Source,
        record: Source,
        fetcher: Fetcher,
        state: Arc<ResolverState>,
        interval: Duration,
    ) -> Self {
        Self {
            client,
            record,
            fetcher,
            state,
            interval,
        }
    }

    /// Validate `config` and build a refresher for it.
    pub fn from_config(config: &ViewsConfig, state: Arc<ResolverState>) -> crate::Result<Self> {
        Ok(Self::new(
            config.client_source()?,
            config.record_source()?,
            Fetcher::new(config.http_timeout()?)?,
            state,
            config.reload_interval()?,
        ))
    }

    /// Fetch both documents and build a snapshot, without publishing it.
    pub async fn load(&self) -> crate::Result<ConfigSnapshot> {
        let clients: Vec<RawClientAcl> = self.fetcher.fetch(&self.client).await?;
        let records: Vec<RawRecordSet> = self.fetcher.fetch(&self.record).await?;
        Ok(ConfigSnapshot::build(&clients, &records))
    }

    /// Run one load cycle and publish the result.
    ///
    /// On failure the error is logged, returned, and nothing is published.
    pub async fn refresh(&self) -> crate::Result<u64> {
        match self.load().await {
            Ok(snapshot) => {
                let summary = snapshot.summary();
                let generation = self.state.publish(snapshot);
                info!(
                    generation,
                    views = summary.views,
                    record_sets = summary.record_sets,
                    records = summary.records,
                    "published view snapshot"
                );
                Ok(generation)
            }
            Err(e) => {
                error!(
                    client = %self.client,
                    record = %self.record,
                    error = %e,
                    "view refresh failed, keeping previous snapshot"
                );
                Err(e)
            }
        }
    }

    /// Spawn the reload loop.
    ///
    /// The first reload happens one interval from now; the startup load is
    /// the caller's job. The loop ends only when `cancel` fires, including
    /// while a fetch is still in flight.
    pub fn spawn(self, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(
                tokio::time::Instant::now() + self.interval,
                self.interval,
            );
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => break,
                    _ = ticker.tick() => {}
                }
                // Dropping refresh() mid-fetch publishes nothing.
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => break,
                    // Failures are logged inside refresh().
                    _ = self.refresh() => {}
                }
            }

            debug!("view reload loop stopped");
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::RecordKind;
    use std::io::Write;
    use std::net::IpAddr;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const CLIENTS_YAML: &str = "\
- name: internal
  prefixes: [10.0.0.0/8, not-a-prefix]
- name: external
  prefixes: [0.0.0.0/0]
";

    const RECORDS_YAML: &str = "\
- name: internal
  records:
    - {name: host.example.com, ttl: 300, type: A, value: 10.1.2.3}
- name: external
  records:
    - {name: host.example.com, ttl: 300, type: A, value: 203.0.113.9}
";

    fn yaml_file(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    fn refresher(client: Source, record: Source, state: Arc<ResolverState>) -> Refresher {
        Refresher::new(
            client,
            record,
            Fetcher::new(Duration::from_secs(5)).unwrap(),
            state,
            Duration::from_secs(30),
        )
    }

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    #[tokio::test]
    async fn test_refresh_from_yaml() {
        let clients = yaml_file(CLIENTS_YAML);
        let records = yaml_file(RECORDS_YAML);
        let state = Arc::new(ResolverState::new());
        let refresher = refresher(
            Source::Yaml(clients.path().to_path_buf()),
            Source::Yaml(records.path().to_path_buf()),
            Arc::clone(&state),
        );

        assert_eq!(refresher.refresh().await.unwrap(), 1);
        let answer = state.resolve(ip("10.5.5.5"), "host.example.com", RecordKind::A);
        assert_eq!(answer.answer().unwrap().value, "10.1.2.3");
        let answer = state.resolve(ip("198.51.100.1"), "host.example.com", RecordKind::A);
        assert_eq!(answer.answer().unwrap().value, "203.0.113.9");
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_previous_snapshot() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/clients"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"[{"name":"internal","prefixes":["10.0.0.0/8"]}]"#,
            ))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/clients"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{ not json"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/records"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"[{"name":"internal","records":[{"name":"host.example.com","ttl":60,"type":"A","value":"10.1.2.3"}]}]"#,
            ))
            .mount(&server)
            .await;

        let state = Arc::new(ResolverState::new());
        let refresher = refresher(
            Source::parse(&format!("{}/clients", server.uri())).unwrap(),
            Source::parse(&format!("{}/records", server.uri())).unwrap(),
            Arc::clone(&state),
        );

        refresher.refresh().await.unwrap();
        let before = state.current();

        assert!(matches!(
            refresher.refresh().await,
            Err(crate::ViewsError::Json(_))
        ));
        assert_eq!(state.generation(), 1);
        assert_eq!(*state.current(), *before);
        assert!(state
            .resolve(ip("10.1.1.1"), "host.example.com", RecordKind::A)
            .is_answered());
    }

    #[tokio::test]
    async fn test_later_success_replaces_snapshot() {
        let clients = yaml_file(CLIENTS_YAML);
        let records = tempfile::Builder::new().suffix(".yml").tempfile().unwrap();
        std::fs::write(records.path(), "- name: internal\n  records: {broken").unwrap();

        let state = Arc::new(ResolverState::new());
        let refresher = refresher(
            Source::Yaml(clients.path().to_path_buf()),
            Source::Yaml(records.path().to_path_buf()),
            Arc::clone(&state),
        );

        assert!(refresher.refresh().await.is_err());
        assert_eq!(state.generation(), 0);

        std::fs::write(records.path(), RECORDS_YAML).unwrap();
        assert_eq!(refresher.refresh().await.unwrap(), 1);
        assert!(state
            .resolve(ip("10.5.5.5"), "host.example.com", RecordKind::A)
            .is_answered());
    }

    #[tokio::test]
    async fn test_reload_loop_ticks_and_stops() {
        let clients = yaml_file(CLIENTS_YAML);
        let records = yaml_file(RECORDS_YAML);
        let state = Arc::new(ResolverState::new());
        let refresher = Refresher::new(
            Source::Yaml(clients.path().to_path_buf()),
            Source::Yaml(records.path().to_path_buf()),
            Fetcher::new(Duration::from_secs(5)).unwrap(),
            Arc::clone(&state),
            Duration::from_millis(50),
        );

        let cancel = CancellationToken::new();
        let handle = refresher.spawn(cancel.clone());

        tokio::time::timeout(Duration::from_secs(5), async {
            while state.generation() < 2 {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .unwrap();

        cancel.cancel();
        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .unwrap()
            .unwrap();

        // Still servable after the loop is gone.
        assert!(state
            .resolve(ip("10.5.5.5"), "host.example.com", RecordKind::A)
            .is_answered());
    }

    #[tokio::test]
    async fn test_cancel_interrupts_slow_refresh() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/clients"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"[{"name":"internal","prefixes":["10.0.0.0/8"]}]"#)
                    .set_delay(Duration::from_secs(4)),
            )
            .mount(&server)
            .await;
        let records = yaml_file(RECORDS_YAML);

        let state = Arc::new(ResolverState::new());
        let refresher = Refresher::new(
            Source::parse(&format!("{}/clients", server.uri())).unwrap(),
            Source::Yaml(records.path().to_path_buf()),
            Fetcher::new(Duration::from_secs(10)).unwrap(),
            Arc::clone(&state),
            Duration::from_millis(50),
        );

        let cancel = CancellationToken::new();
        let handle = refresher.spawn(cancel.clone());

        // Let the first tick fire and the fetch start.
        tokio::time::sleep(Duration::from_millis(200)).await;
        cancel.cancel();

        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("reload loop kept running after cancellation")
            .unwrap();
        assert_eq!(state.generation(), 0);
    }

    #[test]
    fn test_from_config_validates() {
        let state = Arc::new(ResolverState::new());
        let config = ViewsConfig {
            client: Some("clients.yaml".into()),
            record: Some("records.txt".into()),
            ..Default::default()
        };
        assert!(matches!(
            Refresher::from_config(&config, Arc::clone(&state)),
            Err(crate::ViewsError::Source(_))
        ));

        let config = ViewsConfig {
            client: Some("clients.yaml".into()),
            record: Some("https://views.example.net/records".into()),
            ..Default::default()
        };
        assert!(Refresher::from_config(&config, state).is_ok());
    }
}
