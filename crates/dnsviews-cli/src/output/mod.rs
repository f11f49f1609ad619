//! Output formatting for different formats.

use clap::ValueEnum;
use colored::Colorize;
use dnsviews::snapshot::SnapshotSummary;
use dnsviews::{Answer, ConfigSnapshot, Resolution};
use serde::{Deserialize, Serialize};

/// Available output formats.
#[derive(Debug, Clone, Copy, Default, ValueEnum, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable text with colors
    #[default]
    Pretty,
    /// JSON output
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pretty => write!(f, "pretty"),
            Self::Json => write!(f, "json"),
        }
    }
}

/// Render a loaded snapshot as the `check` report.
pub fn snapshot_report(snapshot: &ConfigSnapshot, format: OutputFormat) -> String {
    let summary = snapshot.summary();
    match format {
        OutputFormat::Json => {
            let views: Vec<serde_json::Value> = snapshot
                .acls()
                .groups()
                .iter()
                .map(|group| {
                    serde_json::json!({
                        "name": group.name(),
                        "networks": group.networks().iter().map(ToString::to_string).collect::<Vec<_>>(),
                        "records": snapshot.record_set(group.name()).map_or(0, |set| set.len()),
                    })
                })
                .collect();
            serde_json::json!({ "summary": summary, "views": views }).to_string()
        }
        OutputFormat::Pretty => {
            let mut out = summary_line(summary);
            for group in snapshot.acls().groups() {
                let networks: Vec<String> =
                    group.networks().iter().map(ToString::to_string).collect();
                let records = snapshot.record_set(group.name()).map_or_else(
                    || "no record set".yellow().to_string(),
                    |set| format!("{} records", set.len()),
                );
                out.push_str(&format!(
                    "\n  {} [{}] {}",
                    group.name().bold(),
                    networks.join(", "),
                    records
                ));
            }
            out
        }
    }
}

fn summary_line(summary: SnapshotSummary) -> String {
    format!(
        "{} views, {} networks, {} record sets, {} records",
        summary.views, summary.networks, summary.record_sets, summary.records
    )
}

/// Render the outcome of a `lookup`.
pub fn resolution_report(resolution: &Resolution, format: OutputFormat) -> String {
    match (resolution, format) {
        (Resolution::Answered(answer), OutputFormat::Json) => answer_json(answer).to_string(),
        (Resolution::NotHandled, OutputFormat::Json) => {
            serde_json::json!({ "handled": false }).to_string()
        }
        (Resolution::Answered(answer), OutputFormat::Pretty) => format!(
            "{}\t{}\tIN\t{}\t{}",
            answer.name,
            answer.ttl,
            answer.kind,
            answer.value.green()
        ),
        (Resolution::NotHandled, OutputFormat::Pretty) => "not handled".dimmed().to_string(),
    }
}

fn answer_json(answer: &Answer) -> serde_json::Value {
    serde_json::json!({
        "handled": true,
        "name": answer.name,
        "ttl": answer.ttl,
        "type": answer.kind.to_string(),
        "value": answer.value,
    })
}
