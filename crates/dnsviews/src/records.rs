//! Record sets served per view, and DNS name normalization.
//!
//! A record set holds exactly one entry per normalized name. When the source
//! document repeats a name, the later entry replaces the earlier one.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::str::FromStr;
use tracing::{debug, warn};

use crate::source::null_as_default;

/// Canonical form of a DNS name: lower-case, fully qualified.
///
/// `"WWW.Example.com"`, `"www.example.com."` and `"www.example.com.."` all
/// normalize to `"www.example.com."`. The empty name is the root, `"."`.
pub fn normalize(name: &str) -> String {
    let trimmed = name.trim().trim_end_matches('.');
    let mut normalized = trimmed.to_ascii_lowercase();
    normalized.push('.');
    normalized
}

/// Record types a view can serve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    A,
    Aaaa,
    Cname,
    Txt,
    /// Anything else found in the source. Stored, never answered.
    Unknown,
}

impl FromStr for RecordKind {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_uppercase().as_str() {
            "A" => Self::A,
            "AAAA" => Self::Aaaa,
            "CNAME" => Self::Cname,
            "TXT" => Self::Txt,
            _ => Self::Unknown,
        })
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::A => write!(f, "A"),
            Self::Aaaa => write!(f, "AAAA"),
            Self::Cname => write!(f, "CNAME"),
            Self::Txt => write!(f, "TXT"),
            Self::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// One entry of the record-set document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRecordSet {
    /// View name, matched against client-group names.
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub records: Vec<RawRecord>,
}

/// A single record as written by the operator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRecord {
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub ttl: u32,
    #[serde(rename = "type")]
    pub record_type: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub value: String,
}

/// A normalized record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordEntry {
    pub name: String,
    pub ttl: u32,
    pub kind: RecordKind,
    /// Host names (CNAME targets) are normalized; other values are verbatim.
    pub value: String,
}

impl RecordEntry {
    /// Normalize a raw record, warning about values that cannot be served.
    pub fn from_raw(view: &str, raw: &RawRecord) -> Self {
        let name = normalize(&raw.name);
        let kind = raw
            .record_type
            .parse::<RecordKind>()
            .unwrap_or(RecordKind::Unknown);

        let value = match kind {
            RecordKind::Cname => normalize(&raw.value),
            _ => raw.value.trim().to_string(),
        };

        match kind {
            RecordKind::Unknown => {
                warn!(view = %view, name = %name, record_type = %raw.record_type, "unsupported record type, entry will not be served");
            }
            RecordKind::A if value.parse::<Ipv4Addr>().is_err() => {
                warn!(view = %view, name = %name, value = %value, "A record value is not an IPv4 address");
            }
            RecordKind::Aaaa if value.parse::<Ipv6Addr>().is_err() => {
                warn!(view = %view, name = %name, value = %value, "AAAA record value is not an IPv6 address");
            }
            _ => {}
        }

        Self {
            name,
            ttl: raw.ttl,
            kind,
            value,
        }
    }
}

/// All records served to one view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordSet {
    name: String,
    entries: HashMap<String, RecordEntry>,
    order: Vec<String>,
}

impl RecordSet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Build a record set from its raw form.
    pub fn from_raw(raw: &RawRecordSet) -> Self {
        let mut set = Self::new(raw.name.clone());
        for record in &raw.records {
            set.insert(RecordEntry::from_raw(&raw.name, record));
        }
        set
    }

    /// Insert an entry, replacing any entry with the same name.
    pub fn insert(&mut self, entry: RecordEntry) {
        let name = entry.name.clone();
        if let Some(previous) = self.entries.insert(name.clone(), entry) {
            debug!(view = %self.name, name = %name, replaced = %previous.kind, "record overwritten by later entry");
        } else {
            self.order.push(name);
        }
    }

    /// Look up by name; the name is normalized first.
    pub fn get(&self, name: &str) -> Option<&RecordEntry> {
        self.entries.get(&normalize(name))
    }

    /// Entries in the order their names first appeared.
    pub fn iter(&self) -> impl Iterator<Item = &RecordEntry> {
        self.order.iter().filter_map(|name| self.entries.get(name))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
