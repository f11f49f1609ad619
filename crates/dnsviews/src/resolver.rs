//! Query resolution: the per-query hot path.
//!
//! Resolution never fails. Either the views have an answer, or the query is
//! [`Resolution::NotHandled`] and the surrounding chain should try elsewhere.
//! The caller cannot tell why a query was declined.

use std::net::IpAddr;
use tracing::trace;

use crate::records::{normalize, RecordKind};
use crate::snapshot::{ConfigSnapshot, ResolverState};

/// An answer ready to be rendered by the transport layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    /// Normalized owner name.
    pub name: String,
    pub ttl: u32,
    pub kind: RecordKind,
    pub value: String,
}

/// Outcome of resolving one query against the views.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Answered(Answer),
    NotHandled,
}

impl Resolution {
    pub const fn is_answered(&self) -> bool {
        matches!(self, Self::Answered(_))
    }

    pub fn answer(&self) -> Option<&Answer> {
        match self {
            Self::Answered(answer) => Some(answer),
            Self::NotHandled => None,
        }
    }
}

impl ConfigSnapshot {
    /// Resolve a query against this snapshot.
    pub fn resolve(&self, client: IpAddr, name: &str, kind: RecordKind) -> Resolution {
        let Some(view) = self.acls.matching(client) else {
            trace!(client = %client, "no view matches client");
            return Resolution::NotHandled;
        };

        let Some(records) = self.record_sets.get(view) else {
            trace!(client = %client, view = %view, "view has no record set");
            return Resolution::NotHandled;
        };

        let name = normalize(name);
        let Some(entry) = records.get(&name) else {
            trace!(view = %view, name = %name, "name not in view");
            return Resolution::NotHandled;
        };

        if entry.kind == RecordKind::Unknown || entry.kind != kind {
            trace!(view = %view, name = %name, want = %kind, have = %entry.kind, "record type mismatch");
            return Resolution::NotHandled;
        }

        Resolution::Answered(Answer {
            name: entry.name.clone(),
            ttl: entry.ttl,
            kind: entry.kind,
            value: entry.value.clone(),
        })
    }
}

impl ResolverState {
    /// Resolve a query against the currently published snapshot.
    pub fn resolve(&self, client: IpAddr, name: &str, kind: RecordKind) -> Resolution {
        self.current().resolve(client, name, kind)
    }
}
