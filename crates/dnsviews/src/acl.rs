//! Client groups: which view a client address belongs to.
//!
//! Groups are evaluated in declaration order and the first group containing
//! the address wins. There is no longest-prefix match across groups, so an
//! operator puts narrow groups before catch-alls.

use ipnet::IpNet;
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use tracing::warn;

use crate::source::null_as_default;

/// One entry of the client-group document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawClientAcl {
    /// View name, matched against record-set names.
    pub name: String,
    /// CIDR prefixes, e.g. `10.0.0.0/8` or `2001:db8::/32`.
    #[serde(default, deserialize_with = "null_as_default")]
    pub prefixes: Vec<String>,
}

/// A named group of client networks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientAcl {
    name: String,
    networks: Vec<IpNet>,
}

impl ClientAcl {
    /// Build a group, dropping prefixes that do not parse.
    pub fn from_raw(raw: &RawClientAcl) -> Self {
        let networks = raw
            .prefixes
            .iter()
            .filter_map(|prefix| match prefix.trim().parse::<IpNet>() {
                Ok(net) => Some(net.trunc()),
                Err(e) => {
                    warn!(view = %raw.name, prefix = %prefix, error = %e, "invalid CIDR prefix, skipping");
                    None
                }
            })
            .collect();

        Self {
            name: raw.name.clone(),
            networks,
        }
    }

    /// View name of this group.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Networks that survived parsing.
    pub fn networks(&self) -> &[IpNet] {
        &self.networks
    }

    /// Whether `addr` falls inside any of this group's networks.
    pub fn contains(&self, addr: &IpAddr) -> bool {
        self.networks.iter().any(|net| net.contains(addr))
    }
}

/// Ordered list of client groups.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientAcls {
    groups: Vec<ClientAcl>,
}

impl ClientAcls {
    /// Build all groups from the raw document, preserving order.
    pub fn from_raw(raw: &[RawClientAcl]) -> Self {
        Self {
            groups: raw.iter().map(ClientAcl::from_raw).collect(),
        }
    }

    /// Name of the first group containing `client`.
    ///
    /// IPv4-mapped IPv6 addresses (as seen on dual-stack sockets) are
    /// matched as the IPv4 address they carry.
    pub fn matching(&self, client: IpAddr) -> Option<&str> {
        let client = client.to_canonical();
        self.groups
            .iter()
            .find(|group| group.contains(&client))
            .map(ClientAcl::name)
    }

    /// Groups in declaration order.
    pub fn groups(&self) -> &[ClientAcl] {
        &self.groups
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}
