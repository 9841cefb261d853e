use ipnet::Ipv4Net;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::RouterId;

/// Routing table key: either a remote router or a directly-connected
/// network prefix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Destination {
    Router(RouterId),
    Network(Ipv4Net),
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Destination::Router(id) => write!(f, "{id}"),
            Destination::Network(net) => write!(f, "{net}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NextHop {
    /// Reachable over a local interface, no gateway involved.
    Connected,
    Router(RouterId),
}

impl fmt::Display for NextHop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NextHop::Connected => write!(f, "directly connected"),
            NextHop::Router(id) => write!(f, "{id}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingEntry {
    pub destination: Destination,
    pub next_hop: NextHop,
    pub interface: String,
    pub metric: u32,
}

/// Insertion-ordered routing table. Unreachable destinations are simply
/// absent; there is no infinite-metric sentinel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoutingTable {
    entries: Vec<RoutingEntry>,
}

impl RoutingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a route, replacing any existing entry for the same
    /// destination in place so the dump order stays stable.
    pub fn add_route(&mut self, entry: RoutingEntry) {
        match self
            .entries
            .iter_mut()
            .find(|existing| existing.destination == entry.destination)
        {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
    }

    pub fn get_route(&self, destination: &Destination) -> Option<&RoutingEntry> {
        self.entries
            .iter()
            .find(|entry| entry.destination == *destination)
    }

    pub fn route_to_router(&self, id: &str) -> Option<&RoutingEntry> {
        self.entries
            .iter()
            .find(|entry| matches!(&entry.destination, Destination::Router(dest) if dest == id))
    }

    /// Drops every computed route, keeping the directly-connected seeds.
    pub fn retain_connected(&mut self) {
        self.entries
            .retain(|entry| entry.next_hop == NextHop::Connected);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RoutingEntry> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(dest: Destination, next_hop: NextHop, metric: u32) -> RoutingEntry {
        RoutingEntry {
            destination: dest,
            next_hop,
            interface: "eth0".to_string(),
            metric,
        }
    }

    #[test]
    fn add_route_replaces_in_place() {
        let mut table = RoutingTable::new();
        table.add_route(entry(
            Destination::Router("R2".into()),
            NextHop::Router("R2".into()),
            1,
        ));
        table.add_route(entry(
            Destination::Router("R3".into()),
            NextHop::Router("R2".into()),
            2,
        ));
        table.add_route(entry(
            Destination::Router("R2".into()),
            NextHop::Router("R6".into()),
            4,
        ));

        assert_eq!(table.len(), 2);
        let first = table.iter().next().unwrap();
        assert_eq!(first.destination, Destination::Router("R2".into()));
        assert_eq!(first.next_hop, NextHop::Router("R6".into()));
    }

    #[test]
    fn retain_connected_keeps_seeds_only() {
        let mut table = RoutingTable::new();
        let net: Ipv4Net = "10.0.0.0/24".parse().unwrap();
        table.add_route(entry(Destination::Network(net), NextHop::Connected, 0));
        table.add_route(entry(
            Destination::Router("R2".into()),
            NextHop::Router("R2".into()),
            1,
        ));

        table.retain_connected();
        assert_eq!(table.len(), 1);
        assert_eq!(
            table.get_route(&Destination::Network(net)).unwrap().metric,
            0
        );
        assert!(table.route_to_router("R2").is_none());
    }
}
