use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Write as _;

use crate::RouterId;
use crate::algorithms::dijkstra;
use crate::error::Error;
use crate::interface::Interface;
use crate::packet::{Lsa, Packet, PacketKind};
use crate::routing_table::{Destination, NextHop, RoutingEntry, RoutingTable};

/// One side of a bidirectional link: the local egress interface and the
/// metric this router advertises for the link. The other side keeps its
/// own record, possibly with a different metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Adjacency {
    pub interface: String,
    pub metric: u32,
}

impl Adjacency {
    pub fn new(interface: &str, metric: u32) -> Self {
        Self {
            interface: interface.to_string(),
            metric,
        }
    }
}

/// Per-hop outcome of [`Router::process`]. The dispatch loop in
/// [`crate::network::Network`] turns these into packet movement.
#[derive(Debug, PartialEq)]
pub enum ForwardDecision {
    /// The packet reached its destination; payload and path are in the packet.
    Deliver,
    /// Hand the packet to the next hop over the given egress interface.
    Forward { next_hop: RouterId, egress: String },
    /// An LSA was consumed; these re-flood packets go out next.
    Flood(Vec<Packet>),
    /// TTL ran out short of the destination.
    Expired,
    /// No usable route; the packet is dropped.
    NoRoute,
}

/// The protocol state machine: interfaces, adjacencies, link-state
/// database and the routing table computed from it.
///
/// Routers never hold references to each other. Adjacencies record only
/// the neighbor's id; resolving an id to a router is the Network's job.
#[derive(Debug)]
pub struct Router {
    id: RouterId,
    interfaces: HashMap<String, Interface>,
    connections: HashMap<RouterId, Adjacency>,
    lsdb: HashMap<RouterId, HashMap<RouterId, u32>>,
    /// Last accepted sequence number per originator; absent means nothing
    /// seen yet, so any first LSA is accepted.
    last_seen: HashMap<RouterId, u64>,
    sequence: u64,
    routing_table: RoutingTable,
}

impl Router {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            interfaces: HashMap::new(),
            connections: HashMap::new(),
            lsdb: HashMap::new(),
            last_seen: HashMap::new(),
            sequence: 0,
            routing_table: RoutingTable::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn interfaces(&self) -> &HashMap<String, Interface> {
        &self.interfaces
    }

    pub fn connections(&self) -> &HashMap<RouterId, Adjacency> {
        &self.connections
    }

    pub fn routing_table(&self) -> &RoutingTable {
        &self.routing_table
    }

    pub fn lsdb(&self) -> &HashMap<RouterId, HashMap<RouterId, u32>> {
        &self.lsdb
    }

    /// Registers an interface and seeds the connected route at metric 0.
    pub fn add_interface(&mut self, interface: Interface) -> Result<(), Error> {
        if self.interfaces.contains_key(&interface.name) {
            return Err(Error::InterfaceExists(interface.name));
        }

        let network = interface.network()?;
        self.routing_table.add_route(RoutingEntry {
            destination: Destination::Network(network),
            next_hop: NextHop::Connected,
            interface: interface.name.clone(),
            metric: 0,
        });
        self.interfaces.insert(interface.name.clone(), interface);
        Ok(())
    }

    /// Records this side of a link. Re-recording an existing neighbor
    /// overwrites the prior entry.
    pub fn set_adjacency(&mut self, neighbor: &str, adjacency: Adjacency) {
        self.connections.insert(neighbor.to_string(), adjacency);
    }

    /// Drops this side of a link; absent neighbors are a no-op. The LSDB
    /// is untouched — the removal propagates through the next LSA
    /// origination.
    pub fn remove_adjacency(&mut self, neighbor: &str) -> bool {
        self.connections.remove(neighbor).is_some()
    }

    fn neighbor_ids(&self) -> Vec<RouterId> {
        let mut ids: Vec<RouterId> = self.connections.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Advertises the current adjacency list: bumps the sequence counter,
    /// refreshes the own LSDB entry and routing table, and returns one LSA
    /// packet per neighbor. Recording the own sequence as last-seen makes
    /// echoed copies of this LSA stale on arrival.
    pub fn originate_lsa(&mut self) -> Vec<Packet> {
        self.sequence += 1;
        let neighbors: HashMap<RouterId, u32> = self
            .connections
            .iter()
            .map(|(id, adjacency)| (id.clone(), adjacency.metric))
            .collect();

        self.lsdb.insert(self.id.clone(), neighbors.clone());
        self.last_seen.insert(self.id.clone(), self.sequence);
        self.recompute_routes();

        debug!("{}: originating LSA seq {}", self.id, self.sequence);
        let lsa = Lsa {
            router_id: self.id.clone(),
            sequence: self.sequence,
            neighbors,
        };

        self.neighbor_ids()
            .into_iter()
            .map(|neighbor| Packet::lsa(&self.id, &neighbor, lsa.clone()))
            .collect()
    }

    /// Accepts an LSA if its sequence number is strictly newer than the
    /// last accepted one for that originator, then recomputes the table
    /// and returns re-floods for every neighbor except the sender (split
    /// horizon). Stale LSAs are dropped silently.
    pub fn receive_lsa(&mut self, lsa: &Lsa, arrived_from: &str) -> Vec<Packet> {
        let fresh = self
            .last_seen
            .get(&lsa.router_id)
            .map_or(true, |&seen| lsa.sequence > seen);

        if !fresh {
            debug!(
                "{}: dropping stale LSA from {} (seq {})",
                self.id, lsa.router_id, lsa.sequence
            );
            return Vec::new();
        }

        debug!(
            "{}: accepted LSA from {} (seq {})",
            self.id, lsa.router_id, lsa.sequence
        );
        self.lsdb.insert(lsa.router_id.clone(), lsa.neighbors.clone());
        self.last_seen.insert(lsa.router_id.clone(), lsa.sequence);
        self.recompute_routes();

        self.neighbor_ids()
            .into_iter()
            .filter(|neighbor| neighbor != arrived_from)
            .map(|neighbor| Packet::lsa(&self.id, &neighbor, lsa.clone()))
            .collect()
    }

    /// Rebuilds the routing table: connected seeds stay, everything else
    /// comes fresh out of Dijkstra over the LSDB. Recomputed entries are
    /// appended in destination-id order so equal topologies produce equal
    /// tables.
    pub fn recompute_routes(&mut self) {
        self.routing_table.retain_connected();

        let mut paths: Vec<_> = dijkstra::shortest_paths(&self.lsdb, &self.id)
            .into_iter()
            .collect();
        paths.sort_by(|a, b| a.0.cmp(&b.0));

        for (destination, path) in paths {
            let Some(adjacency) = self.connections.get(&path.first_hop) else {
                debug_assert!(
                    false,
                    "{}: first hop {} toward {} is not adjacent",
                    self.id, path.first_hop, destination
                );
                continue;
            };

            self.routing_table.add_route(RoutingEntry {
                destination: Destination::Router(destination),
                next_hop: NextHop::Router(path.first_hop.clone()),
                interface: adjacency.interface.clone(),
                metric: path.distance,
            });
        }
    }

    /// Resolves a destination router: direct neighbors short-circuit the
    /// routing table.
    pub fn find_route(&self, destination: &str) -> Option<RoutingEntry> {
        if let Some(adjacency) = self.connections.get(destination) {
            return Some(RoutingEntry {
                destination: Destination::Router(destination.to_string()),
                next_hop: NextHop::Router(destination.to_string()),
                interface: adjacency.interface.clone(),
                metric: adjacency.metric,
            });
        }
        self.routing_table.route_to_router(destination).cloned()
    }

    /// One hop of packet handling. Delivery is checked after the TTL
    /// decrement but before the expiry short-circuit, so a packet whose
    /// TTL reaches exactly 0 at its destination is still delivered.
    pub fn process(&mut self, packet: &mut Packet, incoming: Option<&str>) -> ForwardDecision {
        packet.ttl = packet.ttl.saturating_sub(1);
        packet.record_hop(&self.id);
        debug!(
            "{}: processing {} (ingress {})",
            self.id,
            packet,
            incoming.unwrap_or("local")
        );

        if let PacketKind::Lsa(lsa) = &packet.kind {
            let lsa = lsa.clone();
            let arrived_from = packet.source.clone();
            return ForwardDecision::Flood(self.receive_lsa(&lsa, &arrived_from));
        }

        if packet.destination == self.id {
            info!(
                "{}: packet delivered, path {}",
                self.id,
                packet.path.join(" -> ")
            );
            return ForwardDecision::Deliver;
        }

        if packet.ttl == 0 {
            info!("{}: packet TTL expired", self.id);
            return ForwardDecision::Expired;
        }

        match self.find_route(&packet.destination) {
            Some(RoutingEntry {
                next_hop: NextHop::Router(next_hop),
                interface,
                ..
            }) => {
                info!("{}: forwarding to {} via {}", self.id, next_hop, interface);
                ForwardDecision::Forward {
                    next_hop,
                    egress: interface,
                }
            }
            _ => {
                info!("{}: no route to {}", self.id, packet.destination);
                ForwardDecision::NoRoute
            }
        }
    }

    /// Fixed-width routing table dump, entries in insertion order.
    pub fn format_routing_table(&self) -> String {
        let mut output = String::new();
        writeln!(output, "--- Routing Table for {} ---", self.id).unwrap();
        writeln!(
            output,
            "{:<20} {:<20} {:<12} {:<8}",
            "Destination", "Next Hop", "Interface", "Metric"
        )
        .unwrap();
        writeln!(output, "{}", "-".repeat(62)).unwrap();

        if self.routing_table.is_empty() {
            writeln!(output, "No routes found").unwrap();
        }
        for entry in self.routing_table.iter() {
            writeln!(
                output,
                "{:<20} {:<20} {:<12} {:<8}",
                entry.destination, entry.next_hop, entry.interface, entry.metric
            )
            .unwrap();
        }

        output
    }
}
