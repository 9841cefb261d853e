use log::{info, warn};
use std::collections::{BTreeMap, VecDeque};

use crate::RouterId;
use crate::error::Error;
use crate::packet::Packet;
use crate::router::{Adjacency, ForwardDecision, Router};

/// Terminal outcome of a data send. Expiry and missing routes are normal
/// outcomes in a partially-connected or mid-convergence topology, not
/// errors.
#[derive(Debug, Clone, PartialEq)]
pub enum Delivery {
    Delivered {
        /// Every hop visited, in order, including both endpoints.
        path: Vec<RouterId>,
        payload: serde_json::Value,
    },
    Expired {
        at: RouterId,
    },
    NoRoute {
        at: RouterId,
    },
}

/// One unit of work for the dispatch queue: which router handles the
/// packet next, and the egress interface it arrived over (diagnostics
/// only).
struct Hop {
    target: RouterId,
    ingress: Option<String>,
    packet: Packet,
}

/// Topology container and fault-injection harness. The Network is the
/// sole owner of every Router; routers reach each other only through the
/// dispatch queue here, addressed by id.
#[derive(Debug, Default)]
pub struct Network {
    routers: BTreeMap<RouterId, Router>,
}

impl Network {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates and registers a router. Ids must be unique.
    pub fn add_router(&mut self, id: &str) -> Result<&mut Router, Error> {
        if self.routers.contains_key(id) {
            return Err(Error::RouterExists(id.to_string()));
        }
        Ok(self
            .routers
            .entry(id.to_string())
            .or_insert_with(|| Router::new(id)))
    }

    pub fn router(&self, id: &str) -> Option<&Router> {
        self.routers.get(id)
    }

    pub fn router_mut(&mut self, id: &str) -> Option<&mut Router> {
        self.routers.get_mut(id)
    }

    pub fn router_ids(&self) -> impl Iterator<Item = &RouterId> {
        self.routers.keys()
    }

    /// Wires two routers together, one adjacency record per side with its
    /// own interface name and metric. Reconnecting overwrites the prior
    /// records.
    pub fn connect(
        &mut self,
        a: &str,
        b: &str,
        interface_a: &str,
        interface_b: &str,
        metric_a: u32,
        metric_b: u32,
    ) -> Result<(), Error> {
        if a == b {
            return Err(Error::LinkToSelf(a.to_string()));
        }
        self.ensure_exists(a)?;
        self.ensure_exists(b)?;

        if let Some(router) = self.routers.get_mut(a) {
            router.set_adjacency(b, Adjacency::new(interface_a, metric_a));
        }
        if let Some(router) = self.routers.get_mut(b) {
            router.set_adjacency(a, Adjacency::new(interface_b, metric_b));
        }

        info!("Connected {a} ({interface_a}) to {b} ({interface_b})");
        Ok(())
    }

    /// Has every router advertise its current adjacency list, then drains
    /// the resulting flood. The order routers originate in does not affect
    /// the converged state; sequence-number dedup bounds the flood.
    pub fn update_all_link_states(&mut self) {
        let mut queue = VecDeque::new();
        for router in self.routers.values_mut() {
            for packet in router.originate_lsa() {
                let target = packet.destination.clone();
                queue.push_back(Hop {
                    target,
                    ingress: None,
                    packet,
                });
            }
        }
        self.dispatch(queue);
    }

    /// Tears down the link between two routers. Removing a link that does
    /// not exist is a no-op; the re-origination still runs so state stays
    /// consistent.
    pub fn simulate_link_failure(&mut self, a: &str, b: &str) -> Result<(), Error> {
        self.ensure_exists(a)?;
        self.ensure_exists(b)?;

        if let Some(router) = self.routers.get_mut(a) {
            router.remove_adjacency(b);
        }
        if let Some(router) = self.routers.get_mut(b) {
            router.remove_adjacency(a);
        }

        info!("Link between {a} and {b} failed");
        self.update_all_link_states();
        Ok(())
    }

    /// Re-establishes a link and propagates the change.
    pub fn simulate_link_recovery(
        &mut self,
        a: &str,
        b: &str,
        interface_a: &str,
        interface_b: &str,
        metric_a: u32,
        metric_b: u32,
    ) -> Result<(), Error> {
        self.connect(a, b, interface_a, interface_b, metric_a, metric_b)?;
        info!("Link between {a} and {b} recovered");
        self.update_all_link_states();
        Ok(())
    }

    /// Originates a data packet at `source` and runs it to a terminal
    /// outcome. The destination does not have to exist; an unknown or
    /// unreachable destination comes back as [`Delivery::NoRoute`].
    pub fn send(
        &mut self,
        source: &str,
        destination: &str,
        payload: serde_json::Value,
    ) -> Result<Delivery, Error> {
        self.ensure_exists(source)?;

        let packet = Packet::data(source, destination, payload);
        let outcome = self.dispatch(VecDeque::from([Hop {
            target: source.to_string(),
            ingress: None,
            packet,
        }]));

        outcome.ok_or(Error::Internal("data packet reached no terminal decision"))
    }

    /// The central message pump. Each queue item is handed to its target
    /// router; forwards and re-floods go back on the queue. Returns the
    /// first terminal decision, which for a data send is the seeded
    /// packet's outcome (LSA floods produce none).
    fn dispatch(&mut self, mut queue: VecDeque<Hop>) -> Option<Delivery> {
        let mut outcome = None;

        while let Some(Hop {
            target,
            ingress,
            mut packet,
        }) = queue.pop_front()
        {
            let Some(router) = self.routers.get_mut(&target) else {
                warn!("dropping {packet}: no router {target}");
                continue;
            };

            match router.process(&mut packet, ingress.as_deref()) {
                ForwardDecision::Deliver => {
                    let path = packet.path.clone();
                    let payload = packet.into_payload().unwrap_or(serde_json::Value::Null);
                    outcome.get_or_insert(Delivery::Delivered { path, payload });
                }
                ForwardDecision::Expired => {
                    outcome.get_or_insert(Delivery::Expired { at: target });
                }
                ForwardDecision::NoRoute => {
                    outcome.get_or_insert(Delivery::NoRoute { at: target });
                }
                ForwardDecision::Forward { next_hop, egress } => {
                    queue.push_back(Hop {
                        target: next_hop,
                        ingress: Some(egress),
                        packet,
                    });
                }
                ForwardDecision::Flood(refloods) => {
                    queue.extend(refloods.into_iter().map(|packet| Hop {
                        target: packet.destination.clone(),
                        ingress: None,
                        packet,
                    }));
                }
            }
        }

        outcome
    }

    fn ensure_exists(&self, id: &str) -> Result<(), Error> {
        if self.routers.contains_key(id) {
            Ok(())
        } else {
            Err(Error::NoSuchRouter(id.to_string()))
        }
    }
}
