use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::RouterId;

/// Hop budget given to every freshly originated packet.
pub const DEFAULT_TTL: u8 = 64;

/// Link State Advertisement: one router's view of its direct neighbors,
/// tagged with a sequence number for freshness.
///
/// The sequence number travels next to the neighbor map instead of being
/// folded into it, so a router id can never collide with bookkeeping keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lsa {
    pub router_id: RouterId,
    pub sequence: u64,
    pub neighbors: HashMap<RouterId, u32>,
}

/// What a packet carries. The payload rides inside the kind, so a DATA
/// packet always has an opaque payload and an LSA packet always has an LSA.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PacketKind {
    Data(serde_json::Value),
    Lsa(Lsa),
}

impl PacketKind {
    fn label(&self) -> &'static str {
        match self {
            PacketKind::Data(_) => "DATA",
            PacketKind::Lsa(_) => "LSA",
        }
    }
}

/// Message envelope moved between routers, one hop at a time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Packet {
    pub source: RouterId,
    pub destination: RouterId,
    pub kind: PacketKind,
    pub ttl: u8,
    pub path: Vec<RouterId>,
}

impl Packet {
    pub fn data(source: &str, destination: &str, payload: serde_json::Value) -> Self {
        Self {
            source: source.to_string(),
            destination: destination.to_string(),
            kind: PacketKind::Data(payload),
            ttl: DEFAULT_TTL,
            path: vec![source.to_string()],
        }
    }

    pub fn lsa(source: &str, destination: &str, lsa: Lsa) -> Self {
        Self {
            source: source.to_string(),
            destination: destination.to_string(),
            kind: PacketKind::Lsa(lsa),
            ttl: DEFAULT_TTL,
            path: Vec::new(),
        }
    }

    /// Appends a hop to the traversed path unless it is already the last
    /// entry, so re-processing at the same router cannot corrupt the path.
    pub fn record_hop(&mut self, id: &str) {
        if self.path.last().map(String::as_str) != Some(id) {
            self.path.push(id.to_string());
        }
    }

    /// Consumes the packet and hands back the data payload, if any.
    pub fn into_payload(self) -> Option<serde_json::Value> {
        match self.kind {
            PacketKind::Data(payload) => Some(payload),
            PacketKind::Lsa(_) => None,
        }
    }
}

impl fmt::Display for Packet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Packet({} -> {}, kind={}, ttl={})",
            self.source,
            self.destination,
            self.kind.label(),
            self.ttl
        )
    }
}
