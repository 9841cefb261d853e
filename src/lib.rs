pub mod algorithms;
pub mod config;
pub mod error;
pub mod interface;
pub mod network;
pub mod packet;
pub mod router;
pub mod routing_table;

/// Stable router identity, unique within one Network.
pub type RouterId = String;

pub use error::Error;
pub use interface::Interface;
pub use network::{Delivery, Network};
pub use packet::{DEFAULT_TTL, Lsa, Packet, PacketKind};
pub use router::{Adjacency, ForwardDecision, Router};
pub use routing_table::{Destination, NextHop, RoutingEntry, RoutingTable};
