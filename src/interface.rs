use ipnet::Ipv4Net;
use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;

use crate::error::Error;

/// A router-local interface. The connected network prefix is derived from
/// the address and mask and seeded into the routing table at metric 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interface {
    pub name: String,
    pub ip: Ipv4Addr,
    pub mask: Ipv4Addr,
    pub metric: u32,
}

impl Interface {
    pub fn new(name: &str, ip: Ipv4Addr, mask: Ipv4Addr, metric: u32) -> Self {
        Self {
            name: name.to_string(),
            ip,
            mask,
            metric,
        }
    }

    /// Directly-connected network prefix (address AND mask).
    pub fn network(&self) -> Result<Ipv4Net, Error> {
        Ipv4Net::with_netmask(self.ip, self.mask)
            .map(|net| net.trunc())
            .map_err(|_| Error::InvalidNetmask(self.mask))
    }
}
