use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;
use std::path::Path;

use crate::RouterId;
use crate::error::Error;
use crate::interface::Interface;
use crate::network::Network;

fn default_mask() -> Ipv4Addr {
    Ipv4Addr::new(255, 255, 255, 0)
}

fn default_metric() -> u32 {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterfaceSpec {
    pub name: String,
    pub ip: Ipv4Addr,
    #[serde(default = "default_mask")]
    pub mask: Ipv4Addr,
    #[serde(default = "default_metric")]
    pub metric: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouterSpec {
    pub id: RouterId,
    #[serde(default)]
    pub interfaces: Vec<InterfaceSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkSpec {
    pub a: RouterId,
    pub b: RouterId,
    pub interface_a: String,
    pub interface_b: String,
    #[serde(default = "default_metric")]
    pub metric_a: u32,
    #[serde(default = "default_metric")]
    pub metric_b: u32,
}

/// Declarative topology description, loadable from JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopologyConfig {
    pub routers: Vec<RouterSpec>,
    pub links: Vec<LinkSpec>,
}

impl TopologyConfig {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading topology file {}", path.display()))?;
        let config: TopologyConfig = serde_json::from_str(&content)
            .with_context(|| format!("parsing topology file {}", path.display()))?;
        Ok(config)
    }

    /// Builds the network: registers routers, interfaces and links. No LSA
    /// exchange happens here; the caller converges explicitly.
    pub fn build(&self) -> Result<Network, Error> {
        let mut network = Network::new();

        for spec in &self.routers {
            let router = network.add_router(&spec.id)?;
            for iface in &spec.interfaces {
                router.add_interface(Interface::new(
                    &iface.name,
                    iface.ip,
                    iface.mask,
                    iface.metric,
                ))?;
            }
        }

        for link in &self.links {
            network.connect(
                &link.a,
                &link.b,
                &link.interface_a,
                &link.interface_b,
                link.metric_a,
                link.metric_b,
            )?;
        }

        Ok(network)
    }
}

/// The canonical test topology: a 6-router ring with unit metrics plus two
/// shortcut links, R1-R4 at metric 3 and R2-R5 at metric 2. Each router
/// carries one LAN interface, `eth0 192.168.<i>.1/24`.
pub fn demo_topology() -> TopologyConfig {
    let routers = (1..=6)
        .map(|i| RouterSpec {
            id: format!("R{i}"),
            interfaces: vec![InterfaceSpec {
                name: "eth0".to_string(),
                ip: format!("192.168.{i}.1").parse().unwrap(),
                mask: default_mask(),
                metric: 1,
            }],
        })
        .collect();

    let ring = [
        ("R1", "R2", "eth1", "eth1", 1, 1),
        ("R2", "R3", "eth2", "eth1", 1, 1),
        ("R3", "R4", "eth2", "eth1", 1, 1),
        ("R4", "R5", "eth2", "eth1", 1, 1),
        ("R5", "R6", "eth2", "eth1", 1, 1),
        ("R6", "R1", "eth2", "eth2", 1, 1),
        // Shortcuts for alternative routes.
        ("R1", "R4", "eth3", "eth3", 3, 3),
        ("R2", "R5", "eth3", "eth3", 2, 2),
    ];

    let links = ring
        .into_iter()
        .map(|(a, b, interface_a, interface_b, metric_a, metric_b)| LinkSpec {
            a: a.to_string(),
            b: b.to_string(),
            interface_a: interface_a.to_string(),
            interface_b: interface_b.to_string(),
            metric_a,
            metric_b,
        })
        .collect();

    TopologyConfig { routers, links }
}
