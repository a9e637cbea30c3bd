use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// An addressable transmit/receive endpoint on the traffic generator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Port {
    pub name: String,
    pub location: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EthernetHeader {
    pub src: String,
    pub dst: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ipv4Header {
    pub src: String,
    pub dst: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UdpHeader {
    pub src_port: u16,
    pub dst_port: u16,
}

/// Packet shape for one flow: Ethernet and IPv4 always, UDP optionally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PacketDescriptor {
    pub ethernet: EthernetHeader,
    pub ipv4: Ipv4Header,
    #[serde(default)]
    pub udp: Option<UdpHeader>,
}

/// A unidirectional traffic stream between two ports: fixed packet count,
/// fixed frame size, defined packet shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Flow {
    pub name: String,
    pub tx_port: String,
    pub rx_port: String,
    pub packet: PacketDescriptor,
    pub packets: u64,
    pub size: u32,
    #[serde(default = "default_true")]
    pub metrics_enabled: bool,
}

fn default_true() -> bool {
    true
}

/// Declarative test topology, constructed once and validated before it is
/// pushed to the controller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Topology {
    pub ports: Vec<Port>,
    pub flows: Vec<Flow>,
}

impl Topology {
    /// Canonical two-port back-to-back topology: one flow in each direction,
    /// UDP over IPv4 over Ethernet, fixed packet counts, flow metrics on.
    pub fn back_to_back(p1_location: &str, p2_location: &str, packets_per_flow: u64) -> Self {
        let forward = PacketDescriptor {
            ethernet: EthernetHeader {
                src: "00:AA:00:00:04:00".into(),
                dst: "00:AA:00:00:00:AA".into(),
            },
            ipv4: Ipv4Header {
                src: "10.0.0.1".into(),
                dst: "10.0.0.2".into(),
            },
            udp: Some(UdpHeader {
                src_port: 5000,
                dst_port: 6000,
            }),
        };
        let reverse = PacketDescriptor {
            ethernet: EthernetHeader {
                src: "00:AA:00:00:00:AA".into(),
                dst: "00:AA:00:00:04:00".into(),
            },
            ipv4: Ipv4Header {
                src: "10.0.0.2".into(),
                dst: "10.0.0.1".into(),
            },
            udp: Some(UdpHeader {
                src_port: 6000,
                dst_port: 5000,
            }),
        };

        Self {
            ports: vec![
                Port {
                    name: "p1".into(),
                    location: p1_location.into(),
                },
                Port {
                    name: "p2".into(),
                    location: p2_location.into(),
                },
            ],
            flows: vec![
                Flow {
                    name: "flow p1->p2".into(),
                    tx_port: "p1".into(),
                    rx_port: "p2".into(),
                    packet: forward,
                    packets: packets_per_flow,
                    size: 128,
                    metrics_enabled: true,
                },
                Flow {
                    name: "flow p2->p1".into(),
                    tx_port: "p2".into(),
                    rx_port: "p1".into(),
                    packet: reverse,
                    packets: packets_per_flow,
                    size: 256,
                    metrics_enabled: true,
                },
            ],
        }
    }

    /// Total packets the topology is configured to send across all flows.
    /// Computed once before transmission and constant for the run.
    pub fn expected_total(&self) -> u64 {
        self.flows.iter().map(|f| f.packets).sum()
    }

    pub fn port_names(&self) -> Vec<String> {
        self.ports.iter().map(|p| p.name.clone()).collect()
    }

    pub fn flow_names(&self) -> Vec<String> {
        self.flows.iter().map(|f| f.name.clone()).collect()
    }

    /// Checks referential integrity before the topology leaves the process:
    /// unique non-empty names, flows bound to declared ports, nonzero counts.
    pub fn validate(&self) -> Result<()> {
        if self.ports.is_empty() {
            return Err(Error::Topology("topology has no ports".into()));
        }
        if self.flows.is_empty() {
            return Err(Error::Topology("topology has no flows".into()));
        }

        let mut port_names = HashSet::new();
        for port in &self.ports {
            if port.name.is_empty() {
                return Err(Error::Topology("port with empty name".into()));
            }
            if port.location.is_empty() {
                return Err(Error::Topology(format!("port {} has no location", port.name)));
            }
            if !port_names.insert(port.name.as_str()) {
                return Err(Error::Topology(format!("duplicate port name {}", port.name)));
            }
        }

        let mut flow_names = HashSet::new();
        for flow in &self.flows {
            if flow.name.is_empty() {
                return Err(Error::Topology("flow with empty name".into()));
            }
            if !flow_names.insert(flow.name.as_str()) {
                return Err(Error::Topology(format!("duplicate flow name {}", flow.name)));
            }
            for port in [&flow.tx_port, &flow.rx_port] {
                if !port_names.contains(port.as_str()) {
                    return Err(Error::Topology(format!(
                        "flow {} references undeclared port {}",
                        flow.name, port
                    )));
                }
            }
            if flow.packets == 0 {
                return Err(Error::Topology(format!(
                    "flow {} has a zero packet count",
                    flow.name
                )));
            }
        }

        Ok(())
    }
}
