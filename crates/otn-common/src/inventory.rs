//! Raw hardware inventory as reported by a device.
//!
//! These types mirror the operational subtrees read through
//! [`crate::device::DeviceReader`]. They are inputs to the port
//! mapping builder and are never persisted.

use serde::{Deserialize, Serialize};

use crate::types::{Direction, NodeType, PortQual};

/// Root info subtree of a device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    /// Node id reported by the device.
    pub node_id: String,
    /// Node type. Optional on the wire; mandatory for mapping.
    pub node_type: Option<NodeType>,
    /// Site code (CLLI).
    pub clli: Option<String>,
    /// Vendor string.
    pub vendor: Option<String>,
    /// Model string.
    pub model: Option<String>,
    /// Management IP address.
    pub ip_address: Option<String>,
    /// Advertised number of degrees. Absent on sparse inventories.
    pub max_degrees: Option<u16>,
    /// Advertised number of shared-risk groups.
    pub max_srgs: Option<u16>,
}

/// Reference to the partner port of a unidirectional port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartnerPort {
    /// Circuit pack holding the partner.
    pub circuit_pack_name: String,
    /// Partner port name.
    pub port_name: String,
}

/// One physical port on a circuit pack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Port {
    /// Port name, unique per circuit pack.
    pub port_name: String,
    /// Qualifier. Ports without one cannot be mapped.
    pub port_qual: Option<PortQual>,
    /// Direction.
    pub port_direction: Direction,
    /// Declared partner for unidirectional ports.
    pub partner_port: Option<PartnerPort>,
    /// Names of interfaces provisioned on this port.
    pub interfaces: Vec<String>,
}

/// A circuit pack and its ports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CircuitPack {
    /// Circuit-pack name, unique per node.
    pub circuit_pack_name: String,
    /// Parent pack for pluggables hosted on a carrier pack.
    pub parent_circuit_pack: Option<String>,
    /// Ports on this pack.
    pub ports: Vec<Port>,
}

/// A connection port listed under a degree, keyed by a 1-based index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionPort {
    /// Circuit pack holding the port.
    pub circuit_pack_name: String,
    /// Port name.
    pub port_name: String,
}

/// A degree subtree: the packs and external ports facing one neighbor
/// direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Degree {
    /// 1-based degree number.
    pub degree_number: u16,
    /// Circuit packs belonging to this degree.
    pub circuit_packs: Vec<String>,
    /// External connection ports, in device order.
    pub connection_ports: Vec<ConnectionPort>,
}

/// A shared-risk-group subtree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharedRiskGroup {
    /// 1-based SRG number.
    pub srg_number: u16,
    /// Circuit packs belonging to this SRG.
    pub circuit_packs: Vec<String>,
}

/// A (circuit pack, port) key used by the connection map.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PortKey {
    /// Circuit-pack name.
    pub circuit_pack_name: String,
    /// Port name.
    pub port_name: String,
}

impl PortKey {
    /// Flat `{pack}+{port}` form used as an index key.
    pub fn flat(&self) -> String {
        format!("{}+{}", self.circuit_pack_name, self.port_name)
    }
}

/// One internal cross-connection on a transponder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionMapEntry {
    /// Source port key.
    pub source: PortKey,
    /// Destination port keys; the first one is the associated LCP.
    pub destinations: Vec<PortKey>,
}

/// Minimal interface record used to resolve neighbor-discovery
/// interfaces back to circuit packs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceBrief {
    /// Interface name.
    pub name: String,
    /// Circuit pack supporting the interface.
    pub supporting_circuit_pack: Option<String>,
}

/// Admin status of a neighbor-discovery port configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LldpAdminStatus {
    /// Both transmit and receive enabled.
    TxAndRx,
    /// Transmit only.
    TxOnly,
    /// Receive only.
    RxOnly,
    /// Disabled.
    Disabled,
}

/// Per-interface neighbor-discovery configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LldpPortConfig {
    /// Interface name the protocol runs on.
    pub if_name: String,
    /// Admin status; only `TxAndRx` interfaces are indexed.
    pub admin_status: LldpAdminStatus,
}

/// One row of the neighbor-discovery table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NeighborEntry {
    /// Local interface the neighbor was heard on.
    pub local_interface: String,
    /// Remote system name; empty or absent when nothing was heard.
    pub remote_system_name: Option<String>,
    /// Remote port identifier.
    pub remote_port_id: Option<String>,
}
