//! Canonical network model types.
//!
//! These are the persisted, logical-view types: one [`Mapping`] per
//! logical connection point (LCP), the [`CpToDegree`] index used for
//! link discovery, and the [`TopologyLink`] records materialized
//! between adjacent nodes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::hash::lcp_hash;

/// Port direction as reported by the device and recorded per LCP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Transmit only.
    Tx,
    /// Receive only.
    Rx,
    /// Single port carrying both directions.
    Bidirectional,
}

impl Direction {
    /// Lowercase wire name, as stored in the mapping record.
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Tx => "tx",
            Direction::Rx => "rx",
            Direction::Bidirectional => "bidirectional",
        }
    }

    /// Uppercase LCP name suffix (`TX`, `RX`, `TXRX`).
    pub fn lcp_suffix(&self) -> &'static str {
        match self {
            Direction::Tx => "TX",
            Direction::Rx => "RX",
            Direction::Bidirectional => "TXRX",
        }
    }

    /// True if the two directions form a valid unidirectional pair.
    pub fn is_opposite(&self, other: Direction) -> bool {
        matches!(
            (self, other),
            (Direction::Tx, Direction::Rx) | (Direction::Rx, Direction::Tx)
        )
    }
}

/// Port qualifier from the raw inventory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PortQual {
    /// External ROADM port (degree or SRG facing).
    RoadmExternal,
    /// Transponder client-side port.
    XpdrClient,
    /// Transponder network-side (line) port.
    XpdrNetwork,
}

impl PortQual {
    /// Lowercase wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            PortQual::RoadmExternal => "roadm-external",
            PortQual::XpdrClient => "xpdr-client",
            PortQual::XpdrNetwork => "xpdr-network",
        }
    }
}

/// Logical role of a mapped port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PortRole {
    /// Degree termination point, facing another network element.
    DegreeTtp,
    /// SRG termination point, facing add/drop equipment.
    SrgPp,
    /// Transponder client port.
    XpdrClient,
    /// Transponder network port.
    XpdrNetwork,
}

/// Node type from the device info subtree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeType {
    /// Reconfigurable optical add/drop multiplexer.
    Roadm,
    /// Transponder.
    Transponder,
}

/// Inventory format version spoken by the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InventoryVersion {
    /// OpenROADM device model 1.2.1.
    V121,
}

impl InventoryVersion {
    /// Human-readable version string.
    pub fn as_str(&self) -> &'static str {
        match self {
            InventoryVersion::V121 => "1.2.1",
        }
    }
}

/// One logical connection point on one node.
///
/// Immutable once built; a single entry may be refreshed by re-reading
/// its supporting port (`portmapd::update_mapping`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mapping {
    /// LCP name, unique per node (e.g., `DEG1-TTP-TXRX`).
    pub logical_connection_point: String,
    /// Supporting circuit-pack name.
    pub supporting_circuit_pack: String,
    /// Supporting port name on that circuit pack.
    pub supporting_port: String,
    /// Direction of the supporting port.
    pub port_direction: Direction,
    /// Logical role of the port.
    pub port_role: PortRole,
    /// Partner LCP for unidirectional pairs.
    pub partner_lcp: Option<String>,
    /// Cross-connected LCP on the same node (transponders only).
    pub connection_map_lcp: Option<String>,
    /// Supporting optical-multiplex interface, when provisioned.
    pub supporting_oms: Option<String>,
    /// Supporting optical-transport interface, when provisioned.
    pub supporting_ots: Option<String>,
    /// FNV-1 64-bit hash of `{node-id}-{lcp}`, stable across rebuilds.
    pub lcp_hash: u64,
}

impl Mapping {
    /// Creates a mapping with the mandatory fields; optional fields
    /// start empty.
    pub fn new(
        node_id: &str,
        lcp: impl Into<String>,
        circuit_pack: impl Into<String>,
        port: impl Into<String>,
        direction: Direction,
        role: PortRole,
    ) -> Self {
        let lcp = lcp.into();
        let lcp_hash = lcp_hash(node_id, &lcp);
        Self {
            logical_connection_point: lcp,
            supporting_circuit_pack: circuit_pack.into(),
            supporting_port: port.into(),
            port_direction: direction,
            port_role: role,
            partner_lcp: None,
            connection_map_lcp: None,
            supporting_oms: None,
            supporting_ots: None,
            lcp_hash,
        }
    }

    /// LCP hash as a lowercase hex string.
    pub fn lcp_hash_hex(&self) -> String {
        format!("{:x}", self.lcp_hash)
    }
}

/// Circuit pack to degree index entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CpToDegree {
    /// Circuit-pack name.
    pub circuit_pack_name: String,
    /// Degree number the pack belongs to.
    pub degree_number: u16,
    /// Neighbor-discovery interface bound to this pack, if any.
    pub interface_name: Option<String>,
}

/// Node metadata derived from the device info subtree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeInfo {
    /// Node id.
    pub node_id: String,
    /// Inventory format version.
    pub version: InventoryVersion,
    /// Node type. Mandatory; its absence aborts the build.
    pub node_type: NodeType,
    /// Site code (CLLI). Defaults to `defaultCLLI` when unreported.
    pub site_code: String,
    /// Vendor string.
    pub vendor: Option<String>,
    /// Model string.
    pub model: Option<String>,
    /// Management address.
    pub mgmt_address: Option<String>,
}

/// The full logical view of one node: metadata, LCP index, and the
/// circuit-pack-to-degree index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeMappingSet {
    /// Node metadata.
    pub info: NodeInfo,
    /// LCP name to mapping. Keys are unique by construction.
    pub mappings: BTreeMap<String, Mapping>,
    /// Circuit-pack name to degree index.
    pub cp_to_degree: BTreeMap<String, CpToDegree>,
}

impl NodeMappingSet {
    /// Creates an empty set for a node.
    pub fn new(info: NodeInfo) -> Self {
        Self {
            info,
            mappings: BTreeMap::new(),
            cp_to_degree: BTreeMap::new(),
        }
    }

    /// Looks up a mapping by LCP name.
    pub fn mapping(&self, lcp: &str) -> Option<&Mapping> {
        self.mappings.get(lcp)
    }

    /// Degree number bound to the given neighbor-discovery interface,
    /// resolved through the CpToDegree index.
    pub fn degree_for_interface(&self, interface_name: &str) -> Option<u16> {
        self.cp_to_degree
            .values()
            .find(|cp| cp.interface_name.as_deref() == Some(interface_name))
            .map(|cp| cp.degree_number)
    }

    /// Number of mappings whose LCP belongs to the given degree.
    pub fn degree_mapping_count(&self, degree: u16) -> usize {
        let prefix = format!("DEG{degree}-");
        self.mappings
            .keys()
            .filter(|lcp| lcp.starts_with(&prefix))
            .count()
    }
}

/// One directed topology link. Always created and removed as one of a
/// symmetric pair (A→Z and Z→A); a single direction never persists.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TopologyLink {
    /// Source node id.
    pub source_node: String,
    /// Source LCP (TX role on the source degree).
    pub source_lcp: String,
    /// Destination node id.
    pub dest_node: String,
    /// Destination LCP (RX role on the destination degree).
    pub dest_lcp: String,
}

impl TopologyLink {
    /// Creates a directed link.
    pub fn new(
        source_node: impl Into<String>,
        source_lcp: impl Into<String>,
        dest_node: impl Into<String>,
        dest_lcp: impl Into<String>,
    ) -> Self {
        Self {
            source_node: source_node.into(),
            source_lcp: source_lcp.into(),
            dest_node: dest_node.into(),
            dest_lcp: dest_lcp.into(),
        }
    }
}

impl std::fmt::Display for TopologyLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}.{} -> {}.{}",
            self.source_node, self.source_lcp, self.dest_node, self.dest_lcp
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn node_info(id: &str) -> NodeInfo {
        NodeInfo {
            node_id: id.to_string(),
            version: InventoryVersion::V121,
            node_type: NodeType::Roadm,
            site_code: "defaultCLLI".to_string(),
            vendor: None,
            model: None,
            mgmt_address: None,
        }
    }

    #[test]
    fn test_direction_suffix() {
        assert_eq!(Direction::Tx.lcp_suffix(), "TX");
        assert_eq!(Direction::Rx.lcp_suffix(), "RX");
        assert_eq!(Direction::Bidirectional.lcp_suffix(), "TXRX");
    }

    #[test]
    fn test_direction_opposite() {
        assert!(Direction::Tx.is_opposite(Direction::Rx));
        assert!(Direction::Rx.is_opposite(Direction::Tx));
        assert!(!Direction::Tx.is_opposite(Direction::Tx));
        assert!(!Direction::Bidirectional.is_opposite(Direction::Rx));
        assert!(!Direction::Bidirectional.is_opposite(Direction::Bidirectional));
    }

    #[test]
    fn test_mapping_hash_is_stable() {
        let a = Mapping::new(
            "ROADM-A",
            "DEG1-TTP-TXRX",
            "CP1",
            "P1",
            Direction::Bidirectional,
            PortRole::DegreeTtp,
        );
        let b = Mapping::new(
            "ROADM-A",
            "DEG1-TTP-TXRX",
            "CP1",
            "P1",
            Direction::Bidirectional,
            PortRole::DegreeTtp,
        );
        assert_eq!(a.lcp_hash, b.lcp_hash);
        assert_eq!(a.lcp_hash_hex(), b.lcp_hash_hex());

        let other = Mapping::new(
            "ROADM-B",
            "DEG1-TTP-TXRX",
            "CP1",
            "P1",
            Direction::Bidirectional,
            PortRole::DegreeTtp,
        );
        assert_ne!(a.lcp_hash, other.lcp_hash);
    }

    #[test]
    fn test_degree_for_interface() {
        let mut set = NodeMappingSet::new(node_info("ROADM-A"));
        set.cp_to_degree.insert(
            "CP2".to_string(),
            CpToDegree {
                circuit_pack_name: "CP2".to_string(),
                degree_number: 2,
                interface_name: Some("1GE-interface-2".to_string()),
            },
        );
        set.cp_to_degree.insert(
            "CP1".to_string(),
            CpToDegree {
                circuit_pack_name: "CP1".to_string(),
                degree_number: 1,
                interface_name: None,
            },
        );

        assert_eq!(set.degree_for_interface("1GE-interface-2"), Some(2));
        assert_eq!(set.degree_for_interface("1GE-interface-9"), None);
    }

    #[test]
    fn test_degree_mapping_count_uses_prefix() {
        let mut set = NodeMappingSet::new(node_info("ROADM-A"));
        for lcp in ["DEG1-TTP-TX", "DEG1-TTP-RX", "DEG10-TTP-TXRX"] {
            set.mappings.insert(
                lcp.to_string(),
                Mapping::new(
                    "ROADM-A",
                    lcp,
                    "CP1",
                    "P1",
                    Direction::Tx,
                    PortRole::DegreeTtp,
                ),
            );
        }

        // DEG1 must not match DEG10.
        assert_eq!(set.degree_mapping_count(1), 2);
        assert_eq!(set.degree_mapping_count(10), 1);
        assert_eq!(set.degree_mapping_count(2), 0);
    }

    #[test]
    fn test_mapping_set_survives_serialization() {
        let mut set = NodeMappingSet::new(node_info("ROADM-A"));
        let mut mapping = Mapping::new(
            "ROADM-A",
            "DEG1-TTP-TX",
            "CP1",
            "P-TX",
            Direction::Tx,
            PortRole::DegreeTtp,
        );
        mapping.supporting_ots = Some("OTS-DEG1-TTP-TX".to_string());
        set.mappings.insert("DEG1-TTP-TX".to_string(), mapping);
        set.cp_to_degree.insert(
            "CP1".to_string(),
            CpToDegree {
                circuit_pack_name: "CP1".to_string(),
                degree_number: 1,
                interface_name: None,
            },
        );

        let json = serde_json::to_string(&set).unwrap();
        let restored: NodeMappingSet = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, set);
    }

    #[test]
    fn test_link_display() {
        let link = TopologyLink::new("A", "DEG2-TTP-TXRX", "B", "DEG3-TTP-RX");
        assert_eq!(link.to_string(), "A.DEG2-TTP-TXRX -> B.DEG3-TTP-RX");
    }
}
