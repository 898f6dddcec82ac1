//! In-memory device fixture for tests.
//!
//! [`MockDevice`] holds per-node inventories and implements both
//! [`DeviceReader`] and [`InterfaceClassifier`]. Build it up with the
//! `add_*` methods, then share it behind an `Arc`.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::device::{DeviceReader, InterfaceClass, InterfaceClassifier};
use crate::error::DeviceResult;
use crate::inventory::{
    CircuitPack, ConnectionMapEntry, Degree, DeviceInfo, InterfaceBrief, LldpPortConfig,
    NeighborEntry, PartnerPort, Port, SharedRiskGroup,
};
use crate::types::{Direction, PortQual};

#[derive(Default)]
struct NodeFixture {
    info: Option<DeviceInfo>,
    circuit_packs: Vec<CircuitPack>,
    degrees: HashMap<u16, Degree>,
    srgs: HashMap<u16, SharedRiskGroup>,
    connection_map: Vec<ConnectionMapEntry>,
    interfaces: HashMap<String, InterfaceBrief>,
    lldp: Option<Vec<LldpPortConfig>>,
    neighbors: Option<Vec<NeighborEntry>>,
    iface_classes: HashMap<String, InterfaceClass>,
    managed: bool,
}

/// Multi-node in-memory inventory.
#[derive(Default)]
pub struct MockDevice {
    nodes: HashMap<String, NodeFixture>,
}

impl MockDevice {
    /// Creates an empty fixture set.
    pub fn new() -> Self {
        Self::default()
    }

    fn fixture(&mut self, node_id: &str) -> &mut NodeFixture {
        self.nodes
            .entry(node_id.to_string())
            .or_insert_with(|| NodeFixture {
                managed: true,
                ..NodeFixture::default()
            })
    }

    /// Registers a node with no inventory yet (managed by default).
    pub fn add_node(&mut self, node_id: &str) -> &mut Self {
        self.fixture(node_id);
        self
    }

    /// Sets the root info subtree for a node.
    pub fn set_info(&mut self, info: DeviceInfo) -> &mut Self {
        let node_id = info.node_id.clone();
        self.fixture(&node_id).info = Some(info);
        self
    }

    /// Adds a circuit pack with its ports.
    pub fn add_circuit_pack(&mut self, node_id: &str, pack: CircuitPack) -> &mut Self {
        self.fixture(node_id).circuit_packs.push(pack);
        self
    }

    /// Adds a degree subtree.
    pub fn add_degree(&mut self, node_id: &str, degree: Degree) -> &mut Self {
        self.fixture(node_id).degrees.insert(degree.degree_number, degree);
        self
    }

    /// Adds a shared-risk-group subtree.
    pub fn add_srg(&mut self, node_id: &str, srg: SharedRiskGroup) -> &mut Self {
        self.fixture(node_id).srgs.insert(srg.srg_number, srg);
        self
    }

    /// Adds one connection-map entry.
    pub fn add_connection_map(&mut self, node_id: &str, entry: ConnectionMapEntry) -> &mut Self {
        self.fixture(node_id).connection_map.push(entry);
        self
    }

    /// Adds an interface record.
    pub fn add_interface(&mut self, node_id: &str, interface: InterfaceBrief) -> &mut Self {
        self.fixture(node_id)
            .interfaces
            .insert(interface.name.clone(), interface);
        self
    }

    /// Sets the LLDP port-config list.
    pub fn set_lldp(&mut self, node_id: &str, configs: Vec<LldpPortConfig>) -> &mut Self {
        self.fixture(node_id).lldp = Some(configs);
        self
    }

    /// Appends a neighbor-table row.
    pub fn add_neighbor(&mut self, node_id: &str, entry: NeighborEntry) -> &mut Self {
        self.fixture(node_id)
            .neighbors
            .get_or_insert_with(Vec::new)
            .push(entry);
        self
    }

    /// Marks a node managed or unmanaged.
    pub fn set_managed(&mut self, node_id: &str, managed: bool) -> &mut Self {
        self.fixture(node_id).managed = managed;
        self
    }

    /// Fixes the classification of an interface name on a node.
    pub fn classify_as(
        &mut self,
        node_id: &str,
        interface_name: &str,
        class: InterfaceClass,
    ) -> &mut Self {
        self.fixture(node_id)
            .iface_classes
            .insert(interface_name.to_string(), class);
        self
    }
}

#[async_trait]
impl DeviceReader for MockDevice {
    async fn device_info(&self, node_id: &str) -> DeviceResult<Option<DeviceInfo>> {
        Ok(self.nodes.get(node_id).and_then(|n| n.info.clone()))
    }

    async fn circuit_packs(&self, node_id: &str) -> DeviceResult<Vec<CircuitPack>> {
        Ok(self
            .nodes
            .get(node_id)
            .map(|n| n.circuit_packs.clone())
            .unwrap_or_default())
    }

    async fn circuit_pack(&self, node_id: &str, name: &str) -> DeviceResult<Option<CircuitPack>> {
        Ok(self.nodes.get(node_id).and_then(|n| {
            n.circuit_packs
                .iter()
                .find(|cp| cp.circuit_pack_name == name)
                .cloned()
        }))
    }

    async fn port(
        &self,
        node_id: &str,
        circuit_pack: &str,
        port_name: &str,
    ) -> DeviceResult<Option<Port>> {
        Ok(self
            .circuit_pack(node_id, circuit_pack)
            .await?
            .and_then(|cp| cp.ports.into_iter().find(|p| p.port_name == port_name)))
    }

    async fn degree(&self, node_id: &str, number: u16) -> DeviceResult<Option<Degree>> {
        Ok(self
            .nodes
            .get(node_id)
            .and_then(|n| n.degrees.get(&number).cloned()))
    }

    async fn shared_risk_group(
        &self,
        node_id: &str,
        number: u16,
    ) -> DeviceResult<Option<SharedRiskGroup>> {
        Ok(self
            .nodes
            .get(node_id)
            .and_then(|n| n.srgs.get(&number).cloned()))
    }

    async fn connection_map(&self, node_id: &str) -> DeviceResult<Vec<ConnectionMapEntry>> {
        Ok(self
            .nodes
            .get(node_id)
            .map(|n| n.connection_map.clone())
            .unwrap_or_default())
    }

    async fn interface(&self, node_id: &str, name: &str) -> DeviceResult<Option<InterfaceBrief>> {
        Ok(self
            .nodes
            .get(node_id)
            .and_then(|n| n.interfaces.get(name).cloned()))
    }

    async fn lldp_port_configs(&self, node_id: &str) -> DeviceResult<Option<Vec<LldpPortConfig>>> {
        Ok(self.nodes.get(node_id).and_then(|n| n.lldp.clone()))
    }

    async fn neighbor_table(&self, node_id: &str) -> DeviceResult<Option<Vec<NeighborEntry>>> {
        Ok(self.nodes.get(node_id).and_then(|n| n.neighbors.clone()))
    }

    async fn is_managed(&self, node_id: &str) -> bool {
        self.nodes.get(node_id).map(|n| n.managed).unwrap_or(false)
    }
}

#[async_trait]
impl InterfaceClassifier for MockDevice {
    async fn classify(
        &self,
        node_id: &str,
        interface_name: &str,
    ) -> DeviceResult<InterfaceClass> {
        Ok(self
            .nodes
            .get(node_id)
            .and_then(|n| n.iface_classes.get(interface_name).copied())
            .unwrap_or(InterfaceClass::Other))
    }
}

/// A bidirectional roadm-external port.
pub fn bidi_port(name: &str) -> Port {
    Port {
        port_name: name.to_string(),
        port_qual: Some(PortQual::RoadmExternal),
        port_direction: Direction::Bidirectional,
        partner_port: None,
        interfaces: Vec::new(),
    }
}

/// A unidirectional roadm-external port declaring its partner.
pub fn unidir_port(name: &str, direction: Direction, partner_cp: &str, partner_port: &str) -> Port {
    Port {
        port_name: name.to_string(),
        port_qual: Some(PortQual::RoadmExternal),
        port_direction: direction,
        partner_port: Some(PartnerPort {
            circuit_pack_name: partner_cp.to_string(),
            port_name: partner_port.to_string(),
        }),
        interfaces: Vec::new(),
    }
}

/// A transponder client port.
pub fn client_port(name: &str) -> Port {
    Port {
        port_name: name.to_string(),
        port_qual: Some(PortQual::XpdrClient),
        port_direction: Direction::Bidirectional,
        partner_port: None,
        interfaces: Vec::new(),
    }
}

/// A bidirectional transponder network port.
pub fn network_port(name: &str) -> Port {
    Port {
        port_name: name.to_string(),
        port_qual: Some(PortQual::XpdrNetwork),
        port_direction: Direction::Bidirectional,
        partner_port: None,
        interfaces: Vec::new(),
    }
}
