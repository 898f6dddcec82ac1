//! End-to-end pipeline test: two ROADM inventories are mapped by the
//! port mapping builder, then the neighbor sweep materializes the
//! link pair between them from the same store.

use std::sync::Arc;

use pretty_assertions::assert_eq;

use otn_common::inventory::{
    CircuitPack, ConnectionPort, Degree, DeviceInfo, InterfaceBrief, LldpAdminStatus,
    LldpPortConfig, NeighborEntry,
};
use otn_common::mock::{bidi_port, unidir_port, MockDevice};
use otn_common::{Direction, MappingStore, MemoryStore, NodeType};
use portmapd::{PortMappingBuilder, PortmapConfig};
use topolinkd::LinkDiscovery;

fn roadm_info(node: &str) -> DeviceInfo {
    DeviceInfo {
        node_id: node.to_string(),
        node_type: Some(NodeType::Roadm),
        clli: None,
        vendor: None,
        model: None,
        ip_address: None,
        max_degrees: Some(3),
        max_srgs: Some(1),
    }
}

/// ROADM-A degree 2: single bidirectional TTP, discovery on
/// 1GE-interface-2.
fn add_roadm_a(dev: &mut MockDevice) {
    dev.set_info(roadm_info("ROADM-A"));
    dev.add_circuit_pack(
        "ROADM-A",
        CircuitPack {
            circuit_pack_name: "2/0".to_string(),
            parent_circuit_pack: None,
            ports: vec![bidi_port("L1")],
        },
    );
    dev.add_degree(
        "ROADM-A",
        Degree {
            degree_number: 2,
            circuit_packs: vec!["2/0".to_string()],
            connection_ports: vec![ConnectionPort {
                circuit_pack_name: "2/0".to_string(),
                port_name: "L1".to_string(),
            }],
        },
    );
    dev.set_lldp(
        "ROADM-A",
        vec![LldpPortConfig {
            if_name: "1GE-interface-2".to_string(),
            admin_status: LldpAdminStatus::TxAndRx,
        }],
    );
    dev.add_interface(
        "ROADM-A",
        InterfaceBrief {
            name: "1GE-interface-2".to_string(),
            supporting_circuit_pack: Some("2/0".to_string()),
        },
    );
    dev.add_neighbor(
        "ROADM-A",
        NeighborEntry {
            local_interface: "1GE-interface-2".to_string(),
            remote_system_name: Some("ROADM-B".to_string()),
            remote_port_id: Some("1GE-interface-3".to_string()),
        },
    );
}

/// ROADM-B degree 3: unidirectional TX/RX pair, discovery on
/// 1GE-interface-3.
fn add_roadm_b(dev: &mut MockDevice) {
    dev.set_info(roadm_info("ROADM-B"));
    dev.add_circuit_pack(
        "ROADM-B",
        CircuitPack {
            circuit_pack_name: "3/0".to_string(),
            parent_circuit_pack: None,
            ports: vec![
                unidir_port("L1-TX", Direction::Tx, "3/0", "L1-RX"),
                unidir_port("L1-RX", Direction::Rx, "3/0", "L1-TX"),
            ],
        },
    );
    dev.add_degree(
        "ROADM-B",
        Degree {
            degree_number: 3,
            circuit_packs: vec!["3/0".to_string()],
            connection_ports: vec![
                ConnectionPort {
                    circuit_pack_name: "3/0".to_string(),
                    port_name: "L1-TX".to_string(),
                },
                ConnectionPort {
                    circuit_pack_name: "3/0".to_string(),
                    port_name: "L1-RX".to_string(),
                },
            ],
        },
    );
    dev.set_lldp(
        "ROADM-B",
        vec![LldpPortConfig {
            if_name: "1GE-interface-3".to_string(),
            admin_status: LldpAdminStatus::TxAndRx,
        }],
    );
    dev.add_interface(
        "ROADM-B",
        InterfaceBrief {
            name: "1GE-interface-3".to_string(),
            supporting_circuit_pack: Some("3/0".to_string()),
        },
    );
}

#[tokio::test]
async fn test_map_then_discover() {
    let mut dev = MockDevice::new();
    add_roadm_a(&mut dev);
    add_roadm_b(&mut dev);
    let dev = Arc::new(dev);
    let store = Arc::new(MemoryStore::new());

    let builder = PortMappingBuilder::new(
        Arc::clone(&dev),
        Arc::clone(&dev),
        Arc::clone(&store),
        PortmapConfig::default(),
    );
    builder.build_mapping("ROADM-A").await.unwrap();
    builder.build_mapping("ROADM-B").await.unwrap();

    let disco = LinkDiscovery::new(Arc::clone(&dev), Arc::clone(&store));
    let report = disco.discover_neighbor_links("ROADM-A").await.unwrap();

    assert_eq!(report.errors.len(), 0);
    assert_eq!(report.created.len(), 1);
    let pair = &report.created[0];
    assert_eq!(
        pair.a_to_z.to_string(),
        "ROADM-A.DEG2-TTP-TXRX -> ROADM-B.DEG3-TTP-RX"
    );
    assert_eq!(
        pair.z_to_a.to_string(),
        "ROADM-B.DEG3-TTP-TX -> ROADM-A.DEG2-TTP-TXRX"
    );

    let mut links = store.links().await.unwrap();
    links.sort_by(|a, b| a.source_node.cmp(&b.source_node));
    assert_eq!(links.len(), 2);
    assert_eq!(links[0].source_lcp, "DEG2-TTP-TXRX");
    assert_eq!(links[1].source_lcp, "DEG3-TTP-TX");

    // Tearing the adjacency down removes both directions.
    let removed = disco
        .delete_link("ROADM-A", "1GE-interface-2", "ROADM-B", "1GE-interface-3")
        .await
        .unwrap();
    assert!(removed);
    assert!(store.links().await.unwrap().is_empty());
}
