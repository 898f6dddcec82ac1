//! Link discovery over neighbor tables.
//!
//! [`LinkDiscovery`] reads a node's neighbor-discovery table, resolves
//! each announced adjacency to degree TTP mappings on both ends, and
//! materializes the link as a symmetric pair of directed records
//! (A→Z and Z→A). A single direction never persists: a failed second
//! insert rolls the first back, and a failed second delete surfaces
//! [`LinkError::ResidualLink`] so the caller can retry.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};

use otn_common::device::DeviceReader;
use otn_common::store::MappingStore;
use otn_common::types::{NodeMappingSet, TopologyLink};

use crate::error::{DiscoveryError, LinkError, LinkResult};

/// A symmetric link pair, as created and deleted atomically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkPair {
    /// Source TX to destination RX.
    pub a_to_z: TopologyLink,
    /// Destination TX back to source RX.
    pub z_to_a: TopologyLink,
}

/// Outcome of one discovery sweep over a node's neighbor table.
#[derive(Debug, Default)]
pub struct DiscoveryReport {
    /// Link pairs created this sweep.
    pub created: Vec<LinkPair>,
    /// Entries skipped with a warning (nothing heard, or the remote
    /// node is not under management).
    pub skipped: usize,
    /// Entries that failed; the sweep continued past them.
    pub errors: Vec<DiscoveryError>,
}

/// Topology link discovery.
///
/// Create and delete serialize per unordered node pair; operations on
/// distinct pairs proceed concurrently.
pub struct LinkDiscovery<R, S> {
    reader: Arc<R>,
    store: Arc<S>,
    pair_locks: DashMap<(String, String), Arc<Mutex<()>>>,
}

impl<R, S> LinkDiscovery<R, S>
where
    R: DeviceReader,
    S: MappingStore,
{
    /// Creates a discovery engine over the given device and store
    /// handles.
    pub fn new(reader: Arc<R>, store: Arc<S>) -> Self {
        Self {
            reader,
            store,
            pair_locks: DashMap::new(),
        }
    }

    /// Sweeps the neighbor table of `node_id` and creates a link pair
    /// per valid adjacency. Per-entry failures are accumulated in the
    /// report; only reading the table itself is fatal.
    #[instrument(skip(self), fields(node = %node_id))]
    pub async fn discover_neighbor_links(&self, node_id: &str) -> LinkResult<DiscoveryReport> {
        let Some(neighbors) = self.reader.neighbor_table(node_id).await? else {
            info!("No neighbor table on {}; node is isolated", node_id);
            return Ok(DiscoveryReport::default());
        };

        let mut report = DiscoveryReport::default();
        for entry in neighbors {
            let remote_node = match entry.remote_system_name.as_deref() {
                Some(name) if !name.is_empty() => name.to_string(),
                _ => {
                    warn!(
                        "No neighbor heard on {} interface {}",
                        node_id, entry.local_interface
                    );
                    report.skipped += 1;
                    continue;
                }
            };
            if !self.reader.is_managed(&remote_node).await {
                warn!(
                    "Neighbor {} of {} is not under management, skipping",
                    remote_node, node_id
                );
                report.skipped += 1;
                continue;
            }
            let Some(remote_interface) = entry.remote_port_id.clone() else {
                report.errors.push(DiscoveryError {
                    node: node_id.to_string(),
                    local_interface: entry.local_interface.clone(),
                    remote_node,
                    source: LinkError::MissingRemotePort {
                        node: node_id.to_string(),
                        interface: entry.local_interface.clone(),
                    },
                });
                continue;
            };

            match self
                .create_link(node_id, &entry.local_interface, &remote_node, &remote_interface)
                .await
            {
                Ok(pair) => report.created.push(pair),
                Err(source) => report.errors.push(DiscoveryError {
                    node: node_id.to_string(),
                    local_interface: entry.local_interface.clone(),
                    remote_node,
                    source,
                }),
            }
        }

        info!(
            created = report.created.len(),
            skipped = report.skipped,
            errors = report.errors.len(),
            "Neighbor sweep of {} complete",
            node_id
        );
        Ok(report)
    }

    /// Creates the symmetric link pair between two adjacent degrees,
    /// resolved from the discovery interfaces on each end.
    #[instrument(skip(self), fields(src = %source_node, dest = %dest_node))]
    pub async fn create_link(
        &self,
        source_node: &str,
        source_interface: &str,
        dest_node: &str,
        dest_interface: &str,
    ) -> LinkResult<LinkPair> {
        let lock = self.pair_lock(source_node, dest_node);
        let _guard = lock.lock().await;

        let pair = self
            .resolve_pair(source_node, source_interface, dest_node, dest_interface)
            .await?;

        self.store.add_link(pair.a_to_z.clone()).await?;
        if let Err(e) = self.store.add_link(pair.z_to_a.clone()).await {
            // Roll the first direction back; a failed rollback leaves
            // a half link that the caller must clear by retrying.
            return match self.store.remove_link(&pair.a_to_z).await {
                Ok(_) => Err(e.into()),
                Err(rollback) => Err(LinkError::ResidualLink {
                    link: pair.a_to_z.clone(),
                    operation: "create",
                    message: rollback.to_string(),
                }),
            };
        }

        info!("Created link pair {} and {}", pair.a_to_z, pair.z_to_a);
        Ok(pair)
    }

    /// Deletes both directions of the link pair between two adjacent
    /// degrees. Returns whether any direction was present.
    #[instrument(skip(self), fields(src = %source_node, dest = %dest_node))]
    pub async fn delete_link(
        &self,
        source_node: &str,
        source_interface: &str,
        dest_node: &str,
        dest_interface: &str,
    ) -> LinkResult<bool> {
        let lock = self.pair_lock(source_node, dest_node);
        let _guard = lock.lock().await;

        let pair = self
            .resolve_pair(source_node, source_interface, dest_node, dest_interface)
            .await?;

        let removed_a_to_z = self.store.remove_link(&pair.a_to_z).await?;
        let removed_z_to_a = match self.store.remove_link(&pair.z_to_a).await {
            Ok(removed) => removed,
            Err(e) if removed_a_to_z => {
                return Err(LinkError::ResidualLink {
                    link: pair.z_to_a.clone(),
                    operation: "delete",
                    message: e.to_string(),
                })
            }
            Err(e) => return Err(e.into()),
        };

        if removed_a_to_z != removed_z_to_a {
            warn!(
                "Repaired asymmetric link state between {} and {}",
                source_node, dest_node
            );
        }
        if removed_a_to_z || removed_z_to_a {
            info!("Deleted link pair {} and {}", pair.a_to_z, pair.z_to_a);
        }
        Ok(removed_a_to_z || removed_z_to_a)
    }

    /// Resolves the four endpoint LCPs and forms the directed pair:
    /// source TX feeds destination RX, destination TX feeds source RX.
    async fn resolve_pair(
        &self,
        source_node: &str,
        source_interface: &str,
        dest_node: &str,
        dest_interface: &str,
    ) -> LinkResult<LinkPair> {
        let (source_tx, source_rx) = self.endpoints(source_node, source_interface).await?;
        let (dest_tx, dest_rx) = self.endpoints(dest_node, dest_interface).await?;
        Ok(LinkPair {
            a_to_z: TopologyLink::new(source_node, source_tx, dest_node, dest_rx),
            z_to_a: TopologyLink::new(dest_node, dest_tx, source_node, source_rx),
        })
    }

    /// Resolves the (TX, RX) TTP names of the degree bound to a
    /// discovery interface. One mapping on the degree means a single
    /// bidirectional TTP serving both roles; more than one means a
    /// unidirectional TX/RX split.
    async fn endpoints(&self, node_id: &str, interface: &str) -> LinkResult<(String, String)> {
        let set = self
            .store
            .node(node_id)
            .await?
            .ok_or_else(|| LinkError::NodeNotMapped {
                node: node_id.to_string(),
            })?;
        let degree =
            set.degree_for_interface(interface)
                .ok_or_else(|| LinkError::DegreeNotMapped {
                    node: node_id.to_string(),
                    interface: interface.to_string(),
                })?;

        match set.degree_mapping_count(degree) {
            0 => Err(LinkError::NoDegreeMappings {
                node: node_id.to_string(),
                degree,
            }),
            1 => {
                let lcp = require_lcp(&set, node_id, format!("DEG{degree}-TTP-TXRX"))?;
                Ok((lcp.clone(), lcp))
            }
            _ => {
                let tx = require_lcp(&set, node_id, format!("DEG{degree}-TTP-TX"))?;
                let rx = require_lcp(&set, node_id, format!("DEG{degree}-TTP-RX"))?;
                Ok((tx, rx))
            }
        }
    }

    fn pair_lock(&self, a: &str, b: &str) -> Arc<Mutex<()>> {
        let key = if a <= b {
            (a.to_string(), b.to_string())
        } else {
            (b.to_string(), a.to_string())
        };
        self.pair_locks
            .entry(key)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

fn require_lcp(set: &NodeMappingSet, node_id: &str, lcp: String) -> LinkResult<String> {
    if set.mapping(&lcp).is_none() {
        return Err(LinkError::LcpNotFound {
            node: node_id.to_string(),
            lcp,
        });
    }
    Ok(lcp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use otn_common::inventory::NeighborEntry;
    use otn_common::mock::MockDevice;
    use otn_common::types::{
        CpToDegree, Direction, InventoryVersion, Mapping, NodeInfo, NodeType, PortRole,
    };
    use otn_common::{MemoryStore, StoreError, StoreResult};

    fn node_info(node: &str) -> NodeInfo {
        NodeInfo {
            node_id: node.to_string(),
            version: InventoryVersion::V121,
            node_type: NodeType::Roadm,
            site_code: "defaultCLLI".to_string(),
            vendor: None,
            model: None,
            mgmt_address: None,
        }
    }

    /// Persists a mapped degree on `node`: bound to `interface`, with
    /// either a single TXRX TTP or a TX/RX pair.
    async fn map_degree(
        store: &MemoryStore,
        node: &str,
        degree: u16,
        interface: &str,
        bidirectional: bool,
    ) {
        store.merge_node_info(node_info(node)).await.unwrap();
        let mappings = if bidirectional {
            vec![Mapping::new(
                node,
                format!("DEG{degree}-TTP-TXRX"),
                "CP1",
                "L1",
                Direction::Bidirectional,
                PortRole::DegreeTtp,
            )]
        } else {
            vec![
                Mapping::new(
                    node,
                    format!("DEG{degree}-TTP-TX"),
                    "CP1",
                    "L1-TX",
                    Direction::Tx,
                    PortRole::DegreeTtp,
                ),
                Mapping::new(
                    node,
                    format!("DEG{degree}-TTP-RX"),
                    "CP1",
                    "L1-RX",
                    Direction::Rx,
                    PortRole::DegreeTtp,
                ),
            ]
        };
        store.merge_mappings(node, mappings).await.unwrap();
        store
            .set_cp_to_degree(
                node,
                vec![CpToDegree {
                    circuit_pack_name: "CP1".to_string(),
                    degree_number: degree,
                    interface_name: Some(interface.to_string()),
                }],
            )
            .await
            .unwrap();
    }

    fn discovery(
        dev: MockDevice,
        store: Arc<MemoryStore>,
    ) -> LinkDiscovery<MockDevice, MemoryStore> {
        LinkDiscovery::new(Arc::new(dev), store)
    }

    #[tokio::test]
    async fn test_create_link_mixed_directionality() {
        let store = Arc::new(MemoryStore::new());
        map_degree(&store, "ROADM-A", 2, "1GE-interface-2", true).await;
        map_degree(&store, "ROADM-B", 3, "1GE-interface-3", false).await;

        let disco = discovery(MockDevice::new(), Arc::clone(&store));
        let pair = disco
            .create_link("ROADM-A", "1GE-interface-2", "ROADM-B", "1GE-interface-3")
            .await
            .unwrap();

        assert_eq!(
            pair.a_to_z.to_string(),
            "ROADM-A.DEG2-TTP-TXRX -> ROADM-B.DEG3-TTP-RX"
        );
        assert_eq!(
            pair.z_to_a.to_string(),
            "ROADM-B.DEG3-TTP-TX -> ROADM-A.DEG2-TTP-TXRX"
        );
        assert_eq!(store.links().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_create_link_unmapped_node() {
        let store = Arc::new(MemoryStore::new());
        map_degree(&store, "ROADM-A", 1, "1GE-interface-1", true).await;

        let disco = discovery(MockDevice::new(), Arc::clone(&store));
        let err = disco
            .create_link("ROADM-A", "1GE-interface-1", "ROADM-B", "1GE-interface-1")
            .await
            .unwrap_err();
        assert!(matches!(err, LinkError::NodeNotMapped { .. }));
        // Nothing committed for the failed pair.
        assert!(store.links().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_link_unknown_interface() {
        let store = Arc::new(MemoryStore::new());
        map_degree(&store, "ROADM-A", 1, "1GE-interface-1", true).await;
        map_degree(&store, "ROADM-B", 1, "1GE-interface-1", true).await;

        let disco = discovery(MockDevice::new(), Arc::clone(&store));
        let err = disco
            .create_link("ROADM-A", "1GE-interface-9", "ROADM-B", "1GE-interface-1")
            .await
            .unwrap_err();
        assert!(matches!(err, LinkError::DegreeNotMapped { .. }));
    }

    #[tokio::test]
    async fn test_delete_link_roundtrip() {
        let store = Arc::new(MemoryStore::new());
        map_degree(&store, "ROADM-A", 1, "1GE-interface-1", true).await;
        map_degree(&store, "ROADM-B", 2, "1GE-interface-2", true).await;

        let disco = discovery(MockDevice::new(), Arc::clone(&store));
        disco
            .create_link("ROADM-A", "1GE-interface-1", "ROADM-B", "1GE-interface-2")
            .await
            .unwrap();

        let removed = disco
            .delete_link("ROADM-A", "1GE-interface-1", "ROADM-B", "1GE-interface-2")
            .await
            .unwrap();
        assert!(removed);
        assert!(store.links().await.unwrap().is_empty());

        // Deleting again is a no-op.
        let removed = disco
            .delete_link("ROADM-A", "1GE-interface-1", "ROADM-B", "1GE-interface-2")
            .await
            .unwrap();
        assert!(!removed);
    }

    #[tokio::test]
    async fn test_discovery_sweep() {
        let store = Arc::new(MemoryStore::new());
        map_degree(&store, "ROADM-A", 2, "1GE-interface-2", true).await;
        map_degree(&store, "ROADM-B", 3, "1GE-interface-3", false).await;
        // A second pack on degree 2 carries the discovery interface
        // facing ROADM-D, so that entry resolves locally and fails on
        // the remote side.
        store
            .set_cp_to_degree(
                "ROADM-A",
                vec![
                    CpToDegree {
                        circuit_pack_name: "CP1".to_string(),
                        degree_number: 2,
                        interface_name: Some("1GE-interface-2".to_string()),
                    },
                    CpToDegree {
                        circuit_pack_name: "CP2".to_string(),
                        degree_number: 2,
                        interface_name: Some("1GE-interface-7".to_string()),
                    },
                ],
            )
            .await
            .unwrap();

        let mut dev = MockDevice::new();
        dev.add_node("ROADM-B");
        dev.add_node("ROADM-C");
        dev.set_managed("ROADM-C", false);
        // Valid adjacency.
        dev.add_neighbor(
            "ROADM-A",
            NeighborEntry {
                local_interface: "1GE-interface-2".to_string(),
                remote_system_name: Some("ROADM-B".to_string()),
                remote_port_id: Some("1GE-interface-3".to_string()),
            },
        );
        // Nothing heard on this port.
        dev.add_neighbor(
            "ROADM-A",
            NeighborEntry {
                local_interface: "1GE-interface-5".to_string(),
                remote_system_name: Some(String::new()),
                remote_port_id: None,
            },
        );
        // Neighbor not under management.
        dev.add_neighbor(
            "ROADM-A",
            NeighborEntry {
                local_interface: "1GE-interface-6".to_string(),
                remote_system_name: Some("ROADM-C".to_string()),
                remote_port_id: Some("1GE-interface-1".to_string()),
            },
        );
        // Managed neighbor without a mapping set.
        dev.add_node("ROADM-D");
        dev.add_neighbor(
            "ROADM-A",
            NeighborEntry {
                local_interface: "1GE-interface-7".to_string(),
                remote_system_name: Some("ROADM-D".to_string()),
                remote_port_id: Some("1GE-interface-1".to_string()),
            },
        );

        let disco = discovery(dev, Arc::clone(&store));
        let report = disco.discover_neighbor_links("ROADM-A").await.unwrap();

        assert_eq!(report.created.len(), 1);
        assert_eq!(report.skipped, 2);
        assert_eq!(report.errors.len(), 1);
        assert!(matches!(
            report.errors[0].source,
            LinkError::NodeNotMapped { .. }
        ));
        assert_eq!(store.links().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_isolated_node_sweep_is_empty() {
        let store = Arc::new(MemoryStore::new());
        let disco = discovery(MockDevice::new(), Arc::clone(&store));

        let report = disco.discover_neighbor_links("ROADM-A").await.unwrap();
        assert!(report.created.is_empty());
        assert_eq!(report.skipped, 0);
        assert!(report.errors.is_empty());
    }

    #[tokio::test]
    async fn test_missing_remote_port_is_reported() {
        let store = Arc::new(MemoryStore::new());
        map_degree(&store, "ROADM-A", 1, "1GE-interface-1", true).await;

        let mut dev = MockDevice::new();
        dev.add_node("ROADM-B");
        dev.add_neighbor(
            "ROADM-A",
            NeighborEntry {
                local_interface: "1GE-interface-1".to_string(),
                remote_system_name: Some("ROADM-B".to_string()),
                remote_port_id: None,
            },
        );

        let disco = discovery(dev, Arc::clone(&store));
        let report = disco.discover_neighbor_links("ROADM-A").await.unwrap();
        assert!(report.created.is_empty());
        assert_eq!(report.errors.len(), 1);
        assert!(matches!(
            report.errors[0].source,
            LinkError::MissingRemotePort { .. }
        ));
    }

    /// Store wrapper that fails link inserts whose source matches a
    /// fixed node, to exercise the create rollback path.
    struct FlakyStore {
        inner: MemoryStore,
        fail_source: String,
    }

    #[async_trait]
    impl MappingStore for FlakyStore {
        async fn node(&self, node_id: &str) -> StoreResult<Option<NodeMappingSet>> {
            self.inner.node(node_id).await
        }
        async fn merge_node_info(&self, info: NodeInfo) -> StoreResult<()> {
            self.inner.merge_node_info(info).await
        }
        async fn merge_mappings(
            &self,
            node_id: &str,
            mappings: Vec<Mapping>,
        ) -> StoreResult<()> {
            self.inner.merge_mappings(node_id, mappings).await
        }
        async fn merge_mapping(&self, node_id: &str, mapping: Mapping) -> StoreResult<()> {
            self.inner.merge_mapping(node_id, mapping).await
        }
        async fn set_cp_to_degree(
            &self,
            node_id: &str,
            entries: Vec<CpToDegree>,
        ) -> StoreResult<()> {
            self.inner.set_cp_to_degree(node_id, entries).await
        }
        async fn remove_node(&self, node_id: &str) -> StoreResult<()> {
            self.inner.remove_node(node_id).await
        }
        async fn add_link(&self, link: TopologyLink) -> StoreResult<()> {
            if link.source_node == self.fail_source {
                return Err(StoreError::write("add-link", "injected failure"));
            }
            self.inner.add_link(link).await
        }
        async fn remove_link(&self, link: &TopologyLink) -> StoreResult<bool> {
            self.inner.remove_link(link).await
        }
        async fn links(&self) -> StoreResult<Vec<TopologyLink>> {
            self.inner.links().await
        }
    }

    #[tokio::test]
    async fn test_failed_second_insert_rolls_back_first() {
        let store = Arc::new(FlakyStore {
            inner: MemoryStore::new(),
            fail_source: "ROADM-B".to_string(),
        });
        map_degree(&store.inner, "ROADM-A", 1, "1GE-interface-1", true).await;
        map_degree(&store.inner, "ROADM-B", 2, "1GE-interface-2", true).await;

        let disco = LinkDiscovery::new(Arc::new(MockDevice::new()), Arc::clone(&store));
        let err = disco
            .create_link("ROADM-A", "1GE-interface-1", "ROADM-B", "1GE-interface-2")
            .await
            .unwrap_err();

        assert!(matches!(err, LinkError::Store(_)));
        // The committed A→Z direction was rolled back.
        assert!(store.links().await.unwrap().is_empty());
    }
}
