//! Seam to the persistent store, plus an in-memory implementation.
//!
//! The store keeps [`NodeMappingSet`]s keyed by node id and directed
//! [`TopologyLink`] records. Writes follow merge semantics: node info,
//! the mapping index, and the CpToDegree index can each be committed
//! independently without clobbering the others.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::error::{StoreError, StoreResult};
use crate::types::{CpToDegree, Mapping, NodeInfo, NodeMappingSet, TopologyLink};

/// Durable keeper of mapping sets and topology links.
#[async_trait]
pub trait MappingStore: Send + Sync {
    /// Reads the mapping set for a node.
    async fn node(&self, node_id: &str) -> StoreResult<Option<NodeMappingSet>>;

    /// Creates or updates the node entry with fresh metadata.
    async fn merge_node_info(&self, info: NodeInfo) -> StoreResult<()>;

    /// Merges mappings into the node's LCP index. One atomic write.
    async fn merge_mappings(&self, node_id: &str, mappings: Vec<Mapping>) -> StoreResult<()>;

    /// Merges a single refreshed mapping.
    async fn merge_mapping(&self, node_id: &str, mapping: Mapping) -> StoreResult<()>;

    /// Replaces the node's CpToDegree index. Committed separately from
    /// the mapping index so a degree-mapping failure does not block an
    /// already-successful interface index.
    async fn set_cp_to_degree(&self, node_id: &str, entries: Vec<CpToDegree>) -> StoreResult<()>;

    /// Discards a node's mapping set (node disconnected).
    async fn remove_node(&self, node_id: &str) -> StoreResult<()>;

    /// Inserts one directed link. Idempotent.
    async fn add_link(&self, link: TopologyLink) -> StoreResult<()>;

    /// Removes one directed link; returns whether it was present.
    async fn remove_link(&self, link: &TopologyLink) -> StoreResult<bool>;

    /// Snapshot of all directed links.
    async fn links(&self) -> StoreResult<Vec<TopologyLink>>;
}

/// In-memory [`MappingStore`].
///
/// Backs the daemons in tests and single-process deployments; a
/// durable backend implements the same trait.
#[derive(Default)]
pub struct MemoryStore {
    nodes: RwLock<HashMap<String, NodeMappingSet>>,
    links: RwLock<HashSet<TopologyLink>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MappingStore for MemoryStore {
    async fn node(&self, node_id: &str) -> StoreResult<Option<NodeMappingSet>> {
        Ok(self.nodes.read().get(node_id).cloned())
    }

    async fn merge_node_info(&self, info: NodeInfo) -> StoreResult<()> {
        let mut nodes = self.nodes.write();
        match nodes.get_mut(&info.node_id) {
            Some(existing) => existing.info = info,
            None => {
                nodes.insert(info.node_id.clone(), NodeMappingSet::new(info));
            }
        }
        Ok(())
    }

    async fn merge_mappings(&self, node_id: &str, mappings: Vec<Mapping>) -> StoreResult<()> {
        let mut nodes = self.nodes.write();
        let set = nodes
            .get_mut(node_id)
            .ok_or_else(|| StoreError::node_not_found(node_id))?;
        for mapping in mappings {
            set.mappings
                .insert(mapping.logical_connection_point.clone(), mapping);
        }
        Ok(())
    }

    async fn merge_mapping(&self, node_id: &str, mapping: Mapping) -> StoreResult<()> {
        self.merge_mappings(node_id, vec![mapping]).await
    }

    async fn set_cp_to_degree(&self, node_id: &str, entries: Vec<CpToDegree>) -> StoreResult<()> {
        let mut nodes = self.nodes.write();
        let set = nodes
            .get_mut(node_id)
            .ok_or_else(|| StoreError::node_not_found(node_id))?;
        set.cp_to_degree = entries
            .into_iter()
            .map(|entry| (entry.circuit_pack_name.clone(), entry))
            .collect();
        Ok(())
    }

    async fn remove_node(&self, node_id: &str) -> StoreResult<()> {
        self.nodes.write().remove(node_id);
        Ok(())
    }

    async fn add_link(&self, link: TopologyLink) -> StoreResult<()> {
        self.links.write().insert(link);
        Ok(())
    }

    async fn remove_link(&self, link: &TopologyLink) -> StoreResult<bool> {
        Ok(self.links.write().remove(link))
    }

    async fn links(&self) -> StoreResult<Vec<TopologyLink>> {
        Ok(self.links.read().iter().cloned().collect())
    }
}
