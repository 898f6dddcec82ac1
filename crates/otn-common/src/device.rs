//! Seams to remote device access.
//!
//! [`DeviceReader`] is the boundary to the remote-query transport: it
//! returns operational subtrees or `None` when a subtree is absent.
//! The transport itself (session handling, encoding) lives outside
//! this workspace. [`Timed`] bounds every read with a fixed timeout;
//! a timeout is surfaced as [`DeviceError::Timeout`] and is never
//! retried here.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

use crate::error::{DeviceError, DeviceResult};
use crate::inventory::{
    CircuitPack, ConnectionMapEntry, Degree, DeviceInfo, InterfaceBrief, LldpPortConfig,
    NeighborEntry, Port, SharedRiskGroup,
};

/// Classification of an interface provisioned on a degree TTP.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterfaceClass {
    /// Optical multiplex section.
    Oms,
    /// Optical transport section.
    Ots,
    /// Anything else; not annotated on the mapping.
    Other,
}

/// Resolves the media class of a provisioned interface.
#[async_trait]
pub trait InterfaceClassifier: Send + Sync {
    /// Classifies `interface_name` on `node_id`.
    async fn classify(&self, node_id: &str, interface_name: &str)
        -> DeviceResult<InterfaceClass>;
}

/// Read access to a device's operational inventory.
///
/// Every method addresses one subtree. `Ok(None)` means the subtree is
/// absent on the device, which is a normal condition for sparse
/// inventories (e.g., a degree number with no hardware behind it).
#[async_trait]
pub trait DeviceReader: Send + Sync {
    /// Root info subtree.
    async fn device_info(&self, node_id: &str) -> DeviceResult<Option<DeviceInfo>>;

    /// All circuit packs of the device.
    async fn circuit_packs(&self, node_id: &str) -> DeviceResult<Vec<CircuitPack>>;

    /// One circuit pack by name.
    async fn circuit_pack(&self, node_id: &str, name: &str) -> DeviceResult<Option<CircuitPack>>;

    /// One port by circuit pack and port name.
    async fn port(
        &self,
        node_id: &str,
        circuit_pack: &str,
        port_name: &str,
    ) -> DeviceResult<Option<Port>>;

    /// Degree subtree by 1-based number.
    async fn degree(&self, node_id: &str, number: u16) -> DeviceResult<Option<Degree>>;

    /// Shared-risk-group subtree by 1-based number.
    async fn shared_risk_group(
        &self,
        node_id: &str,
        number: u16,
    ) -> DeviceResult<Option<SharedRiskGroup>>;

    /// Internal cross-connection map (transponders).
    async fn connection_map(&self, node_id: &str) -> DeviceResult<Vec<ConnectionMapEntry>>;

    /// Interface record by name.
    async fn interface(&self, node_id: &str, name: &str) -> DeviceResult<Option<InterfaceBrief>>;

    /// Neighbor-discovery per-port configuration, `None` when the
    /// protocol subtree is missing entirely.
    async fn lldp_port_configs(&self, node_id: &str) -> DeviceResult<Option<Vec<LldpPortConfig>>>;

    /// Neighbor-discovery table snapshot, `None` when the protocol
    /// subtree is missing (isolated device).
    async fn neighbor_table(&self, node_id: &str) -> DeviceResult<Option<Vec<NeighborEntry>>>;

    /// Whether the node is currently under active management.
    async fn is_managed(&self, node_id: &str) -> bool;
}

#[async_trait]
impl<C: InterfaceClassifier + ?Sized> InterfaceClassifier for Arc<C> {
    async fn classify(
        &self,
        node_id: &str,
        interface_name: &str,
    ) -> DeviceResult<InterfaceClass> {
        (**self).classify(node_id, interface_name).await
    }
}

#[async_trait]
impl<R: DeviceReader + ?Sized> DeviceReader for Arc<R> {
    async fn device_info(&self, node_id: &str) -> DeviceResult<Option<DeviceInfo>> {
        (**self).device_info(node_id).await
    }

    async fn circuit_packs(&self, node_id: &str) -> DeviceResult<Vec<CircuitPack>> {
        (**self).circuit_packs(node_id).await
    }

    async fn circuit_pack(&self, node_id: &str, name: &str) -> DeviceResult<Option<CircuitPack>> {
        (**self).circuit_pack(node_id, name).await
    }

    async fn port(
        &self,
        node_id: &str,
        circuit_pack: &str,
        port_name: &str,
    ) -> DeviceResult<Option<Port>> {
        (**self).port(node_id, circuit_pack, port_name).await
    }

    async fn degree(&self, node_id: &str, number: u16) -> DeviceResult<Option<Degree>> {
        (**self).degree(node_id, number).await
    }

    async fn shared_risk_group(
        &self,
        node_id: &str,
        number: u16,
    ) -> DeviceResult<Option<SharedRiskGroup>> {
        (**self).shared_risk_group(node_id, number).await
    }

    async fn connection_map(&self, node_id: &str) -> DeviceResult<Vec<ConnectionMapEntry>> {
        (**self).connection_map(node_id).await
    }

    async fn interface(&self, node_id: &str, name: &str) -> DeviceResult<Option<InterfaceBrief>> {
        (**self).interface(node_id, name).await
    }

    async fn lldp_port_configs(&self, node_id: &str) -> DeviceResult<Option<Vec<LldpPortConfig>>> {
        (**self).lldp_port_configs(node_id).await
    }

    async fn neighbor_table(&self, node_id: &str) -> DeviceResult<Option<Vec<NeighborEntry>>> {
        (**self).neighbor_table(node_id).await
    }

    async fn is_managed(&self, node_id: &str) -> bool {
        (**self).is_managed(node_id).await
    }
}

/// Wraps a [`DeviceReader`] so every read is bounded by `timeout`.
pub struct Timed<R> {
    inner: R,
    timeout: Duration,
}

impl<R> Timed<R> {
    /// Bounds all reads on `inner` by `timeout`.
    pub fn new(inner: R, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    async fn bounded<T>(
        &self,
        node_id: &str,
        path: &str,
        fut: impl std::future::Future<Output = DeviceResult<T>> + Send,
    ) -> DeviceResult<T> {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result,
            Err(_) => {
                warn!(node = %node_id, path = %path, "Device read timed out");
                Err(DeviceError::timeout(node_id, path))
            }
        }
    }
}

#[async_trait]
impl<R: DeviceReader> DeviceReader for Timed<R> {
    async fn device_info(&self, node_id: &str) -> DeviceResult<Option<DeviceInfo>> {
        self.bounded(node_id, "info", self.inner.device_info(node_id))
            .await
    }

    async fn circuit_packs(&self, node_id: &str) -> DeviceResult<Vec<CircuitPack>> {
        self.bounded(node_id, "circuit-packs", self.inner.circuit_packs(node_id))
            .await
    }

    async fn circuit_pack(&self, node_id: &str, name: &str) -> DeviceResult<Option<CircuitPack>> {
        self.bounded(
            node_id,
            &format!("circuit-packs/{name}"),
            self.inner.circuit_pack(node_id, name),
        )
        .await
    }

    async fn port(
        &self,
        node_id: &str,
        circuit_pack: &str,
        port_name: &str,
    ) -> DeviceResult<Option<Port>> {
        self.bounded(
            node_id,
            &format!("circuit-packs/{circuit_pack}/ports/{port_name}"),
            self.inner.port(node_id, circuit_pack, port_name),
        )
        .await
    }

    async fn degree(&self, node_id: &str, number: u16) -> DeviceResult<Option<Degree>> {
        self.bounded(
            node_id,
            &format!("degree/{number}"),
            self.inner.degree(node_id, number),
        )
        .await
    }

    async fn shared_risk_group(
        &self,
        node_id: &str,
        number: u16,
    ) -> DeviceResult<Option<SharedRiskGroup>> {
        self.bounded(
            node_id,
            &format!("shared-risk-group/{number}"),
            self.inner.shared_risk_group(node_id, number),
        )
        .await
    }

    async fn connection_map(&self, node_id: &str) -> DeviceResult<Vec<ConnectionMapEntry>> {
        self.bounded(node_id, "connection-map", self.inner.connection_map(node_id))
            .await
    }

    async fn interface(&self, node_id: &str, name: &str) -> DeviceResult<Option<InterfaceBrief>> {
        self.bounded(
            node_id,
            &format!("interface/{name}"),
            self.inner.interface(node_id, name),
        )
        .await
    }

    async fn lldp_port_configs(&self, node_id: &str) -> DeviceResult<Option<Vec<LldpPortConfig>>> {
        self.bounded(
            node_id,
            "protocols/lldp/port-config",
            self.inner.lldp_port_configs(node_id),
        )
        .await
    }

    async fn neighbor_table(&self, node_id: &str) -> DeviceResult<Option<Vec<NeighborEntry>>> {
        self.bounded(
            node_id,
            "protocols/lldp/nbr-list",
            self.inner.neighbor_table(node_id),
        )
        .await
    }

    async fn is_managed(&self, node_id: &str) -> bool {
        self.inner.is_managed(node_id).await
    }
}
