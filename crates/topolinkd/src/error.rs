//! Error types for topology link discovery.

use thiserror::Error;

use otn_common::{DeviceError, StoreError, TopologyLink};

/// Result type alias for link operations.
pub type LinkResult<T> = Result<T, LinkError>;

/// Failures while creating or deleting a link pair.
#[derive(Debug, Error)]
pub enum LinkError {
    /// The node has no persisted mapping set yet.
    #[error("No mapping set persisted for node '{node}'")]
    NodeNotMapped {
        /// The node id.
        node: String,
    },

    /// The interface resolves to no degree on the node.
    #[error("Interface '{interface}' maps to no degree on node '{node}'")]
    DegreeNotMapped {
        /// The node id.
        node: String,
        /// The neighbor-discovery interface name.
        interface: String,
    },

    /// The degree exists in the index but holds no TTP mappings, so
    /// its direction cannot be derived.
    #[error("Degree {degree} on node '{node}' has no TTP mappings")]
    NoDegreeMappings {
        /// The node id.
        node: String,
        /// The degree number.
        degree: u16,
    },

    /// The neighbor entry names no remote port, so the remote degree
    /// cannot be resolved.
    #[error("Neighbor entry on '{node}' interface '{interface}' carries no remote port id")]
    MissingRemotePort {
        /// The node id.
        node: String,
        /// The local interface name.
        interface: String,
    },

    /// An expected TTP mapping is absent from the node's set.
    #[error("Expected mapping '{lcp}' not found on node '{node}'")]
    LcpNotFound {
        /// The node id.
        node: String,
        /// The missing LCP name.
        lcp: String,
    },

    /// A store failure left one direction of a pair behind. The
    /// caller should retry the operation to restore symmetry.
    #[error("Link {link} left behind after partial {operation}: {message}")]
    ResidualLink {
        /// The surviving directed link.
        link: TopologyLink,
        /// The operation that was interrupted (`create` or `delete`).
        operation: &'static str,
        /// The underlying store error message.
        message: String,
    },

    /// Store read/write failed with no residual asymmetry.
    #[error("Link persistence failed: {0}")]
    Store(#[from] StoreError),

    /// Remote read failed.
    #[error("Device read failed: {0}")]
    Device(#[from] DeviceError),
}

/// One failed neighbor-table entry during a discovery sweep. The
/// sweep continues past these; they are reported together at the end.
#[derive(Debug, Error)]
#[error("Neighbor '{remote_node}' heard on '{node}' interface '{local_interface}': {source}")]
pub struct DiscoveryError {
    /// The node being swept.
    pub node: String,
    /// Local interface the neighbor was heard on.
    pub local_interface: String,
    /// The remote system name.
    pub remote_node: String,
    /// What went wrong for this entry.
    #[source]
    pub source: LinkError,
}
