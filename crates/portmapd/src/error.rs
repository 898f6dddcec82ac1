//! Error and diagnostic types for the port mapping builder.
//!
//! Fatal conditions abort the whole build ([`MappingError`]);
//! per-port configuration problems are recoverable, accumulated as
//! [`MappingDiag`] and returned alongside the partial mapping set.

use thiserror::Error;

use otn_common::{DeviceError, StoreError};

/// Result type alias for builder operations.
pub type MappingResult<T> = Result<T, MappingError>;

/// Build-aborting errors. No partial mapping set is produced beyond
/// what was already committed by earlier decoupled writes.
#[derive(Debug, Error)]
pub enum MappingError {
    /// Root info subtree absent or timed out.
    #[error("Device info subtree is absent for node '{node}'")]
    DeviceUnreachable {
        /// The node id.
        node: String,
    },

    /// The mandatory node-type field is missing.
    #[error("Node type field is missing for node '{node}'")]
    MissingNodeType {
        /// The node id.
        node: String,
    },

    /// A transponder without any circuit packs cannot be mapped.
    #[error("Circuit packs are not present for node '{node}'")]
    NoCircuitPacks {
        /// The node id.
        node: String,
    },

    /// A port listed in the inventory could not be read back.
    #[error("No port '{port}' on circuit pack '{circuit_pack}' for node '{node}'")]
    PortNotFound {
        /// The node id.
        node: String,
        /// The circuit-pack name.
        circuit_pack: String,
        /// The port name.
        port: String,
    },

    /// Remote read failed.
    #[error("Device read failed: {0}")]
    Device(#[from] DeviceError),

    /// Store write failed.
    #[error("Mapping persistence failed: {0}")]
    Persistence(#[from] StoreError),
}

impl MappingError {
    /// Creates a port-not-found error.
    pub fn port_not_found(
        node: impl Into<String>,
        circuit_pack: impl Into<String>,
        port: impl Into<String>,
    ) -> Self {
        Self::PortNotFound {
            node: node.into(),
            circuit_pack: circuit_pack.into(),
            port: port.into(),
        }
    }
}

/// Recoverable per-item configuration diagnostics. The offending
/// LCP/port is omitted and the build continues.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MappingDiag {
    /// Port has no qualifier and cannot be classified.
    #[error("Port '{port}' on '{circuit_pack}' has no port qualifier")]
    MissingPortQual {
        /// Circuit-pack name.
        circuit_pack: String,
        /// Port name.
        port: String,
    },

    /// Degree connection port with a wrong qualifier or direction.
    #[error(
        "Cannot map degree {degree} port '{port}' on '{circuit_pack}': \
         bad port-qual or port-direction"
    )]
    InvalidTtpPort {
        /// Degree number.
        degree: u16,
        /// Circuit-pack name.
        circuit_pack: String,
        /// Port name.
        port: String,
    },

    /// A degree listing neither one nor two connection ports.
    #[error("Degree {degree} has {count} connection ports; expected 1 or 2")]
    BadConnectionPortCount {
        /// Degree number.
        degree: u16,
        /// Observed connection-port count.
        count: usize,
    },

    /// Unidirectional port without a declared partner.
    #[error("Port '{port}' on '{circuit_pack}' is unidirectional but declares no partner")]
    MissingPartner {
        /// Circuit-pack name.
        circuit_pack: String,
        /// Port name.
        port: String,
    },

    /// The declared partner is absent, has the wrong qualifier, does
    /// not point back, or is not of opposite direction.
    #[error(
        "Port '{partner_port}' on '{partner_circuit_pack}' is not a valid partner \
         of '{port}' on '{circuit_pack}'"
    )]
    PartnerMismatch {
        /// Circuit-pack name of the rejected port.
        circuit_pack: String,
        /// Rejected port name.
        port: String,
        /// Declared partner circuit pack.
        partner_circuit_pack: String,
        /// Declared partner port name.
        partner_port: String,
    },

    /// Port qualifier unsupported in this mapping step.
    #[error("Port '{port}' on '{circuit_pack}' has unsupported qualifier '{qual}'")]
    UnsupportedPortQual {
        /// Circuit-pack name.
        circuit_pack: String,
        /// Port name.
        port: String,
        /// The qualifier as reported.
        qual: String,
    },

    /// A circuit pack referenced by an SRG is absent or empty.
    #[error("Circuit pack '{circuit_pack}' not found or without ports")]
    CircuitPackUnusable {
        /// Circuit-pack name.
        circuit_pack: String,
    },

    /// Network LCP index already consumed for this pair.
    #[error("Mapping already exists for '{lcp}'")]
    LcpAlreadyAssigned {
        /// The colliding LCP name.
        lcp: String,
    },

    /// Connection-map source port has no assigned LCP.
    #[error("Connection-map source '{source_key}' (destination '{dest_key}') has no LCP")]
    ConnectionMapSourceUnmapped {
        /// Flat source port key.
        source_key: String,
        /// Flat destination port key.
        dest_key: String,
    },

    /// Interface classification failed; annotation skipped.
    #[error("Could not classify interface '{interface}': {message}")]
    InterfaceClassification {
        /// Interface name.
        interface: String,
        /// Underlying error message.
        message: String,
    },
}
