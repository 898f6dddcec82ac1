//! Common infrastructure for the transport-netmodel daemons.
//!
//! This crate provides the shared pieces used by `portmapd` and
//! `topolinkd`:
//!
//! - [`types`]: the canonical network model (logical connection points,
//!   node mapping sets, topology links)
//! - [`inventory`]: the raw hardware inventory as reported by a device
//! - [`device`]: the [`DeviceReader`] seam to remote inventory access,
//!   plus the per-read timeout wrapper
//! - [`store`]: the [`MappingStore`] seam to durable storage, with an
//!   in-memory implementation
//! - [`hash`]: FNV-1 64-bit hashing for stable LCP identifiers
//! - [`mock`]: an in-memory device fixture for tests
//!
//! # Architecture
//!
//! The daemons follow this pattern:
//!
//! 1. `portmapd` reads a node's inventory through [`DeviceReader`] and
//!    translates it into a [`types::NodeMappingSet`]
//! 2. The mapping set is committed through [`MappingStore`]
//! 3. `topolinkd` correlates neighbor-discovery data with two stored
//!    mapping sets and materializes [`types::TopologyLink`] pairs

pub mod device;
pub mod error;
pub mod hash;
pub mod inventory;
pub mod mock;
pub mod store;
pub mod types;

// Re-export commonly used items at crate root
pub use device::{DeviceReader, InterfaceClass, InterfaceClassifier, Timed};
pub use error::{DeviceError, DeviceResult, StoreError, StoreResult};
pub use store::{MappingStore, MemoryStore};
pub use types::{
    CpToDegree, Direction, InventoryVersion, Mapping, NodeInfo, NodeMappingSet, NodeType,
    PortQual, PortRole, TopologyLink,
};
