//! Topology link discovery daemon.
//!
//! This crate implements `topolinkd`, which turns neighbor-discovery
//! announcements into topology links between the degrees of adjacent
//! optical network elements.
//!
//! # Responsibilities
//!
//! - Sweep a node's neighbor table through the
//!   [`otn_common::DeviceReader`] seam
//! - Resolve each adjacency to degree TTP mappings on both ends via
//!   the persisted CpToDegree index
//! - Create and delete links strictly as symmetric A→Z / Z→A pairs,
//!   serialized per unordered node pair
//!
//! # Example
//!
//! ```ignore
//! use topolinkd::LinkDiscovery;
//!
//! let disco = LinkDiscovery::new(reader, store);
//! let report = disco.discover_neighbor_links("ROADM-A").await?;
//! ```

mod discovery;
mod error;

pub use discovery::{DiscoveryReport, LinkDiscovery, LinkPair};
pub use error::{DiscoveryError, LinkError, LinkResult};
