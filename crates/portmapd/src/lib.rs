//! Port mapping builder daemon.
//!
//! This crate implements `portmapd`, which translates the raw hardware
//! inventory of an optical network element into its canonical logical
//! view: one mapping record per logical connection point (LCP), plus
//! the circuit-pack-to-degree index consumed by link discovery.
//!
//! # Responsibilities
//!
//! - Read device info, degrees, SRGs, circuit packs and ports through
//!   the [`otn_common::DeviceReader`] seam
//! - Assign canonical LCP names (`DEG{n}-TTP-*`, `SRG{n}-PP{k}-*`,
//!   `XPDR1-CLIENT{k}`, `XPDR1-NETWORK{k}`)
//! - Validate partner-port symmetry for unidirectional pairs
//! - Annotate degree TTPs with their OMS/OTS interfaces
//! - Commit node info, the CpToDegree index and the mapping set
//!   through the [`otn_common::MappingStore`] seam
//!
//! # Example
//!
//! ```ignore
//! use portmapd::{PortMappingBuilder, PortmapConfig};
//!
//! let builder = PortMappingBuilder::new(reader, classifier, store, config);
//! let outcome = builder.build_mapping("ROADM-A").await?;
//! ```

mod builder;
mod config;
mod error;
mod lcp;

pub use builder::{BuildOutcome, PortMappingBuilder};
pub use config::{ConfigError, PortmapConfig};
pub use error::{MappingDiag, MappingError, MappingResult};
pub use lcp::{degree_ttp, srg_pp, xpdr_client, xpdr_network, XPDR_TOKEN};
