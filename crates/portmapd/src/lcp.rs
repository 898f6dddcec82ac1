//! Logical connection point name construction.
//!
//! LCP names are the stable, canonical identifiers the rest of the
//! system keys on; the format must not drift between releases.

use otn_common::Direction;

/// Transponder prefix. Inventories handled here expose one logical
/// transponder per node.
pub const XPDR_TOKEN: &str = "XPDR1";

/// Degree termination point: `DEG{n}-TTP-{TX|RX|TXRX}`.
pub fn degree_ttp(degree: u16, direction: Direction) -> String {
    format!("DEG{degree}-TTP-{}", direction.lcp_suffix())
}

/// SRG termination point: `SRG{n}-PP{k}-{TX|RX|TXRX}`.
pub fn srg_pp(srg: u16, port_index: u16, direction: Direction) -> String {
    format!("SRG{srg}-PP{port_index}-{}", direction.lcp_suffix())
}

/// Transponder client port: `XPDR1-CLIENT{k}`.
pub fn xpdr_client(index: u32) -> String {
    format!("{XPDR_TOKEN}-CLIENT{index}")
}

/// Transponder network port: `XPDR1-NETWORK{k}`.
pub fn xpdr_network(index: u32) -> String {
    format!("{XPDR_TOKEN}-NETWORK{index}")
}
