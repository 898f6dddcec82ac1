//! PortMappingBuilder - translates a node's raw hardware inventory
//! into its canonical set of logical connection points.
//!
//! The builder reads the device's operational subtrees through the
//! [`DeviceReader`] seam, correlates degree/SRG/transponder port data,
//! and commits the resulting [`NodeMappingSet`] through the
//! [`MappingStore`]. Per-port configuration problems are recoverable
//! and only omit the offending LCP; conditions listed in
//! [`MappingError`] abort the build.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, info, instrument, warn};

use otn_common::device::{DeviceReader, InterfaceClass, InterfaceClassifier};
use otn_common::inventory::{DeviceInfo, LldpAdminStatus, Port, PortKey};
use otn_common::store::MappingStore;
use otn_common::types::{
    CpToDegree, Direction, InventoryVersion, Mapping, NodeInfo, NodeMappingSet, NodeType,
    PortQual, PortRole,
};
use otn_common::DeviceError;

use crate::config::PortmapConfig;
use crate::error::{MappingDiag, MappingError, MappingResult};
use crate::lcp;

/// Result of a successful (possibly partial) build: the mapping set
/// as committed, plus the recoverable diagnostics accumulated along
/// the way.
#[derive(Debug)]
pub struct BuildOutcome {
    /// The mapping set, as persisted.
    pub set: NodeMappingSet,
    /// Per-item configuration problems that omitted an LCP.
    pub diags: Vec<MappingDiag>,
}

/// Accumulator local to one build call. Finalized once and returned;
/// never shared between concurrent builds.
#[derive(Default)]
struct BuildAcc {
    mappings: Vec<Mapping>,
    diags: Vec<MappingDiag>,
}

impl BuildAcc {
    fn diag(&mut self, diag: MappingDiag) {
        warn!("{diag}");
        self.diags.push(diag);
    }
}

/// Port mapping builder.
///
/// Builds for distinct nodes are independent; a single builder can be
/// shared across tasks. Within one build the per-degree and per-SRG
/// subtree reads are issued concurrently, while the merge into the
/// accumulator stays single-writer.
pub struct PortMappingBuilder<R, C, S> {
    reader: Arc<R>,
    classifier: Arc<C>,
    store: Arc<S>,
    config: PortmapConfig,
}

impl<R, C, S> PortMappingBuilder<R, C, S>
where
    R: DeviceReader,
    C: InterfaceClassifier,
    S: MappingStore,
{
    /// Creates a builder over the given device, classifier and store
    /// handles.
    pub fn new(reader: Arc<R>, classifier: Arc<C>, store: Arc<S>, config: PortmapConfig) -> Self {
        Self {
            reader,
            classifier,
            store,
            config,
        }
    }

    /// Builds and persists the full mapping set for a node.
    #[instrument(skip(self), fields(node = %node_id))]
    pub async fn build_mapping(&self, node_id: &str) -> MappingResult<BuildOutcome> {
        info!("Building port mapping for {}", node_id);

        let device_info = match self.reader.device_info(node_id).await {
            Ok(Some(info)) => info,
            Ok(None) => {
                return Err(MappingError::DeviceUnreachable {
                    node: node_id.to_string(),
                })
            }
            Err(DeviceError::Timeout { .. }) => {
                return Err(MappingError::DeviceUnreachable {
                    node: node_id.to_string(),
                })
            }
            Err(e) => return Err(e.into()),
        };

        let node_info = node_info_from(node_id, &device_info)?;
        self.store.merge_node_info(node_info.clone()).await?;

        let mut acc = BuildAcc::default();
        let mut set = NodeMappingSet::new(node_info);

        match set.info.node_type {
            NodeType::Roadm => {
                let cp_entries = self
                    .map_degree_ttps(node_id, &device_info, &mut acc)
                    .await?;
                for entry in cp_entries {
                    set.cp_to_degree
                        .insert(entry.circuit_pack_name.clone(), entry);
                }
                self.map_srg_pps(node_id, &device_info, &mut acc).await?;
            }
            NodeType::Transponder => {
                self.map_xpdr(node_id, &mut acc).await?;
            }
        }

        self.store
            .merge_mappings(node_id, acc.mappings.clone())
            .await?;
        for mapping in acc.mappings {
            set.mappings
                .insert(mapping.logical_connection_point.clone(), mapping);
        }

        info!(
            mappings = set.mappings.len(),
            diags = acc.diags.len(),
            "Port mapping complete for {}",
            node_id
        );
        Ok(BuildOutcome {
            set,
            diags: acc.diags,
        })
    }

    /// Refreshes one mapping by re-reading its supporting port, and
    /// merges the result into the persisted set. LCP, role and the
    /// partner/cross-connect references are preserved.
    #[instrument(skip(self, existing), fields(node = %node_id, lcp = %existing.logical_connection_point))]
    pub async fn update_mapping(
        &self,
        node_id: &str,
        existing: &Mapping,
    ) -> MappingResult<Mapping> {
        let port = self
            .reader
            .port(
                node_id,
                &existing.supporting_circuit_pack,
                &existing.supporting_port,
            )
            .await?
            .ok_or_else(|| {
                MappingError::port_not_found(
                    node_id,
                    &existing.supporting_circuit_pack,
                    &existing.supporting_port,
                )
            })?;

        let mut acc = BuildAcc::default();
        let mut refreshed = if existing.port_role == PortRole::DegreeTtp {
            self.ttp_mapping(
                node_id,
                &port,
                &existing.supporting_circuit_pack,
                existing.logical_connection_point.clone(),
                &mut acc,
            )
            .await
        } else {
            Mapping::new(
                node_id,
                existing.logical_connection_point.clone(),
                existing.supporting_circuit_pack.clone(),
                port.port_name.clone(),
                port.port_direction,
                existing.port_role,
            )
        };
        refreshed.partner_lcp = existing.partner_lcp.clone();
        refreshed.connection_map_lcp = existing.connection_map_lcp.clone();

        info!(
            "Updating mapping {} for {} from refreshed port data",
            existing.logical_connection_point, node_id
        );
        self.store.merge_mapping(node_id, refreshed.clone()).await?;
        Ok(refreshed)
    }

    /// Fetches the populated degree subtrees 1..=max concurrently.
    async fn fetch_degrees(
        &self,
        node_id: &str,
        max_degrees: u16,
    ) -> MappingResult<BTreeMap<u16, otn_common::inventory::Degree>> {
        let reads = (1..=max_degrees)
            .map(|number| async move { (number, self.reader.degree(node_id, number).await) });
        let mut degrees = BTreeMap::new();
        for (number, result) in join_all(reads).await {
            if let Some(degree) = result? {
                degrees.insert(number, degree);
            }
        }
        debug!("Node {} has {} degrees", node_id, degrees.len());
        Ok(degrees)
    }

    /// Fetches the populated SRG subtrees 1..=max concurrently.
    async fn fetch_srgs(
        &self,
        node_id: &str,
        max_srgs: u16,
    ) -> MappingResult<BTreeMap<u16, Vec<String>>> {
        let reads = (1..=max_srgs).map(|number| async move {
            (number, self.reader.shared_risk_group(node_id, number).await)
        });
        let mut srgs = BTreeMap::new();
        for (number, result) in join_all(reads).await {
            if let Some(srg) = result? {
                srgs.insert(number, srg.circuit_packs);
            }
        }
        debug!("Node {} has {} SRGs", node_id, srgs.len());
        Ok(srgs)
    }

    /// Builds the circuit-pack to neighbor-discovery-interface index:
    /// admin-enabled LLDP interfaces resolved to their supporting
    /// circuit pack and, transitively, its parent pack.
    async fn eth_interface_index(&self, node_id: &str) -> MappingResult<HashMap<String, String>> {
        let Some(configs) = self.reader.lldp_port_configs(node_id).await? else {
            warn!("No LLDP port configuration found for {}", node_id);
            return Ok(HashMap::new());
        };

        let mut index = HashMap::new();
        for config in configs {
            if config.admin_status != LldpAdminStatus::TxAndRx {
                continue;
            }
            let Some(interface) = self.reader.interface(node_id, &config.if_name).await? else {
                continue;
            };
            let Some(cp_name) = interface.supporting_circuit_pack else {
                continue;
            };
            index.insert(cp_name.clone(), config.if_name.clone());
            if let Some(pack) = self.reader.circuit_pack(node_id, &cp_name).await? {
                if let Some(parent) = pack.parent_circuit_pack {
                    index.insert(parent, config.if_name.clone());
                }
            }
        }
        Ok(index)
    }

    /// Degree-TTP mapping step. Also builds and commits the
    /// CpToDegree index; that write is decoupled from the mapping
    /// commit so a later degree-port failure does not lose it.
    async fn map_degree_ttps(
        &self,
        node_id: &str,
        device_info: &DeviceInfo,
        acc: &mut BuildAcc,
    ) -> MappingResult<Vec<CpToDegree>> {
        let max_degrees = device_info.max_degrees.unwrap_or(self.config.max_degrees);
        let degrees = self.fetch_degrees(node_id, max_degrees).await?;
        let if_index = self.eth_interface_index(node_id).await?;

        let mut cp_entries = Vec::new();
        for degree in degrees.values() {
            for cp_name in &degree.circuit_packs {
                cp_entries.push(CpToDegree {
                    circuit_pack_name: cp_name.clone(),
                    degree_number: degree.degree_number,
                    interface_name: if_index.get(cp_name).cloned(),
                });
            }
        }
        self.store
            .set_cp_to_degree(node_id, cp_entries.clone())
            .await?;

        for (number, degree) in &degrees {
            match degree.connection_ports.as_slice() {
                [single] => {
                    let port = self
                        .reader
                        .port(node_id, &single.circuit_pack_name, &single.port_name)
                        .await?
                        .ok_or_else(|| {
                            MappingError::port_not_found(
                                node_id,
                                &single.circuit_pack_name,
                                &single.port_name,
                            )
                        })?;
                    let Some(qual) = port.port_qual else {
                        acc.diag(MappingDiag::MissingPortQual {
                            circuit_pack: single.circuit_pack_name.clone(),
                            port: single.port_name.clone(),
                        });
                        continue;
                    };
                    if qual != PortQual::RoadmExternal
                        || port.port_direction != Direction::Bidirectional
                    {
                        acc.diag(MappingDiag::InvalidTtpPort {
                            degree: *number,
                            circuit_pack: single.circuit_pack_name.clone(),
                            port: single.port_name.clone(),
                        });
                        continue;
                    }
                    let lcp = lcp::degree_ttp(*number, Direction::Bidirectional);
                    info!(
                        "{} : Logical Connection Point for {} {} is {}",
                        node_id, single.circuit_pack_name, port.port_name, lcp
                    );
                    let mapping = self
                        .ttp_mapping(node_id, &port, &single.circuit_pack_name, lcp, acc)
                        .await;
                    acc.mappings.push(mapping);
                }
                [first, second] => {
                    let port1 = self
                        .reader
                        .port(node_id, &first.circuit_pack_name, &first.port_name)
                        .await?
                        .ok_or_else(|| {
                            MappingError::port_not_found(
                                node_id,
                                &first.circuit_pack_name,
                                &first.port_name,
                            )
                        })?;
                    let port2 = self
                        .reader
                        .port(node_id, &second.circuit_pack_name, &second.port_name)
                        .await?
                        .ok_or_else(|| {
                            MappingError::port_not_found(
                                node_id,
                                &second.circuit_pack_name,
                                &second.port_name,
                            )
                        })?;

                    if port1.port_qual != Some(PortQual::RoadmExternal)
                        || port2.port_qual != Some(PortQual::RoadmExternal)
                    {
                        acc.diag(MappingDiag::InvalidTtpPort {
                            degree: *number,
                            circuit_pack: first.circuit_pack_name.clone(),
                            port: port1.port_name.clone(),
                        });
                        continue;
                    }
                    // Mutual declaration with strictly opposite
                    // directions; direction is symmetric, so it is
                    // checked once.
                    if !check_partner_port(&first.circuit_pack_name, &port1, &port2)
                        || !check_partner_no_dir(&second.circuit_pack_name, &port2, &port1)
                    {
                        acc.diag(MappingDiag::PartnerMismatch {
                            circuit_pack: first.circuit_pack_name.clone(),
                            port: port1.port_name.clone(),
                            partner_circuit_pack: second.circuit_pack_name.clone(),
                            partner_port: port2.port_name.clone(),
                        });
                        continue;
                    }

                    for (conn, port) in [(first, &port1), (second, &port2)] {
                        let lcp = lcp::degree_ttp(*number, port.port_direction);
                        info!(
                            "{} : Logical Connection Point for {} {} is {}",
                            node_id, conn.circuit_pack_name, port.port_name, lcp
                        );
                        let mapping = self
                            .ttp_mapping(node_id, port, &conn.circuit_pack_name, lcp, acc)
                            .await;
                        acc.mappings.push(mapping);
                    }
                }
                other => {
                    acc.diag(MappingDiag::BadConnectionPortCount {
                        degree: *number,
                        count: other.len(),
                    });
                }
            }
        }
        Ok(cp_entries)
    }

    /// Builds a degree-TTP mapping, annotated with the OMS/OTS
    /// interfaces provisioned on the port.
    async fn ttp_mapping(
        &self,
        node_id: &str,
        port: &Port,
        circuit_pack: &str,
        lcp: String,
        acc: &mut BuildAcc,
    ) -> Mapping {
        let mut mapping = Mapping::new(
            node_id,
            lcp,
            circuit_pack,
            port.port_name.clone(),
            port.port_direction,
            PortRole::DegreeTtp,
        );
        for if_name in &port.interfaces {
            match self.classifier.classify(node_id, if_name).await {
                Ok(InterfaceClass::Oms) => mapping.supporting_oms = Some(if_name.clone()),
                Ok(InterfaceClass::Ots) => mapping.supporting_ots = Some(if_name.clone()),
                Ok(InterfaceClass::Other) => {}
                Err(e) => acc.diag(MappingDiag::InterfaceClassification {
                    interface: if_name.clone(),
                    message: e.to_string(),
                }),
            }
        }
        mapping
    }

    /// SRG-PP mapping step. Port indices are sequential per SRG in
    /// ascending lexicographic port-name order, which keeps the names
    /// reproducible across runs on unchanged inventory.
    async fn map_srg_pps(
        &self,
        node_id: &str,
        device_info: &DeviceInfo,
        acc: &mut BuildAcc,
    ) -> MappingResult<()> {
        let max_srgs = device_info.max_srgs.unwrap_or(self.config.max_srgs);
        let srgs = self.fetch_srgs(node_id, max_srgs).await?;

        for (srg_number, cp_names) in &srgs {
            let mut port_index: u16 = 1;
            let mut handled: HashSet<String> = HashSet::new();

            for cp_name in cp_names {
                let pack = self.reader.circuit_pack(node_id, cp_name).await?;
                let Some(pack) = pack.filter(|p| !p.ports.is_empty()) else {
                    acc.diag(MappingDiag::CircuitPackUnusable {
                        circuit_pack: cp_name.clone(),
                    });
                    continue;
                };

                let mut ports = pack.ports;
                ports.sort_by(|a, b| a.port_name.cmp(&b.port_name));

                for port in &ports {
                    let key = format!("{}-{}", cp_name, port.port_name);
                    let Some(qual) = port.port_qual else {
                        continue;
                    };
                    if qual != PortQual::RoadmExternal {
                        debug!(
                            "{} : port {} on {} is not roadm-external, skipping",
                            node_id, port.port_name, cp_name
                        );
                        continue;
                    }
                    if handled.contains(&key) {
                        debug!(
                            "{} : port {} on {} already handled",
                            node_id, port.port_name, cp_name
                        );
                        continue;
                    }

                    match port.port_direction {
                        Direction::Bidirectional => {
                            let lcp = lcp::srg_pp(*srg_number, port_index, port.port_direction);
                            info!(
                                "{} : Logical Connection Point for {} {} is {}",
                                node_id, cp_name, port.port_name, lcp
                            );
                            acc.mappings.push(Mapping::new(
                                node_id,
                                lcp,
                                cp_name.clone(),
                                port.port_name.clone(),
                                port.port_direction,
                                PortRole::SrgPp,
                            ));
                            port_index += 1;
                            handled.insert(key);
                        }
                        Direction::Tx | Direction::Rx => {
                            // A rejected unidirectional port consumes
                            // its index slot on every rejection path,
                            // keeping later PP numbers stable when the
                            // pair is repaired.
                            let Some(partner) = &port.partner_port else {
                                acc.diag(MappingDiag::MissingPartner {
                                    circuit_pack: cp_name.clone(),
                                    port: port.port_name.clone(),
                                });
                                port_index += 1;
                                continue;
                            };
                            let partner_obj = self
                                .reader
                                .port(node_id, &partner.circuit_pack_name, &partner.port_name)
                                .await?;
                            let partner_obj = partner_obj
                                .filter(|p| p.port_qual == Some(PortQual::RoadmExternal));
                            let Some(port2) = partner_obj else {
                                acc.diag(MappingDiag::PartnerMismatch {
                                    circuit_pack: cp_name.clone(),
                                    port: port.port_name.clone(),
                                    partner_circuit_pack: partner.circuit_pack_name.clone(),
                                    partner_port: partner.port_name.clone(),
                                });
                                port_index += 1;
                                continue;
                            };
                            if !check_partner_port(cp_name, port, &port2) {
                                acc.diag(MappingDiag::PartnerMismatch {
                                    circuit_pack: cp_name.clone(),
                                    port: port.port_name.clone(),
                                    partner_circuit_pack: partner.circuit_pack_name.clone(),
                                    partner_port: port2.port_name.clone(),
                                });
                                port_index += 1;
                                continue;
                            }

                            let lcp1 = lcp::srg_pp(*srg_number, port_index, port.port_direction);
                            let lcp2 = lcp::srg_pp(*srg_number, port_index, port2.port_direction);
                            info!(
                                "{} : Logical Connection Points for {} {}/{} are {}/{}",
                                node_id, cp_name, port.port_name, port2.port_name, lcp1, lcp2
                            );
                            acc.mappings.push(Mapping::new(
                                node_id,
                                lcp1,
                                cp_name.clone(),
                                port.port_name.clone(),
                                port.port_direction,
                                PortRole::SrgPp,
                            ));
                            acc.mappings.push(Mapping::new(
                                node_id,
                                lcp2,
                                partner.circuit_pack_name.clone(),
                                port2.port_name.clone(),
                                port2.port_direction,
                                PortRole::SrgPp,
                            ));
                            port_index += 1;
                            handled.insert(key);
                            handled.insert(format!(
                                "{}-{}",
                                partner.circuit_pack_name, port2.port_name
                            ));
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Transponder mapping step: client/network classification with
    /// sequential index assignment, then a second pass that resolves
    /// connection-map associations over the finished LCP index.
    async fn map_xpdr(&self, node_id: &str, acc: &mut BuildAcc) -> MappingResult<()> {
        let mut packs = self.reader.circuit_packs(node_id).await?;
        if packs.is_empty() {
            return Err(MappingError::NoCircuitPacks {
                node: node_id.to_string(),
            });
        }
        packs.sort_by(|a, b| a.circuit_pack_name.cmp(&b.circuit_pack_name));

        let mut client_index: u32 = 1;
        let mut network_index: u32 = 1;
        let mut lcp_by_port_key: HashMap<String, String> = HashMap::new();
        let mut mapping_by_lcp: BTreeMap<String, Mapping> = BTreeMap::new();

        for pack in &packs {
            let cp_name = &pack.circuit_pack_name;
            if pack.ports.is_empty() {
                warn!("Ports were not found for circuit pack {}", cp_name);
                continue;
            }
            let mut ports = pack.ports.clone();
            ports.sort_by(|a, b| a.port_name.cmp(&b.port_name));

            for port in &ports {
                let port_key = PortKey {
                    circuit_pack_name: cp_name.clone(),
                    port_name: port.port_name.clone(),
                }
                .flat();
                let Some(qual) = port.port_qual else {
                    acc.diag(MappingDiag::MissingPortQual {
                        circuit_pack: cp_name.clone(),
                        port: port.port_name.clone(),
                    });
                    continue;
                };

                match qual {
                    PortQual::XpdrClient => {
                        let lcp = lcp::xpdr_client(client_index);
                        lcp_by_port_key.insert(port_key, lcp.clone());
                        mapping_by_lcp.insert(
                            lcp.clone(),
                            Mapping::new(
                                node_id,
                                lcp,
                                cp_name.clone(),
                                port.port_name.clone(),
                                port.port_direction,
                                PortRole::XpdrClient,
                            ),
                        );
                        client_index += 1;
                    }
                    PortQual::XpdrNetwork
                        if port.port_direction == Direction::Bidirectional =>
                    {
                        let lcp = lcp::xpdr_network(network_index);
                        lcp_by_port_key.insert(port_key, lcp.clone());
                        mapping_by_lcp.insert(
                            lcp.clone(),
                            Mapping::new(
                                node_id,
                                lcp,
                                cp_name.clone(),
                                port.port_name.clone(),
                                port.port_direction,
                                PortRole::XpdrNetwork,
                            ),
                        );
                        network_index += 1;
                    }
                    PortQual::XpdrNetwork => {
                        let Some(partner) = &port.partner_port else {
                            acc.diag(MappingDiag::MissingPartner {
                                circuit_pack: cp_name.clone(),
                                port: port.port_name.clone(),
                            });
                            continue;
                        };
                        // The partner already claimed this pair.
                        if lcp_by_port_key.contains_key(&port_key) {
                            continue;
                        }

                        let partner_pack = packs
                            .iter()
                            .find(|p| p.circuit_pack_name == partner.circuit_pack_name);
                        let port2 = partner_pack.and_then(|p| {
                            p.ports
                                .iter()
                                .find(|candidate| candidate.port_name == partner.port_name)
                        });
                        let Some(port2) = port2 else {
                            acc.diag(MappingDiag::PartnerMismatch {
                                circuit_pack: cp_name.clone(),
                                port: port.port_name.clone(),
                                partner_circuit_pack: partner.circuit_pack_name.clone(),
                                partner_port: partner.port_name.clone(),
                            });
                            continue;
                        };
                        if !check_partner_port(cp_name, port, port2) {
                            acc.diag(MappingDiag::PartnerMismatch {
                                circuit_pack: cp_name.clone(),
                                port: port.port_name.clone(),
                                partner_circuit_pack: partner.circuit_pack_name.clone(),
                                partner_port: port2.port_name.clone(),
                            });
                            continue;
                        }

                        let lcp1 = lcp::xpdr_network(network_index);
                        let lcp2 = lcp::xpdr_network(network_index + 1);
                        if mapping_by_lcp.contains_key(&lcp1)
                            || mapping_by_lcp.contains_key(&lcp2)
                        {
                            acc.diag(MappingDiag::LcpAlreadyAssigned { lcp: lcp1 });
                            network_index += 2;
                            continue;
                        }

                        let partner_key = PortKey {
                            circuit_pack_name: partner.circuit_pack_name.clone(),
                            port_name: port2.port_name.clone(),
                        }
                        .flat();
                        lcp_by_port_key.insert(port_key, lcp1.clone());
                        lcp_by_port_key.insert(partner_key, lcp2.clone());

                        let mut m1 = Mapping::new(
                            node_id,
                            lcp1.clone(),
                            cp_name.clone(),
                            port.port_name.clone(),
                            port.port_direction,
                            PortRole::XpdrNetwork,
                        );
                        m1.partner_lcp = Some(lcp2.clone());
                        let mut m2 = Mapping::new(
                            node_id,
                            lcp2.clone(),
                            partner.circuit_pack_name.clone(),
                            port2.port_name.clone(),
                            port2.port_direction,
                            PortRole::XpdrNetwork,
                        );
                        m2.partner_lcp = Some(lcp1.clone());
                        mapping_by_lcp.insert(lcp1, m1);
                        mapping_by_lcp.insert(lcp2, m2);
                        network_index += 2;
                    }
                    PortQual::RoadmExternal => {
                        acc.diag(MappingDiag::UnsupportedPortQual {
                            circuit_pack: cp_name.clone(),
                            port: port.port_name.clone(),
                            qual: qual.as_str().to_string(),
                        });
                    }
                }
            }
        }

        // Second pass: resolve cross-connections against the finished
        // LCP index. The first-pass maps are no longer extended here.
        for entry in self.reader.connection_map(node_id).await? {
            let source_key = entry.source.flat();
            let Some(destination) = entry.destinations.first() else {
                continue;
            };
            let dest_key = destination.flat();
            let Some(source_lcp) = lcp_by_port_key.get(&source_key) else {
                acc.diag(MappingDiag::ConnectionMapSourceUnmapped {
                    source_key,
                    dest_key,
                });
                continue;
            };
            let dest_lcp = lcp_by_port_key.get(&dest_key).cloned();
            if let Some(mapping) = mapping_by_lcp.get_mut(source_lcp) {
                mapping.connection_map_lcp = dest_lcp;
            }
        }

        acc.mappings.extend(mapping_by_lcp.into_values());
        Ok(())
    }
}

/// True when `port2` declares (`circuit_pack_name`, `port1`) as its
/// partner, ignoring directions.
fn check_partner_no_dir(circuit_pack_name: &str, port1: &Port, port2: &Port) -> bool {
    match &port2.partner_port {
        Some(partner) => {
            partner.circuit_pack_name == circuit_pack_name && partner.port_name == port1.port_name
        }
        None => false,
    }
}

/// True when the two ports are mutual partners with strictly opposite
/// directions. A bidirectional port can never be part of a partner
/// pair.
fn check_partner_port(circuit_pack_name: &str, port1: &Port, port2: &Port) -> bool {
    check_partner_no_dir(circuit_pack_name, port1, port2)
        && port1.port_direction.is_opposite(port2.port_direction)
}

/// Derives the node metadata from the root info subtree. The node
/// type is mandatory; everything else degrades gracefully.
fn node_info_from(node_id: &str, info: &DeviceInfo) -> MappingResult<NodeInfo> {
    let node_type = info.node_type.ok_or_else(|| MappingError::MissingNodeType {
        node: node_id.to_string(),
    })?;
    Ok(NodeInfo {
        node_id: node_id.to_string(),
        version: InventoryVersion::V121,
        node_type,
        site_code: info
            .clli
            .clone()
            .filter(|clli| !clli.is_empty())
            .unwrap_or_else(|| "defaultCLLI".to_string()),
        vendor: info.vendor.clone(),
        model: info.model.clone(),
        mgmt_address: info.ip_address.clone(),
    })
}
