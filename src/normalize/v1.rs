//! v1.0 wire shapes (`PrismGateway/services/rest/v1/`)
//!
//! Only the fields that reach a canonical record are declared; the dozens of
//! other structures a v1.0 cluster carries (rackable units, public keys,
//! security compliance config, ...) are ignored by serde.

use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;

use super::lenient::{self, OneOrMany};
use super::model::{ClusterSummary, NicBinding, RedundancyState, VmSummary};
use super::WireEntity;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RedundancyStatus {
    #[serde(default, deserialize_with = "lenient::value")]
    k_cassandra_prepare_done: bool,
    #[serde(default, deserialize_with = "lenient::value")]
    k_zookeeper_prepare_done: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClusterRedundancyState {
    #[serde(default, deserialize_with = "lenient::value")]
    current_redundancy_factor: u32,
    #[serde(default, deserialize_with = "lenient::value")]
    desired_redundancy_factor: u32,
    #[serde(default, deserialize_with = "lenient::value")]
    redundancy_status: RedundancyStatus,
}

/// One element of `GET v1/clusters` `entities`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ClusterEntity {
    #[serde(default, deserialize_with = "lenient::value")]
    id: String,
    #[serde(default, deserialize_with = "lenient::value")]
    uuid: String,
    #[serde(default, deserialize_with = "lenient::value")]
    name: String,
    #[serde(
        default,
        rename = "clusterExternalIPAddress",
        deserialize_with = "lenient::value"
    )]
    cluster_external_ip_address: String,
    #[serde(
        default,
        rename = "clusterExternalDataServicesIPAddress",
        deserialize_with = "lenient::value"
    )]
    cluster_external_data_services_ip_address: String,
    #[serde(default, deserialize_with = "lenient::value")]
    num_nodes: u32,
    #[serde(default, deserialize_with = "lenient::value")]
    version: String,
    #[serde(default, deserialize_with = "lenient::value")]
    full_version: String,
    #[serde(default, deserialize_with = "lenient::value")]
    ncc_version: String,
    #[serde(default, deserialize_with = "lenient::value")]
    timezone: String,
    #[serde(default, deserialize_with = "lenient::string_list")]
    hypervisor_types: Vec<String>,
    #[serde(default, deserialize_with = "lenient::string_list")]
    name_servers: Vec<String>,
    #[serde(default, deserialize_with = "lenient::string_list")]
    ntp_servers: Vec<String>,
    #[serde(default, deserialize_with = "lenient::value")]
    cluster_redundancy_state: ClusterRedundancyState,
    #[serde(default, deserialize_with = "lenient::telemetry")]
    stats: BTreeMap<String, String>,
    #[serde(default, deserialize_with = "lenient::telemetry")]
    usage_stats: BTreeMap<String, String>,
}

impl WireEntity for ClusterEntity {
    type Record = ClusterSummary;

    fn into_record(self) -> ClusterSummary {
        let redundancy = self.cluster_redundancy_state;
        ClusterSummary {
            id: self.id,
            uuid: self.uuid,
            name: self.name,
            external_ip: self.cluster_external_ip_address,
            external_data_services_ip: self.cluster_external_data_services_ip_address,
            num_nodes: self.num_nodes,
            aos_version: self.version,
            ncc_version: self.ncc_version,
            redundancy: RedundancyState {
                current_redundancy_factor: redundancy.current_redundancy_factor,
                desired_redundancy_factor: redundancy.desired_redundancy_factor,
                cassandra_prepare_done: redundancy.redundancy_status.k_cassandra_prepare_done,
                zookeeper_prepare_done: redundancy.redundancy_status.k_zookeeper_prepare_done,
            },
            full_version: self.full_version,
            timezone: self.timezone,
            hypervisor_types: self.hypervisor_types,
            name_servers: self.name_servers,
            ntp_servers: self.ntp_servers,
            stats: self.stats,
            usage_stats: self.usage_stats,
        }
    }
}

/// One element of `GET v1/vms` `entities`.
///
/// v1.0 has no per-NIC breakdown; all addresses hang off the VM in
/// `ipAddresses`, as a single string or a list.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct VmEntity {
    #[serde(default, deserialize_with = "lenient::non_empty_string")]
    name: Option<String>,
    #[serde(default, deserialize_with = "lenient::non_empty_string")]
    vm_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::non_empty_string")]
    uuid: Option<String>,
    #[serde(default, deserialize_with = "lenient::value")]
    ip_addresses: Option<OneOrMany>,
}

impl WireEntity for VmEntity {
    type Record = VmSummary;

    fn into_record(self) -> VmSummary {
        let addresses = self
            .ip_addresses
            .map(OneOrMany::into_set)
            .unwrap_or_default();

        let nics = if addresses.is_empty() {
            Vec::new()
        } else {
            vec![NicBinding {
                is_managed_by_hypervisor: false,
                requested_ip_address: None,
                assigned_ip_addresses: addresses,
                mac_address: None,
            }]
        };

        VmSummary {
            name: self.name.or(self.vm_name).unwrap_or_default(),
            uuid: self.uuid,
            nics,
        }
    }
}

/// Render clusters as a minimal v1.0 `clusters` document.
///
/// Normalizing the result yields the same summaries.
pub fn encode_cluster_listing(clusters: &[ClusterSummary]) -> Value {
    let entities: Vec<Value> = clusters
        .iter()
        .map(|c| {
            json!({
                "id": c.id,
                "uuid": c.uuid,
                "name": c.name,
                "clusterExternalIPAddress": c.external_ip,
                "clusterExternalDataServicesIPAddress": c.external_data_services_ip,
                "numNodes": c.num_nodes,
                "version": c.aos_version,
                "fullVersion": c.full_version,
                "nccVersion": c.ncc_version,
                "timezone": c.timezone,
                "hypervisorTypes": c.hypervisor_types,
                "nameServers": c.name_servers,
                "ntpServers": c.ntp_servers,
                "clusterRedundancyState": {
                    "currentRedundancyFactor": c.redundancy.current_redundancy_factor,
                    "desiredRedundancyFactor": c.redundancy.desired_redundancy_factor,
                    "redundancyStatus": {
                        "kCassandraPrepareDone": c.redundancy.cassandra_prepare_done,
                        "kZookeeperPrepareDone": c.redundancy.zookeeper_prepare_done
                    }
                },
                "stats": c.stats,
                "usageStats": c.usage_stats
            })
        })
        .collect();

    json!({
        "metadata": {
            "grandTotalEntities": entities.len(),
            "totalEntities": entities.len(),
            "count": entities.len(),
            "page": 1,
            "startIndex": if entities.is_empty() { 0 } else { 1 },
            "endIndex": entities.len()
        },
        "entities": entities
    })
}
