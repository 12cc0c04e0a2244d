//! Canonical records shared by every API generation

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use super::lenient;

/// Well-known keys of the cluster `stats` block, exactly as the server emits them
pub mod stat_keys {
    pub const HYPERVISOR_CPU_USAGE_PPM: &str = "hypervisor_cpu_usage_ppm";
    pub const HYPERVISOR_MEMORY_USAGE_PPM: &str = "hypervisor_memory_usage_ppm";
    pub const NUM_IOPS: &str = "num_iops";
    pub const NUM_READ_IOPS: &str = "num_read_iops";
    pub const NUM_WRITE_IOPS: &str = "num_write_iops";
    pub const IO_BANDWIDTH_KBPS: &str = "io_bandwidth_kBps";
    pub const AVG_IO_LATENCY_USECS: &str = "avg_io_latency_usecs";
    pub const CONTENT_CACHE_HIT_PPM: &str = "content_cache_hit_ppm";
}

/// Well-known keys of the cluster `usageStats` block, exactly as the server emits them
pub mod usage_keys {
    pub const STORAGE_USAGE_BYTES: &str = "storage.usage_bytes";
    pub const STORAGE_CAPACITY_BYTES: &str = "storage.capacity_bytes";
    pub const STORAGE_FREE_BYTES: &str = "storage.free_bytes";
    pub const STORAGE_LOGICAL_USAGE_BYTES: &str = "storage.logical_usage_bytes";
    pub const STORAGE_TIER_SSD_USAGE_BYTES: &str = "storage_tier.ssd.usage_bytes";
    pub const STORAGE_TIER_SSD_CAPACITY_BYTES: &str = "storage_tier.ssd.capacity_bytes";
    pub const DATA_REDUCTION_SAVING_RATIO_PPM: &str = "data_reduction.saving_ratio_ppm";
}

/// Replication state of a cluster.
///
/// `current_redundancy_factor <= desired_redundancy_factor` usually holds but is
/// not enforced; the server reports transient violations during rebuilds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedundancyState {
    pub current_redundancy_factor: u32,
    pub desired_redundancy_factor: u32,
    pub cassandra_prepare_done: bool,
    pub zookeeper_prepare_done: bool,
}

/// Generation-independent view of one cluster
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterSummary {
    pub id: String,
    pub uuid: String,
    pub name: String,
    pub external_ip: String,
    pub external_data_services_ip: String,
    pub num_nodes: u32,
    /// AOS release, reported as `version` by the server
    pub aos_version: String,
    pub ncc_version: String,
    pub redundancy: RedundancyState,
    pub full_version: String,
    pub timezone: String,
    pub hypervisor_types: Vec<String>,
    pub name_servers: Vec<String>,
    pub ntp_servers: Vec<String>,
    /// I/O statistics. Values stay in the server's string form; numbers are not parsed.
    pub stats: BTreeMap<String, String>,
    /// Storage usage statistics, string-valued like `stats`
    pub usage_stats: BTreeMap<String, String>,
}

impl ClusterSummary {
    /// Raw string value of an I/O statistic, see [`stat_keys`]
    pub fn stat(&self, key: &str) -> Option<&str> {
        self.stats.get(key).map(String::as_str)
    }

    /// Raw string value of a usage statistic, see [`usage_keys`]
    pub fn usage(&self, key: &str) -> Option<&str> {
        self.usage_stats.get(key).map(String::as_str)
    }
}

/// The association between a virtual NIC and its IP address(es).
///
/// A binding read from v2.0 carries at most one assigned address; one read
/// from v1.0 may carry several.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NicBinding {
    pub is_managed_by_hypervisor: bool,
    pub requested_ip_address: Option<String>,
    pub assigned_ip_addresses: BTreeSet<String>,
    pub mac_address: Option<String>,
}

/// Generation-independent view of one virtual machine
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VmSummary {
    pub name: String,
    pub uuid: Option<String>,
    pub nics: Vec<NicBinding>,
}

impl VmSummary {
    /// Every address known for this VM, requested or assigned
    pub fn ip_addresses(&self) -> BTreeSet<&str> {
        self.nics
            .iter()
            .flat_map(|nic| {
                nic.requested_ip_address
                    .iter()
                    .chain(nic.assigned_ip_addresses.iter())
                    .map(String::as_str)
            })
            .collect()
    }
}

/// Paging block of a listing envelope.
///
/// v1.0 spells the keys in camelCase, v2.0 in snake_case.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListMetadata {
    #[serde(default, alias = "grand_total_entities", deserialize_with = "lenient::value")]
    pub grand_total_entities: u64,
    #[serde(default, alias = "total_entities", deserialize_with = "lenient::value")]
    pub total_entities: u64,
    #[serde(default, alias = "filter_criteria", deserialize_with = "lenient::value")]
    pub filter_criteria: String,
    #[serde(default, alias = "sort_criteria", deserialize_with = "lenient::value")]
    pub sort_criteria: String,
    #[serde(default, deserialize_with = "lenient::value")]
    pub page: u64,
    #[serde(default, deserialize_with = "lenient::value")]
    pub count: u64,
    #[serde(default, alias = "start_index", deserialize_with = "lenient::value")]
    pub start_index: u64,
    #[serde(default, alias = "end_index", deserialize_with = "lenient::value")]
    pub end_index: u64,
}
