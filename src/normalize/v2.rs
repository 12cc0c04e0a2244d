//! v2.0 wire shapes (`PrismGateway/services/rest/v2.0/`)

use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeSet;

use super::lenient::{self, json_kind};
use super::model::{NicBinding, VmSummary};
use super::WireEntity;

/// One element of `vm_nics`, present when `include_vm_nic_config=true`
#[derive(Debug, Default, Deserialize)]
struct VmNic {
    #[serde(default, deserialize_with = "lenient::non_empty_string")]
    requested_ip_address: Option<String>,
    #[serde(default, deserialize_with = "lenient::non_empty_string")]
    ip_address: Option<String>,
    #[serde(default, deserialize_with = "lenient::non_empty_string")]
    mac_address: Option<String>,
}

impl From<VmNic> for NicBinding {
    fn from(nic: VmNic) -> Self {
        NicBinding {
            // v2.0 reports NICs of hypervisor-managed (AHV) networks
            is_managed_by_hypervisor: true,
            requested_ip_address: nic.requested_ip_address,
            assigned_ip_addresses: nic.ip_address.into_iter().collect::<BTreeSet<_>>(),
            mac_address: nic.mac_address,
        }
    }
}

/// One element of `GET v2.0/vms` `entities`
#[derive(Debug, Deserialize)]
pub(crate) struct VmEntity {
    #[serde(default, deserialize_with = "lenient::value")]
    name: String,
    #[serde(default, deserialize_with = "lenient::non_empty_string")]
    uuid: Option<String>,
    /// Missing, `null`, `[]` and non-list values all mean "no NICs"
    #[serde(default, deserialize_with = "lenient::value")]
    vm_nics: Vec<Value>,
}

impl WireEntity for VmEntity {
    type Record = VmSummary;

    fn into_record(self) -> VmSummary {
        let mut nics = Vec::with_capacity(self.vm_nics.len());

        for (index, nic) in self.vm_nics.into_iter().enumerate() {
            if !nic.is_object() {
                tracing::warn!(
                    "Dropping NIC #{} of VM '{}': expected an object, found {}",
                    index,
                    self.name,
                    json_kind(&nic)
                );
                continue;
            }
            let nic: VmNic = serde_json::from_value(nic).unwrap_or_default();
            nics.push(NicBinding::from(nic));
        }

        VmSummary {
            name: self.name,
            uuid: self.uuid,
            nics,
        }
    }
}
