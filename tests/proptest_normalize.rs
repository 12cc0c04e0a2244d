//! Property-based tests using proptest
//!
//! These tests check the normalizer's contracts over randomized documents:
//! record counts, NIC equivalence classes, envelope strictness and
//! cluster field preservation.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use proptest::prelude::*;
use prismctl::normalize::{
    encode_cluster_listing, normalize, normalize_clusters, normalize_vms, ClusterSummary, Listing,
    NormalizeError, RedundancyState,
};
use prismctl::prism::auth::encode_basic_auth;
use prismctl::prism::endpoint::{resolve, Generation};
use serde_json::{json, Value};
use std::collections::BTreeMap;

/// Generate an arbitrary v2.0 VM entity
fn arb_v2_vm() -> impl Strategy<Value = Value> {
    (
        "[a-z][a-z0-9-]{0,20}",
        prop::collection::vec("10\\.0\\.[0-9]{1,3}\\.[0-9]{1,3}", 0..4),
    )
        .prop_map(|(name, ips)| {
            let nics: Vec<Value> = ips
                .into_iter()
                .map(|ip| json!({"requested_ip_address": ip}))
                .collect();
            json!({"name": name, "vm_nics": nics})
        })
}

/// Generate an element that is not a keyed structure
fn arb_junk() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| json!(n)),
        "[a-z]{0,8}".prop_map(Value::String),
        Just(json!([1, 2, 3])),
    ]
}

/// A listing mixing valid entities and junk
fn arb_v2_listing() -> impl Strategy<Value = Vec<Value>> {
    prop::collection::vec(prop_oneof![3 => arb_v2_vm(), 1 => arb_junk()], 0..40)
}

/// Telemetry block with string values that look like numbers
fn arb_telemetry() -> impl Strategy<Value = BTreeMap<String, String>> {
    prop::collection::btree_map("[a-z_.]{1,24}", "-?[0-9]{1,12}", 0..6)
}

fn arb_cluster() -> impl Strategy<Value = ClusterSummary> {
    (
        ("[0-9a-f]{4}::[0-9]{1,6}", "[0-9a-f-]{0,36}", "[A-Za-z0-9-]{0,20}"),
        ("([0-9]{1,3}\\.){3}[0-9]{1,3}", "(([0-9]{1,3}\\.){3}[0-9]{1,3})?"),
        0u32..64,
        ("[0-9]\\.[0-9]\\.[0-9]", "ncc-[0-9]\\.[0-9]"),
        (0u32..4, 0u32..4, any::<bool>(), any::<bool>()),
        prop::collection::vec("k[A-Z][a-z]{2,6}", 0..3),
        (arb_telemetry(), arb_telemetry()),
    )
        .prop_map(
            |(
                (id, uuid, name),
                (external_ip, external_data_services_ip),
                num_nodes,
                (aos_version, ncc_version),
                (current, desired, cassandra, zookeeper),
                hypervisor_types,
                (stats, usage_stats),
            )| ClusterSummary {
                id,
                uuid,
                name,
                external_ip,
                external_data_services_ip,
                num_nodes,
                aos_version,
                ncc_version,
                redundancy: RedundancyState {
                    current_redundancy_factor: current,
                    desired_redundancy_factor: desired,
                    cassandra_prepare_done: cassandra,
                    zookeeper_prepare_done: zookeeper,
                },
                hypervisor_types,
                stats,
                usage_stats,
                ..Default::default()
            },
        )
}

fn to_body(value: &Value) -> Vec<u8> {
    serde_json::to_vec(value).unwrap()
}

proptest! {
    /// Emitted records equal entities minus skipped
    #[test]
    fn v2_record_count_matches_entities_minus_skipped(entities in arb_v2_listing()) {
        let total = entities.len();
        let junk = entities.iter().filter(|e| !e.is_object()).count();
        let listing = normalize_vms(Generation::V2_0, &to_body(&json!({"entities": entities})))
            .unwrap();
        prop_assert_eq!(listing.records.len(), total - listing.skipped);
        prop_assert_eq!(listing.skipped, junk);
    }

    /// Each requested address becomes exactly one binding
    #[test]
    fn v2_one_binding_per_nic(vm in arb_v2_vm()) {
        let expected = vm["vm_nics"].as_array().map(Vec::len).unwrap_or(0);
        let listing = normalize_vms(Generation::V2_0, &to_body(&json!({"entities": [vm]})))
            .unwrap();
        prop_assert_eq!(listing.records[0].nics.len(), expected);
        for nic in &listing.records[0].nics {
            prop_assert!(nic.assigned_ip_addresses.len() <= 1);
        }
    }

    /// Missing, null and empty vm_nics all mean zero bindings
    #[test]
    fn v2_absent_nics_equivalence(name in "[a-z]{1,12}") {
        let docs = [
            json!({"entities": [{"name": name}]}),
            json!({"entities": [{"name": name, "vm_nics": null}]}),
            json!({"entities": [{"name": name, "vm_nics": []}]}),
        ];
        let results: Vec<_> = docs
            .iter()
            .map(|doc| normalize_vms(Generation::V2_0, &to_body(doc)).unwrap().records)
            .collect();
        prop_assert!(results[0][0].nics.is_empty());
        prop_assert_eq!(&results[0], &results[1]);
        prop_assert_eq!(&results[1], &results[2]);
    }

    /// A single v1.0 address and a one-element list normalize identically
    #[test]
    fn v1_single_address_equals_singleton_list(ip in "([0-9]{1,3}\\.){3}[0-9]{1,3}") {
        let single = normalize_vms(
            Generation::V1_0,
            &to_body(&json!({"entities": [{"vmName": "vm", "ipAddresses": ip}]})),
        ).unwrap();
        let list = normalize_vms(
            Generation::V1_0,
            &to_body(&json!({"entities": [{"vmName": "vm", "ipAddresses": [ip]}]})),
        ).unwrap();
        prop_assert_eq!(&single.records, &list.records);
        prop_assert_eq!(single.records[0].nics[0].assigned_ip_addresses.len(), 1);
    }

    /// v0.8 never yields a partial result, whatever the body
    #[test]
    fn v0_8_is_always_unsupported(body in prop::collection::vec(any::<u8>(), 0..256)) {
        for listing in [Listing::Clusters, Listing::Vms] {
            let result = normalize(Generation::V0_8, listing, &body);
            let is_unsupported = matches!(result, Err(NormalizeError::UnsupportedGeneration { .. }));
            prop_assert!(is_unsupported);
        }
    }

    /// A root array is always a malformed envelope
    #[test]
    fn v2_root_array_is_malformed(entities in arb_v2_listing()) {
        let result = normalize_vms(Generation::V2_0, &to_body(&Value::Array(entities)));
        let is_malformed = matches!(result, Err(NormalizeError::MalformedEnvelope(_)));
        prop_assert!(is_malformed);
    }

    /// Encoding clusters as a v1.0 document and normalizing it preserves every field
    #[test]
    fn cluster_round_trip(clusters in prop::collection::vec(arb_cluster(), 0..5)) {
        let document = encode_cluster_listing(&clusters);
        let listing = normalize_clusters(Generation::V1_0, &to_body(&document)).unwrap();
        prop_assert_eq!(listing.skipped, 0);
        prop_assert_eq!(listing.records, clusters);
    }

    /// The Basic token always decodes back to user:password
    #[test]
    fn basic_auth_decodes(username in ".*", password in ".*") {
        let token = encode_basic_auth(&username, &password);
        let decoded = BASE64.decode(token).unwrap();
        prop_assert_eq!(decoded, format!("{}:{}", username, password).into_bytes());
    }

    /// Resolution never inspects the host
    #[test]
    fn resolve_embeds_host_verbatim(host in "[a-z0-9.-]{1,30}") {
        for generation in Generation::ALL {
            let url = resolve(&host, generation);
            let prefix = format!("https://{}:9440/", host);
            prop_assert!(url.starts_with(&prefix));
            prop_assert!(url.ends_with('/'));
        }
    }
}

#[test]
fn known_basic_auth_token() {
    assert_eq!(
        encode_basic_auth("admin", "nutanix/4u"),
        BASE64.encode(b"admin:nutanix/4u")
    );
}
