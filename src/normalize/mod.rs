//! Multi-generation response normalizer
//!
//! Prism serves the same facts in structurally different documents depending
//! on the API generation that answered. Each supported generation has its own
//! strongly-typed wire shape (see [`v1`] and [`v2`]); every shape maps into the
//! canonical records of [`model`].
//!
//! # Policy
//!
//! - The envelope is strict: a root that is not an object, or a missing or
//!   non-list `entities` key, is a [`NormalizeError::MalformedEnvelope`] and
//!   yields no records at all.
//! - Entities are lenient: an element that is not an object, or that cannot be
//!   decoded, is skipped and counted in [`Normalized::skipped`].
//! - Leaves are forgiving: absent, `null` or mistyped fields become zero values.
//!
//! Normalization is pure and synchronous, and safe to call from any thread.
//!
//! # Example
//!
//! ```
//! use prismctl::normalize::normalize_vms;
//! use prismctl::prism::endpoint::Generation;
//!
//! let body = br#"{"entities": [{"name": "web", "vm_nics": [{"requested_ip_address": "10.0.0.5"}]}]}"#;
//! let listing = normalize_vms(Generation::V2_0, body).unwrap();
//! assert_eq!(listing.records[0].nics.len(), 1);
//! ```

mod lenient;
pub mod model;
pub mod v1;
pub mod v2;

use crate::prism::endpoint::Generation;
use lenient::json_kind;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

pub use model::{ClusterSummary, ListMetadata, NicBinding, RedundancyState, VmSummary};
pub use v1::encode_cluster_listing;

/// Kind of listing a document carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Listing {
    Clusters,
    Vms,
}

impl fmt::Display for Listing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Listing::Clusters => f.write_str("clusters"),
            Listing::Vms => f.write_str("vms"),
        }
    }
}

/// Errors that abort a whole normalization call
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    /// No normalization rule exists for this generation and listing
    #[error("no {listing} normalization is defined for API generation {generation}")]
    UnsupportedGeneration {
        generation: Generation,
        listing: Listing,
    },

    /// The document is outside the expected contract; safe to retry the request
    #[error("malformed envelope: {0}")]
    MalformedEnvelope(String),
}

/// Records extracted from one document
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Normalized<T> {
    pub records: Vec<T>,
    /// Entities dropped because of their shape
    pub skipped: usize,
    pub metadata: Option<ListMetadata>,
}

impl<T> Normalized<T> {
    /// A valid envelope with no usable entities
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Output of [`normalize`]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "listing", rename_all = "lowercase")]
pub enum Records {
    Clusters(Normalized<ClusterSummary>),
    Vms(Normalized<VmSummary>),
}

impl Records {
    pub fn len(&self) -> usize {
        match self {
            Records::Clusters(n) => n.records.len(),
            Records::Vms(n) => n.records.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn skipped(&self) -> usize {
        match self {
            Records::Clusters(n) => n.skipped,
            Records::Vms(n) => n.skipped,
        }
    }
}

/// Normalize a raw response body of the given generation and listing
pub fn normalize(
    generation: Generation,
    listing: Listing,
    body: &[u8],
) -> Result<Records, NormalizeError> {
    match listing {
        Listing::Clusters => normalize_clusters(generation, body).map(Records::Clusters),
        Listing::Vms => normalize_vms(generation, body).map(Records::Vms),
    }
}

/// Normalize a clusters listing. Only v1.0 defines one.
pub fn normalize_clusters(
    generation: Generation,
    body: &[u8],
) -> Result<Normalized<ClusterSummary>, NormalizeError> {
    match generation {
        Generation::V1_0 => decode_listing::<v1::ClusterEntity>(generation, body),
        _ => Err(NormalizeError::UnsupportedGeneration {
            generation,
            listing: Listing::Clusters,
        }),
    }
}

/// Normalize a VM listing from v1.0 or v2.0
pub fn normalize_vms(
    generation: Generation,
    body: &[u8],
) -> Result<Normalized<VmSummary>, NormalizeError> {
    match generation {
        Generation::V1_0 => decode_listing::<v1::VmEntity>(generation, body),
        Generation::V2_0 => decode_listing::<v2::VmEntity>(generation, body),
        // No stable schemas are exposed for these
        Generation::V0_8 | Generation::V3_0 => Err(NormalizeError::UnsupportedGeneration {
            generation,
            listing: Listing::Vms,
        }),
    }
}

/// A generation-specific entity shape and its mapping into a canonical record
pub(crate) trait WireEntity: DeserializeOwned {
    type Record;

    fn into_record(self) -> Self::Record;
}

/// The strict part of every listing document
struct Envelope {
    metadata: Option<ListMetadata>,
    entities: Vec<Value>,
}

impl Envelope {
    fn parse(body: &[u8]) -> Result<Self, NormalizeError> {
        let root: Value = serde_json::from_slice(body).map_err(|e| {
            NormalizeError::MalformedEnvelope(format!("body is not valid JSON: {}", e))
        })?;

        let mut root = match root {
            Value::Object(map) => map,
            other => {
                return Err(NormalizeError::MalformedEnvelope(format!(
                    "expected an object at the root, found {}",
                    json_kind(&other)
                )))
            }
        };

        let entities = match root.remove("entities") {
            Some(Value::Array(entities)) => entities,
            Some(other) => {
                return Err(NormalizeError::MalformedEnvelope(format!(
                    "`entities` must be a list, found {}",
                    json_kind(&other)
                )))
            }
            None => {
                return Err(NormalizeError::MalformedEnvelope(
                    "missing `entities` key".to_string(),
                ))
            }
        };

        let metadata = root
            .remove("metadata")
            .filter(Value::is_object)
            .and_then(|m| serde_json::from_value(m).ok());

        Ok(Self { metadata, entities })
    }
}

fn decode_listing<E: WireEntity>(
    generation: Generation,
    body: &[u8],
) -> Result<Normalized<E::Record>, NormalizeError> {
    let envelope = Envelope::parse(body)?;

    let mut records = Vec::with_capacity(envelope.entities.len());
    let mut skipped = 0;

    for (index, entity) in envelope.entities.into_iter().enumerate() {
        if !entity.is_object() {
            tracing::warn!(
                "Skipping {} entity #{}: expected an object, found {}",
                generation,
                index,
                json_kind(&entity)
            );
            skipped += 1;
            continue;
        }

        match serde_json::from_value::<E>(entity) {
            Ok(wire) => records.push(wire.into_record()),
            Err(e) => {
                tracing::warn!("Skipping {} entity #{}: {}", generation, index, e);
                skipped += 1;
            }
        }
    }

    tracing::debug!(
        "Normalized {} {} record(s), skipped {}",
        records.len(),
        generation,
        skipped
    );

    Ok(Normalized {
        records,
        skipped,
        metadata: envelope.metadata,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body(value: Value) -> Vec<u8> {
        serde_json::to_vec(&value).unwrap()
    }

    #[test]
    fn test_v0_8_and_v3_0_are_unsupported() {
        let doc = body(json!({"entities": [{"name": "vm"}]}));
        for generation in [Generation::V0_8, Generation::V3_0] {
            for listing in [Listing::Clusters, Listing::Vms] {
                let err = normalize(generation, listing, &doc).unwrap_err();
                assert_eq!(
                    err,
                    NormalizeError::UnsupportedGeneration { generation, listing }
                );
            }
        }
    }

    #[test]
    fn test_unsupported_wins_over_malformed_body() {
        let err = normalize(Generation::V0_8, Listing::Vms, b"not json").unwrap_err();
        assert!(matches!(err, NormalizeError::UnsupportedGeneration { .. }));
    }

    #[test]
    fn test_v2_clusters_are_unsupported() {
        let err = normalize_clusters(Generation::V2_0, br#"{"entities": []}"#).unwrap_err();
        assert_eq!(
            err,
            NormalizeError::UnsupportedGeneration {
                generation: Generation::V2_0,
                listing: Listing::Clusters,
            }
        );
    }

    #[test]
    fn test_root_array_is_malformed() {
        let err = normalize_vms(Generation::V2_0, &body(json!([{"name": "vm"}]))).unwrap_err();
        assert!(matches!(err, NormalizeError::MalformedEnvelope(_)));
        assert!(err.to_string().contains("found a list"));
    }

    #[test]
    fn test_invalid_json_is_malformed() {
        let err = normalize_vms(Generation::V1_0, b"<html>Login</html>").unwrap_err();
        assert!(matches!(err, NormalizeError::MalformedEnvelope(_)));
    }

    #[test]
    fn test_missing_entities_is_malformed() {
        let err = normalize_vms(Generation::V2_0, &body(json!({"metadata": {}}))).unwrap_err();
        assert_eq!(
            err,
            NormalizeError::MalformedEnvelope("missing `entities` key".to_string())
        );
    }

    #[test]
    fn test_non_list_entities_is_malformed() {
        for entities in [json!(null), json!({"name": "vm"}), json!("vm")] {
            let err =
                normalize_vms(Generation::V2_0, &body(json!({"entities": entities}))).unwrap_err();
            assert!(matches!(err, NormalizeError::MalformedEnvelope(_)));
        }
    }

    #[test]
    fn test_empty_entities_is_empty_result() {
        let listing = normalize_vms(Generation::V2_0, &body(json!({"entities": []}))).unwrap();
        assert!(listing.is_empty());
        assert_eq!(listing.skipped, 0);
    }

    #[test]
    fn test_non_object_entities_are_skipped_and_counted() {
        let doc = body(json!({
            "entities": [
                {"name": "a"},
                "garbage",
                42,
                null,
                ["name", "b"],
                {"name": "c"}
            ]
        }));
        let listing = normalize_vms(Generation::V2_0, &doc).unwrap();
        let names: Vec<&str> = listing.records.iter().map(|vm| vm.name.as_str()).collect();
        assert_eq!(names, vec!["a", "c"]);
        assert_eq!(listing.skipped, 4);
    }

    #[test]
    fn test_metadata_is_carried() {
        let doc = body(json!({
            "metadata": {"grandTotalEntities": 1, "totalEntities": 1, "count": 1},
            "entities": [{"name": "a"}]
        }));
        let listing = normalize_vms(Generation::V1_0, &doc).unwrap();
        let metadata = listing.metadata.unwrap();
        assert_eq!(metadata.total_entities, 1);
        assert_eq!(metadata.count, 1);
    }

    #[test]
    fn test_malformed_metadata_is_ignored() {
        let doc = body(json!({"metadata": "oops", "entities": []}));
        let listing = normalize_vms(Generation::V1_0, &doc).unwrap();
        assert_eq!(listing.metadata, None);
    }

    #[test]
    fn test_records_dispatch() {
        let doc = body(json!({"entities": [{"name": "a"}, 1]}));
        let records = normalize(Generation::V2_0, Listing::Vms, &doc).unwrap();
        assert!(matches!(records, Records::Vms(_)));
        assert_eq!(records.len(), 1);
        assert_eq!(records.skipped(), 1);
    }
}
