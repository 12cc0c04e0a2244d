//! prismctl - client for the Nutanix Prism REST API
//!
//! Prism serves four incompatible API generations side by side. This crate
//! resolves their endpoints, authenticates, and normalizes the v1.0 and v2.0
//! cluster and VM listings into one canonical model.

pub mod config;
pub mod error;
pub mod normalize;
pub mod prism;

pub use error::{format_prism_error, PrismError};
pub use normalize::{
    normalize, ClusterSummary, Listing, NicBinding, NormalizeError, Normalized, Records,
    RedundancyState, VmSummary,
};
pub use prism::auth::encode_basic_auth;
pub use prism::endpoint::{resolve, Generation};
