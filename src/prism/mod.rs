//! Prism API interaction module
//!
//! This module provides the core functionality for talking to a Nutanix Prism
//! gateway: endpoint resolution per API generation, Basic authentication and
//! the HTTP transport.
//!
//! # Module Structure
//!
//! - [`endpoint`] - API generations and their base URLs
//! - [`auth`] - Basic auth token encoding and credentials
//! - [`http`] - HTTP transport with optional session cookies
//! - [`client`] - Main Prism client combining the above with normalization
//!
//! # Example
//!
//! ```no_run
//! use prismctl::prism::auth::Credentials;
//! use prismctl::prism::client::{ClientOptions, PrismClient};
//! use prismctl::prism::endpoint::Generation;
//! use prismctl::prism::http::TransportOptions;
//!
//! async fn example() -> prismctl::error::Result<()> {
//!     let client = PrismClient::new(ClientOptions {
//!         host: "192.168.178.130".to_string(),
//!         credentials: Credentials::new("admin", "nutanix/4u"),
//!         transport: TransportOptions::default(),
//!         session: false,
//!     })?;
//!     let vms = client.list_vms(Generation::V2_0).await?;
//!     println!("{} VMs", vms.records.len());
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod endpoint;
pub mod http;
