//! Prism Client
//!
//! Main client for a Prism gateway, combining endpoint resolution,
//! authentication, transport and normalization.

use super::auth::Credentials;
use super::endpoint::{self, Generation};
use super::http::{PrismHttpClient, TransportError, TransportOptions};
use crate::error::Result;
use crate::normalize::{self, ClusterSummary, Listing, NormalizeError, Normalized, VmSummary};
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::Method;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use url::Url;

/// Everything needed to talk to one gateway
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub host: String,
    pub credentials: Credentials,
    pub transport: TransportOptions,
    /// Rely on the server's session cookie after the first authenticated request
    pub session: bool,
}

/// Cluster and VM facts collected in one pass
#[derive(Debug, Clone, Serialize)]
pub struct Inventory {
    pub host: String,
    pub fetched_at: DateTime<Utc>,
    pub clusters: Normalized<ClusterSummary>,
    pub vms: Normalized<VmSummary>,
}

/// Main Prism client
#[derive(Clone)]
pub struct PrismClient {
    http: PrismHttpClient,
    credentials: Credentials,
    host: String,
    root: Option<Url>,
    session: bool,
    session_established: Arc<AtomicBool>,
}

impl PrismClient {
    /// Create a new Prism client
    pub fn new(options: ClientOptions) -> Result<Self> {
        let mut transport = options.transport;
        // Session mode needs somewhere to keep the cookie
        transport.cookie_store |= options.session;

        let http = PrismHttpClient::new(&transport)?;

        Ok(Self {
            http,
            credentials: options.credentials,
            host: options.host,
            root: None,
            session: options.session,
            session_established: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Send requests to `root` instead of `https://{host}:9440/`
    pub fn with_root(mut self, root: Url) -> Self {
        self.root = Some(root);
        self
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// Whether a session cookie is currently standing in for credentials
    pub fn has_session(&self) -> bool {
        self.session && self.session_established.load(Ordering::Acquire)
    }

    /// Base URL of a generation on this gateway
    pub fn base_url(&self, generation: Generation) -> Result<String> {
        match &self.root {
            Some(root) => Ok(endpoint::resolve_with_root(root, generation)?.to_string()),
            None => Ok(endpoint::resolve(&self.host, generation)),
        }
    }

    /// Build a URL below a generation's base
    pub fn url(&self, generation: Generation, path: &str) -> Result<String> {
        let base = self.base_url(generation)?;
        Ok(format!("{}{}", base, path.trim_start_matches('/')))
    }

    fn headers(&self) -> std::result::Result<HeaderMap, TransportError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        if !self.has_session() {
            let mut value = HeaderValue::from_str(&self.credentials.authorization_header())?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        Ok(headers)
    }

    /// GET a path below a generation's base and return the raw body
    pub async fn get(&self, generation: Generation, path: &str) -> Result<Vec<u8>> {
        let url = self.url(generation, path)?;
        let headers = self.headers()?;

        match self.http.fetch(Method::GET, &url, headers).await {
            Ok(response) => {
                if self.session && !self.session_established.swap(true, Ordering::AcqRel) {
                    tracing::info!("Session established with {}", self.host);
                }
                Ok(response.body)
            }
            Err(e) => {
                if matches!(e, TransportError::Unauthorized { .. })
                    && self.session_established.swap(false, Ordering::AcqRel)
                {
                    tracing::warn!("Session with {} is no longer valid", self.host);
                }
                Err(e.into())
            }
        }
    }

    // =========================================================================
    // Listings
    // =========================================================================

    /// Path of the VM listing for a generation, if one is defined
    fn vms_path(generation: Generation) -> Option<&'static str> {
        match generation {
            Generation::V1_0 => Some("vms/"),
            Generation::V2_0 => Some("vms/?include_vm_nic_config=true"),
            Generation::V0_8 | Generation::V3_0 => None,
        }
    }

    /// List clusters through the v1.0 API
    pub async fn list_clusters(&self) -> Result<Normalized<ClusterSummary>> {
        let body = self.get(Generation::V1_0, "clusters").await?;
        let listing = normalize::normalize_clusters(Generation::V1_0, &body)?;
        tracing::info!(
            "Loaded {} cluster(s) from {} ({} skipped)",
            listing.records.len(),
            self.host,
            listing.skipped
        );
        Ok(listing)
    }

    /// List VMs through the given API generation
    pub async fn list_vms(&self, generation: Generation) -> Result<Normalized<VmSummary>> {
        let Some(path) = Self::vms_path(generation) else {
            return Err(NormalizeError::UnsupportedGeneration {
                generation,
                listing: Listing::Vms,
            }
            .into());
        };

        let body = self.get(generation, path).await?;
        let listing = normalize::normalize_vms(generation, &body)?;
        tracing::info!(
            "Loaded {} VM(s) from {} via {} ({} skipped)",
            listing.records.len(),
            self.host,
            generation,
            listing.skipped
        );
        Ok(listing)
    }

    /// Fetch clusters and VMs concurrently
    pub async fn inventory(&self, vm_generation: Generation) -> Result<Inventory> {
        let (clusters, vms) =
            futures::future::try_join(self.list_clusters(), self.list_vms(vm_generation)).await?;

        Ok(Inventory {
            host: self.host.clone(),
            fetched_at: Utc::now(),
            clusters,
            vms,
        })
    }
}
