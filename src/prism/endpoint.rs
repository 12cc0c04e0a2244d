//! Prism API generations and their base URLs

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use url::Url;

/// Port every Prism gateway listens on
pub const PRISM_PORT: u16 = 9440;

/// One of the REST API generations served concurrently by a Prism gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Generation {
    #[serde(rename = "v0.8")]
    V0_8,
    #[serde(rename = "v1.0", alias = "v1")]
    V1_0,
    #[serde(rename = "v2.0", alias = "v2")]
    V2_0,
    #[serde(rename = "v3.0", alias = "v3")]
    V3_0,
}

impl Generation {
    pub const ALL: [Generation; 4] = [
        Generation::V0_8,
        Generation::V1_0,
        Generation::V2_0,
        Generation::V3_0,
    ];

    /// Path of the generation's entry point, relative to the gateway root
    pub fn base_path(self) -> &'static str {
        match self {
            Generation::V0_8 => "api/nutanix/v0.8/",
            Generation::V1_0 => "PrismGateway/services/rest/v1/",
            Generation::V2_0 => "PrismGateway/services/rest/v2.0/",
            Generation::V3_0 => "PrismGateway/services/rest/v3.0/",
        }
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Generation::V0_8 => "v0.8",
            Generation::V1_0 => "v1.0",
            Generation::V2_0 => "v2.0",
            Generation::V3_0 => "v3.0",
        };
        f.write_str(s)
    }
}

impl FromStr for Generation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "v0.8" | "0.8" => Ok(Generation::V0_8),
            "v1" | "v1.0" | "1" | "1.0" => Ok(Generation::V1_0),
            "v2" | "v2.0" | "2" | "2.0" => Ok(Generation::V2_0),
            "v3" | "v3.0" | "3" | "3.0" => Ok(Generation::V3_0),
            other => Err(format!(
                "unknown API generation '{}' (expected v0.8, v1, v2.0 or v3.0)",
                other
            )),
        }
    }
}

/// Build the base URL of `generation` on `host`.
///
/// The host is treated as an opaque string; a malformed host only surfaces
/// later as a transport error.
pub fn resolve(host: &str, generation: Generation) -> String {
    format!(
        "https://{}:{}/{}",
        host,
        PRISM_PORT,
        generation.base_path()
    )
}

/// Join the generation's path onto an arbitrary gateway root
pub fn resolve_with_root(root: &Url, generation: Generation) -> Result<Url, url::ParseError> {
    // Url::join replaces the last segment unless the root ends with '/'
    if root.path().ends_with('/') {
        root.join(generation.base_path())
    } else {
        let mut root = root.clone();
        root.set_path(&format!("{}/", root.path()));
        root.join(generation.base_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_v1() {
        assert_eq!(
            resolve("192.168.178.130", Generation::V1_0),
            "https://192.168.178.130:9440/PrismGateway/services/rest/v1/"
        );
    }

    #[test]
    fn test_resolve_all_generations() {
        assert_eq!(
            resolve("prism.local", Generation::V0_8),
            "https://prism.local:9440/api/nutanix/v0.8/"
        );
        assert_eq!(
            resolve("prism.local", Generation::V2_0),
            "https://prism.local:9440/PrismGateway/services/rest/v2.0/"
        );
        assert_eq!(
            resolve("prism.local", Generation::V3_0),
            "https://prism.local:9440/PrismGateway/services/rest/v3.0/"
        );
    }

    #[test]
    fn test_resolve_does_not_validate_host() {
        assert_eq!(
            resolve("not a host", Generation::V1_0),
            "https://not a host:9440/PrismGateway/services/rest/v1/"
        );
    }

    #[test]
    fn test_resolve_with_root() {
        let root = Url::parse("http://127.0.0.1:8080").unwrap();
        let url = resolve_with_root(&root, Generation::V2_0).unwrap();
        assert_eq!(
            url.as_str(),
            "http://127.0.0.1:8080/PrismGateway/services/rest/v2.0/"
        );

        let nested = Url::parse("http://proxy/prism").unwrap();
        let url = resolve_with_root(&nested, Generation::V1_0).unwrap();
        assert_eq!(url.as_str(), "http://proxy/prism/PrismGateway/services/rest/v1/");
    }

    #[test]
    fn test_generation_parse_and_display() {
        for generation in Generation::ALL {
            let parsed: Generation = generation.to_string().parse().unwrap();
            assert_eq!(parsed, generation);
        }
        assert_eq!("v2".parse::<Generation>().unwrap(), Generation::V2_0);
        assert!("v4".parse::<Generation>().is_err());
    }
}
