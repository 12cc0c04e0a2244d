//! Prism Authentication
//!
//! Prism gateways accept HTTP Basic authentication. This module builds the
//! credential token and resolves credentials from the environment.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use std::fmt;

/// Environment variable holding the default Prism host
pub const HOST_ENV: &str = "PRISM_HOST";
/// Environment variable holding the default Prism user
pub const USERNAME_ENV: &str = "PRISM_USERNAME";
/// Environment variable holding the Prism password
pub const PASSWORD_ENV: &str = "PRISM_PASSWORD";

/// Encode `username:password` with the standard, padded Base64 alphabet.
///
/// The result is the bare token; the `Basic ` prefix belongs to the header.
pub fn encode_basic_auth(username: &str, password: &str) -> String {
    BASE64.encode(format!("{}:{}", username, password))
}

/// Username and password for a Prism gateway
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Basic auth token for these credentials
    pub fn token(&self) -> String {
        encode_basic_auth(&self.username, &self.password)
    }

    /// Value for the `Authorization` header
    pub fn authorization_header(&self) -> String {
        format!("Basic {}", self.token())
    }
}

// Security: never print the password
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"********")
            .finish()
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Some(value.trim().to_string()),
        Ok(_) => {
            tracing::warn!("Ignoring empty {}", name);
            None
        }
        Err(_) => None,
    }
}

/// Read the default host from the environment
pub fn get_default_host() -> Option<String> {
    non_empty_env(HOST_ENV)
}

/// Read the default username from the environment
pub fn get_default_username() -> Option<String> {
    non_empty_env(USERNAME_ENV)
}

/// Read the password from the environment.
/// Passwords may legitimately contain surrounding whitespace, so the value is not trimmed.
pub fn get_password() -> Option<String> {
    std::env::var(PASSWORD_ENV).ok().filter(|p| !p.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_known_credentials() {
        assert_eq!(
            encode_basic_auth("admin", "nutanix/4u"),
            "YWRtaW46bnV0YW5peC80dQ=="
        );
    }

    #[test]
    fn test_encode_empty_inputs() {
        assert_eq!(encode_basic_auth("", ""), "Og==");
        assert_eq!(encode_basic_auth("a", ""), "YTo=");
    }

    #[test]
    fn test_encode_non_ascii() {
        let token = encode_basic_auth("ädmin", "pässwörd");
        let decoded = BASE64.decode(token).unwrap();
        assert_eq!(decoded, "ädmin:pässwörd".as_bytes());
    }

    #[test]
    fn test_authorization_header() {
        let creds = Credentials::new("admin", "nutanix/4u");
        assert_eq!(
            creds.authorization_header(),
            "Basic YWRtaW46bnV0YW5peC80dQ=="
        );
    }

    #[test]
    fn test_debug_masks_password() {
        let creds = Credentials::new("admin", "secret");
        let printed = format!("{:?}", creds);
        assert!(printed.contains("admin"));
        assert!(!printed.contains("secret"));
    }
}
