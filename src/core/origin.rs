use std::{fmt, str::FromStr};

use url::{Host, Url};

use crate::core::error::{XdsError, XdsResult};

/// Schemes an upstream origin may use
const SUPPORTED_SCHEMES: &[&str] = &["http", "https", "ws", "wss"];

/// Schemes that imply TLS towards the upstream
const SECURE_SCHEMES: &[&str] = &["https", "wss"];

/// A parsed upstream origin (`scheme://host[:port]`).
///
/// The raw string is kept verbatim because it doubles as the cluster name
/// that routes reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Origin {
    raw: String,
    scheme: String,
    host: String,
    port: u16,
    is_secure: bool,
}

impl Origin {
    /// Parse an origin, resolving the port from the scheme when it is implicit.
    pub fn parse(raw: &str) -> XdsResult<Self> {
        let url = Url::parse(raw).map_err(|e| XdsError::MalformedOrigin {
            origin: raw.to_string(),
            reason: e.to_string(),
        })?;

        let scheme = url.scheme().to_ascii_lowercase();
        if !SUPPORTED_SCHEMES.contains(&scheme.as_str()) {
            return Err(XdsError::MalformedOrigin {
                origin: raw.to_string(),
                reason: format!(
                    "unsupported scheme '{scheme}', expected one of {}",
                    SUPPORTED_SCHEMES.join(", ")
                ),
            });
        }

        let host = match url.host() {
            Some(Host::Domain(domain)) if !domain.is_empty() => domain.to_string(),
            Some(Host::Ipv4(addr)) => addr.to_string(),
            Some(Host::Ipv6(addr)) => addr.to_string(),
            _ => {
                return Err(XdsError::MalformedOrigin {
                    origin: raw.to_string(),
                    reason: "origin has no host".to_string(),
                });
            }
        };

        // `Url` drops an explicit port equal to the scheme default, so this
        // covers both the explicit and the implicit case.
        let port = url
            .port_or_known_default()
            .ok_or_else(|| XdsError::UnresolvableOrigin {
                origin: raw.to_string(),
                scheme: scheme.clone(),
            })?;

        let is_secure = SECURE_SCHEMES.contains(&scheme.as_str());

        Ok(Self {
            raw: raw.to_string(),
            scheme,
            host,
            port,
            is_secure,
        })
    }

    /// The origin exactly as submitted
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Whether the scheme denotes a TLS transport
    pub fn is_secure(&self) -> bool {
        self.is_secure
    }
}

impl FromStr for Origin {
    type Err = XdsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Origin::parse(s)
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secure_origin_uses_default_port() {
        let origin = Origin::parse("https://api.example.com").unwrap();
        assert_eq!(origin.host(), "api.example.com");
        assert_eq!(origin.port(), 443);
        assert!(origin.is_secure());
        assert_eq!(origin.as_str(), "https://api.example.com");
    }

    #[test]
    fn test_plain_origin_uses_default_port() {
        let origin = Origin::parse("http://backend.internal").unwrap();
        assert_eq!(origin.port(), 80);
        assert!(!origin.is_secure());
    }

    #[test]
    fn test_explicit_port_wins() {
        let origin: Origin = "http://backend.internal:8080".parse().unwrap();
        assert_eq!(origin.port(), 8080);

        let origin: Origin = "https://backend.internal:8443/".parse().unwrap();
        assert_eq!(origin.port(), 8443);
        assert!(origin.is_secure());
    }

    #[test]
    fn test_explicit_default_port_is_kept() {
        let origin = Origin::parse("https://api.example.com:443").unwrap();
        assert_eq!(origin.port(), 443);
    }

    #[test]
    fn test_scheme_is_case_insensitive() {
        let origin = Origin::parse("HTTPS://api.example.com").unwrap();
        assert!(origin.is_secure());
        assert_eq!(origin.scheme(), "https");
        assert_eq!(origin.as_str(), "HTTPS://api.example.com");
    }

    #[test]
    fn test_ipv6_host_is_unbracketed() {
        let origin = Origin::parse("http://[::1]:9000").unwrap();
        assert_eq!(origin.host(), "::1");
        assert_eq!(origin.port(), 9000);
    }

    #[test]
    fn test_relative_string_is_malformed() {
        let err = Origin::parse("not-a-url").unwrap_err();
        assert!(matches!(err, XdsError::MalformedOrigin { .. }));
    }

    #[test]
    fn test_hostless_origin_is_malformed() {
        let err = Origin::parse("unix:/var/run/backend.sock").unwrap_err();
        assert!(matches!(err, XdsError::MalformedOrigin { .. }));
    }

    #[test]
    fn test_non_http_schemes_are_malformed() {
        for raw in [
            "tcp://db.internal:5432",
            "tcp://db.internal",
            "ftp://files.example.com",
        ] {
            match Origin::parse(raw) {
                Err(XdsError::MalformedOrigin { reason, .. }) => {
                    assert!(reason.contains("unsupported scheme"), "{raw}: {reason}");
                }
                other => panic!("{raw}: expected MalformedOrigin, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_websocket_origins_resolve_default_ports() {
        let origin = Origin::parse("ws://events.internal").unwrap();
        assert_eq!(origin.port(), 80);
        assert!(!origin.is_secure());

        let origin = Origin::parse("wss://events.example.com").unwrap();
        assert_eq!(origin.port(), 443);
        assert!(origin.is_secure());
    }
}
