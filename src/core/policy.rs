//! Fixed values stamped into every synthesized resource.
//!
//! The connect timeout of a cluster and the action timeout of a route are the
//! same setting: [`SynthesisPolicy::timeout`]. There is deliberately no way to
//! configure one without the other.
use std::time::Duration;

use crate::{
    config::models::{DuplicateClusterPolicy, XdsConfig},
    core::error::{XdsError, XdsResult},
};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(25);
pub const DEFAULT_CLUSTER_VERSION: &str = "1";
pub const DEFAULT_ROUTE_VERSION: &str = "1";
pub const DEFAULT_ROUTE_CONFIG_NAME: &str = "ENVOY_ROUTES";
pub const DEFAULT_VIRTUAL_HOST_NAME: &str = "MY_SERVER";
pub const WILDCARD_DOMAIN: &str = "*";
pub const TLS_TRANSPORT_SOCKET_NAME: &str = "envoy.transport_sockets.tls";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesisPolicy {
    /// Cluster connect timeout and route action timeout
    pub timeout: Duration,
    pub cluster_version: String,
    pub route_version: String,
    pub route_config_name: String,
    pub virtual_host_name: String,
    pub virtual_host_domains: Vec<String>,
    pub tls_transport_socket_name: String,
    pub duplicate_clusters: DuplicateClusterPolicy,
    /// Pretty-print rendered envelopes
    pub pretty: bool,
}

impl Default for SynthesisPolicy {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            cluster_version: DEFAULT_CLUSTER_VERSION.to_string(),
            route_version: DEFAULT_ROUTE_VERSION.to_string(),
            route_config_name: DEFAULT_ROUTE_CONFIG_NAME.to_string(),
            virtual_host_name: DEFAULT_VIRTUAL_HOST_NAME.to_string(),
            virtual_host_domains: vec![WILDCARD_DOMAIN.to_string()],
            tls_transport_socket_name: TLS_TRANSPORT_SOCKET_NAME.to_string(),
            duplicate_clusters: DuplicateClusterPolicy::Allow,
            pretty: false,
        }
    }
}

impl SynthesisPolicy {
    /// Check that every value can appear in a well-formed resource.
    pub fn validate(&self) -> XdsResult<()> {
        if self.timeout.is_zero() {
            return Err(XdsError::InvalidPolicy(
                "timeout must be greater than zero".to_string(),
            ));
        }

        let required = [
            ("cluster_version", &self.cluster_version),
            ("route_version", &self.route_version),
            ("route_config_name", &self.route_config_name),
            ("virtual_host_name", &self.virtual_host_name),
            ("tls_transport_socket_name", &self.tls_transport_socket_name),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(XdsError::InvalidPolicy(format!("{field} cannot be empty")));
            }
        }

        if self.virtual_host_domains.is_empty() {
            return Err(XdsError::InvalidPolicy(
                "virtual_host_domains must contain at least one domain".to_string(),
            ));
        }

        Ok(())
    }
}

impl TryFrom<&XdsConfig> for SynthesisPolicy {
    type Error = XdsError;

    fn try_from(config: &XdsConfig) -> Result<Self, Self::Error> {
        let timeout = humantime::parse_duration(&config.timeout).map_err(|e| {
            XdsError::InvalidPolicy(format!("invalid timeout '{}': {e}", config.timeout))
        })?;

        let policy = Self {
            timeout,
            cluster_version: config.cluster_version.clone(),
            route_version: config.route_version.clone(),
            route_config_name: config.route_config_name.clone(),
            virtual_host_name: config.virtual_host_name.clone(),
            virtual_host_domains: config.virtual_host_domains.clone(),
            tls_transport_socket_name: config.tls_transport_socket_name.clone(),
            duplicate_clusters: config.duplicate_clusters,
            pretty: config.pretty,
        };
        policy.validate()?;
        Ok(policy)
    }
}
