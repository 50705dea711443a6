//! Configuration data structures for xds-forge.
//!
//! These types map directly to TOML (also JSON / YAML) configuration files. Every
//! section has defaults so that an empty file yields a working control plane whose
//! resources carry the stock version tokens, names and 25 second timeout.
use serde::{Deserialize, Serialize};

use crate::core::policy::{
    DEFAULT_CLUSTER_VERSION, DEFAULT_ROUTE_CONFIG_NAME, DEFAULT_ROUTE_VERSION,
    DEFAULT_VIRTUAL_HOST_NAME, TLS_TRANSPORT_SOCKET_NAME, WILDCARD_DOMAIN,
};

fn default_listen_addr() -> String {
    "127.0.0.1:18000".to_string()
}

/// A single request to route a path prefix to an upstream origin.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct RoutingIntent {
    /// Upstream origin with scheme, e.g. `https://api.example.com`
    pub origin: String,
    /// Path prefix to match
    pub prefix: String,
    #[serde(default)]
    pub prefix_rewrite: Option<String>,
    #[serde(default)]
    pub host_rewrite_literal: Option<String>,
}

impl RoutingIntent {
    pub fn new(origin: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            prefix: prefix.into(),
            prefix_rewrite: None,
            host_rewrite_literal: None,
        }
    }

    pub fn with_prefix_rewrite(mut self, rewrite: impl Into<String>) -> Self {
        self.prefix_rewrite = Some(rewrite.into());
        self
    }

    pub fn with_host_rewrite_literal(mut self, host: impl Into<String>) -> Self {
        self.host_rewrite_literal = Some(host.into());
        self
    }
}

/// What to do when an origin is submitted twice
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateClusterPolicy {
    /// Append a second cluster with the same name (logged as a warning)
    #[default]
    Allow,
    /// Fail the submission
    Reject,
}

/// Values stamped into synthesized resources
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct XdsConfig {
    /// Shared connect / route timeout, parsed by humantime ("25s", "1m")
    pub timeout: String,
    pub cluster_version: String,
    pub route_version: String,
    pub route_config_name: String,
    pub virtual_host_name: String,
    pub virtual_host_domains: Vec<String>,
    pub tls_transport_socket_name: String,
    pub duplicate_clusters: DuplicateClusterPolicy,
    pub pretty: bool,
}

impl Default for XdsConfig {
    fn default() -> Self {
        Self {
            timeout: "25s".to_string(),
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

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    /// EnvFilter directive, overridden by RUST_LOG
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// File based delivery of rendered snapshots
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct DeliveryConfig {
    pub output_dir: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ControlPlaneConfig {
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub xds: XdsConfig,
    #[serde(default)]
    pub delivery: DeliveryConfig,
    /// Intents applied in order at startup
    #[serde(default)]
    pub intents: Vec<RoutingIntent>,
}

impl Default for ControlPlaneConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            logging: LoggingConfig::default(),
            xds: XdsConfig::default(),
            delivery: DeliveryConfig::default(),
            intents: Vec::new(),
        }
    }
}
