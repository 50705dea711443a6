//! Discovery resource model.
//!
//! These types mirror the subset of the Envoy v3 API this crate emits and
//! serialize to the proto3 JSON mapping Envoy accepts for REST and file based
//! discovery. Packed resources are wrapped in [`Any`], which writes the type URL
//! under the `@type` key next to the resource fields.
use std::{fmt, time::Duration};

use serde::{Serialize, Serializer};

pub const CLUSTER_TYPE_URL: &str = "type.googleapis.com/envoy.config.cluster.v3.Cluster";
pub const ROUTE_CONFIGURATION_TYPE_URL: &str =
    "type.googleapis.com/envoy.config.route.v3.RouteConfiguration";
pub const UPSTREAM_TLS_CONTEXT_TYPE_URL: &str =
    "type.googleapis.com/envoy.extensions.transport_sockets.tls.v3.UpstreamTlsContext";

/// A resource that can be packed into an [`Any`].
pub trait TypedResource: Serialize {
    const TYPE_URL: &'static str;
}

impl<T: TypedResource> TypedResource for &T {
    const TYPE_URL: &'static str = T::TYPE_URL;
}

/// Type-tagged resource wrapper (`google.protobuf.Any` in JSON form).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Any<T> {
    #[serde(rename = "@type")]
    pub type_url: &'static str,
    #[serde(flatten)]
    pub value: T,
}

impl<T: TypedResource> Any<T> {
    pub fn pack(value: T) -> Self {
        Self {
            type_url: T::TYPE_URL,
            value,
        }
    }
}

/// Duration rendered the way proto3 JSON expects (`"25s"`, `"1.500000000s"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProtoDuration(pub Duration);

impl ProtoDuration {
    pub fn as_duration(&self) -> Duration {
        self.0
    }
}

impl From<Duration> for ProtoDuration {
    fn from(value: Duration) -> Self {
        Self(value)
    }
}

impl fmt::Display for ProtoDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let nanos = self.0.subsec_nanos();
        if nanos == 0 {
            write!(f, "{}s", self.0.as_secs())
        } else {
            write!(f, "{}.{:09}s", self.0.as_secs(), nanos)
        }
    }
}

impl Serialize for ProtoDuration {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiscoveryType {
    /// The data plane resolves the host itself at connection time
    LogicalDns,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LbPolicy {
    RoundRobin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SocketProtocol {
    Tcp,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SocketAddress {
    pub address: String,
    pub port_value: u16,
    pub protocol: SocketProtocol,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Address {
    pub socket_address: SocketAddress,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Endpoint {
    pub address: Address,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LbEndpoint {
    pub endpoint: Endpoint,
}

/// Endpoints sharing one locality
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocalityLbEndpoints {
    pub lb_endpoints: Vec<LbEndpoint>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClusterLoadAssignment {
    pub cluster_name: String,
    pub endpoints: Vec<LocalityLbEndpoints>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpstreamTlsContext {
    pub sni: String,
}

impl TypedResource for UpstreamTlsContext {
    const TYPE_URL: &'static str = UPSTREAM_TLS_CONTEXT_TYPE_URL;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransportSocket {
    pub name: String,
    pub typed_config: Any<UpstreamTlsContext>,
}

/// Upstream cluster definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cluster {
    pub name: String,
    #[serde(rename = "type")]
    pub discovery_type: DiscoveryType,
    pub connect_timeout: ProtoDuration,
    pub lb_policy: LbPolicy,
    pub load_assignment: ClusterLoadAssignment,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transport_socket: Option<TransportSocket>,
}

impl Cluster {
    /// All socket addresses across every locality, in declaration order.
    pub fn socket_addresses(&self) -> impl Iterator<Item = &SocketAddress> {
        self.load_assignment
            .endpoints
            .iter()
            .flat_map(|locality| locality.lb_endpoints.iter())
            .map(|lb| &lb.endpoint.address.socket_address)
    }

    /// SNI presented upstream, if the cluster speaks TLS.
    pub fn tls_sni(&self) -> Option<&str> {
        self.transport_socket
            .as_ref()
            .map(|socket| socket.typed_config.value.sni.as_str())
    }
}

impl TypedResource for Cluster {
    const TYPE_URL: &'static str = CLUSTER_TYPE_URL;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteMatch {
    pub prefix: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteAction {
    pub cluster: String,
    pub timeout: ProtoDuration,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix_rewrite: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host_rewrite_literal: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Route {
    #[serde(rename = "match")]
    pub route_match: RouteMatch,
    pub route: RouteAction,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VirtualHost {
    pub name: String,
    pub domains: Vec<String>,
    pub routes: Vec<Route>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteConfiguration {
    pub name: String,
    pub virtual_hosts: Vec<VirtualHost>,
}

impl TypedResource for RouteConfiguration {
    const TYPE_URL: &'static str = ROUTE_CONFIGURATION_TYPE_URL;
}

/// Versioned envelope delivered to the data plane.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscoveryResponse<T> {
    pub version_info: String,
    pub resources: Vec<Any<T>>,
    pub type_url: &'static str,
}

impl<T: TypedResource> DiscoveryResponse<T> {
    pub fn new(version_info: impl Into<String>, resources: impl IntoIterator<Item = T>) -> Self {
        Self {
            version_info: version_info.into(),
            resources: resources.into_iter().map(Any::pack).collect(),
            type_url: T::TYPE_URL,
        }
    }
}
