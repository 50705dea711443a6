use std::time::Duration;

use crate::core::{
    error::XdsResult,
    origin::Origin,
    policy::SynthesisPolicy,
    resources::{
        Address, Any, Cluster, ClusterLoadAssignment, DiscoveryType, Endpoint, LbEndpoint,
        LbPolicy, LocalityLbEndpoints, SocketAddress, SocketProtocol, TransportSocket,
        UpstreamTlsContext,
    },
};

/// Builds one upstream cluster per origin.
///
/// Clusters use logical DNS resolution, so the data plane re-resolves the
/// host when it opens connections. Nothing here touches the network.
#[derive(Debug, Clone)]
pub struct ClusterSynthesizer {
    connect_timeout: Duration,
    transport_socket_name: String,
}

impl Default for ClusterSynthesizer {
    fn default() -> Self {
        Self::new(&SynthesisPolicy::default())
    }
}

impl ClusterSynthesizer {
    pub fn new(policy: &SynthesisPolicy) -> Self {
        Self {
            connect_timeout: policy.timeout,
            transport_socket_name: policy.tls_transport_socket_name.clone(),
        }
    }

    /// Parse `origin` and build its cluster.
    pub fn synthesize(&self, origin: &str) -> XdsResult<Cluster> {
        let origin = Origin::parse(origin)?;
        Ok(self.synthesize_origin(&origin))
    }

    /// Build the cluster for an already parsed origin.
    pub fn synthesize_origin(&self, origin: &Origin) -> Cluster {
        let name = origin.as_str().to_string();

        let endpoint = LbEndpoint {
            endpoint: Endpoint {
                address: Address {
                    socket_address: SocketAddress {
                        address: origin.host().to_string(),
                        port_value: origin.port(),
                        protocol: SocketProtocol::Tcp,
                    },
                },
            },
        };

        let transport_socket = origin.is_secure().then(|| TransportSocket {
            name: self.transport_socket_name.clone(),
            typed_config: Any::pack(UpstreamTlsContext {
                sni: origin.host().to_string(),
            }),
        });

        tracing::debug!(
            cluster = %name,
            host = origin.host(),
            port = origin.port(),
            tls = transport_socket.is_some(),
            "Synthesized cluster"
        );

        Cluster {
            load_assignment: ClusterLoadAssignment {
                cluster_name: name.clone(),
                endpoints: vec![LocalityLbEndpoints {
                    lb_endpoints: vec![endpoint],
                }],
            },
            name,
            discovery_type: DiscoveryType::LogicalDns,
            connect_timeout: self.connect_timeout.into(),
            lb_policy: LbPolicy::RoundRobin,
            transport_socket,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::core::{
        error::XdsError,
        resources::{CLUSTER_TYPE_URL, UPSTREAM_TLS_CONTEXT_TYPE_URL},
    };

    #[test]
    fn test_secure_origin_gets_tls_with_sni() {
        let cluster = ClusterSynthesizer::default()
            .synthesize("https://api.example.com")
            .unwrap();

        assert_eq!(cluster.name, "https://api.example.com");
        assert_eq!(cluster.tls_sni(), Some("api.example.com"));
        let socket = cluster.transport_socket.as_ref().unwrap();
        assert_eq!(socket.name, "envoy.transport_sockets.tls");

        let ports: Vec<u16> = cluster.socket_addresses().map(|a| a.port_value).collect();
        assert_eq!(ports, vec![443]);
    }

    #[test]
    fn test_plain_origin_has_no_transport_socket() {
        let cluster = ClusterSynthesizer::default()
            .synthesize("http://backend.internal:8080")
            .unwrap();

        assert!(cluster.transport_socket.is_none());
        assert_eq!(cluster.tls_sni(), None);
        let addresses: Vec<_> = cluster.socket_addresses().collect();
        assert_eq!(addresses.len(), 1);
        assert_eq!(addresses[0].address, "backend.internal");
        assert_eq!(addresses[0].port_value, 8080);
    }

    #[test]
    fn test_fixed_policy_fields() {
        let cluster = ClusterSynthesizer::default()
            .synthesize("http://backend.internal")
            .unwrap();

        assert_eq!(cluster.discovery_type, DiscoveryType::LogicalDns);
        assert_eq!(cluster.lb_policy, LbPolicy::RoundRobin);
        assert_eq!(cluster.connect_timeout.as_duration(), Duration::from_secs(25));
        assert_eq!(cluster.load_assignment.cluster_name, cluster.name);
        assert_eq!(cluster.load_assignment.endpoints.len(), 1);
    }

    #[test]
    fn test_policy_timeout_is_used() {
        let policy = SynthesisPolicy {
            timeout: Duration::from_secs(5),
            ..SynthesisPolicy::default()
        };
        let cluster = ClusterSynthesizer::new(&policy)
            .synthesize("http://backend.internal")
            .unwrap();
        assert_eq!(cluster.connect_timeout.as_duration(), Duration::from_secs(5));
    }

    #[test]
    fn test_malformed_origin_is_rejected() {
        let err = ClusterSynthesizer::default()
            .synthesize("not-a-url")
            .unwrap_err();
        assert!(matches!(err, XdsError::MalformedOrigin { .. }));
    }

    #[test]
    fn test_secure_cluster_json_shape() {
        let cluster = ClusterSynthesizer::default()
            .synthesize("https://api.example.com")
            .unwrap();
        let value = serde_json::to_value(Any::pack(cluster)).unwrap();

        assert_eq!(
            value,
            json!({
                "@type": CLUSTER_TYPE_URL,
                "name": "https://api.example.com",
                "type": "LOGICAL_DNS",
                "connect_timeout": "25s",
                "lb_policy": "ROUND_ROBIN",
                "load_assignment": {
                    "cluster_name": "https://api.example.com",
                    "endpoints": [{
                        "lb_endpoints": [{
                            "endpoint": {
                                "address": {
                                    "socket_address": {
                                        "address": "api.example.com",
                                        "port_value": 443,
                                        "protocol": "TCP"
                                    }
                                }
                            }
                        }]
                    }]
                },
                "transport_socket": {
                    "name": "envoy.transport_sockets.tls",
                    "typed_config": {
                        "@type": UPSTREAM_TLS_CONTEXT_TYPE_URL,
                        "sni": "api.example.com"
                    }
                }
            })
        );
    }
}
