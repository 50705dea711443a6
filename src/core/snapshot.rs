//! Snapshot assembly.
//!
//! The `SnapshotAssembler` owns the ordered cluster and route sequences and
//! renders both discovery envelopes from scratch on every read. Submissions are
//! all-or-nothing: a cluster is never appended without its paired route.
//!
//! The assembler holds plain mutable state. Callers that share one across
//! tasks must wrap it in a lock (see `adapters::http_api`).
use serde::{Deserialize, Serialize};

use crate::{
    config::models::{DuplicateClusterPolicy, RoutingIntent},
    core::{
        cluster::ClusterSynthesizer,
        error::{XdsError, XdsResult},
        policy::SynthesisPolicy,
        resources::{Cluster, DiscoveryResponse, Route, RouteConfiguration, VirtualHost},
        route::RouteSynthesizer,
    },
};

/// Serialized cluster and route envelopes taken at the same instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub clusters: String,
    pub routes: String,
}

impl Snapshot {
    /// Render as a JSON object with `clusters` and `routes` string fields.
    pub fn to_json(&self) -> XdsResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[derive(Debug)]
pub struct SnapshotAssembler {
    policy: SynthesisPolicy,
    cluster_synthesizer: ClusterSynthesizer,
    route_synthesizer: RouteSynthesizer,
    clusters: Vec<Cluster>,
    routes: Vec<Route>,
}

impl Default for SnapshotAssembler {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotAssembler {
    /// Create an empty assembler with the stock policy.
    pub fn new() -> Self {
        Self::build_with(SynthesisPolicy::default())
    }

    /// Create an empty assembler with a custom policy.
    pub fn with_policy(policy: SynthesisPolicy) -> XdsResult<Self> {
        policy.validate()?;
        Ok(Self::build_with(policy))
    }

    fn build_with(policy: SynthesisPolicy) -> Self {
        Self {
            cluster_synthesizer: ClusterSynthesizer::new(&policy),
            route_synthesizer: RouteSynthesizer::new(&policy),
            policy,
            clusters: Vec::new(),
            routes: Vec::new(),
        }
    }

    pub fn policy(&self) -> &SynthesisPolicy {
        &self.policy
    }

    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Number of accepted submissions
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Synthesize a cluster for `origin` and a route for `prefix` targeting it,
    /// append both, and return the full re-rendered snapshot.
    ///
    /// On any error neither sequence changes.
    pub fn submit(
        &mut self,
        origin: &str,
        prefix: &str,
        prefix_rewrite: Option<&str>,
        host_rewrite_literal: Option<&str>,
    ) -> XdsResult<Snapshot> {
        let span = tracing::info_span!("intent", origin = origin, prefix = prefix);
        let _enter = span.enter();

        let cluster = self.cluster_synthesizer.synthesize(origin)?;

        if self.clusters.iter().any(|c| c.name == cluster.name) {
            match self.policy.duplicate_clusters {
                DuplicateClusterPolicy::Reject => {
                    tracing::warn!(cluster = %cluster.name, "Rejecting duplicate cluster");
                    return Err(XdsError::DuplicateCluster(cluster.name));
                }
                DuplicateClusterPolicy::Allow => {
                    tracing::warn!(
                        cluster = %cluster.name,
                        "Cluster name already present; appending duplicate entry"
                    );
                }
            }
        }

        let route = self.route_synthesizer.synthesize(
            prefix,
            &cluster.name,
            prefix_rewrite,
            host_rewrite_literal,
        )?;

        self.clusters.push(cluster);
        self.routes.push(route);

        match self.build() {
            Ok(snapshot) => {
                tracing::info!(
                    clusters = self.clusters.len(),
                    routes = self.routes.len(),
                    "Accepted routing intent"
                );
                Ok(snapshot)
            }
            Err(e) => {
                self.clusters.pop();
                self.routes.pop();
                tracing::error!("Failed to render snapshot, submission rolled back: {}", e);
                Err(e)
            }
        }
    }

    /// Drop every submission after the first `len`, keeping clusters and
    /// routes paired. Used to undo a submission whose delivery failed.
    pub(crate) fn truncate(&mut self, len: usize) {
        self.clusters.truncate(len);
        self.routes.truncate(len);
    }

    pub fn submit_intent(&mut self, intent: &RoutingIntent) -> XdsResult<Snapshot> {
        self.submit(
            &intent.origin,
            &intent.prefix,
            intent.prefix_rewrite.as_deref(),
            intent.host_rewrite_literal.as_deref(),
        )
    }

    /// Cluster envelope: every cluster packed as its own resource.
    pub fn clusters_envelope(&self) -> DiscoveryResponse<&Cluster> {
        DiscoveryResponse::new(self.policy.cluster_version.as_str(), self.clusters.iter())
    }

    /// Route envelope: one route configuration holding one virtual host with
    /// every route in insertion order.
    pub fn routes_envelope(&self) -> DiscoveryResponse<RouteConfiguration> {
        let virtual_host = VirtualHost {
            name: self.policy.virtual_host_name.clone(),
            domains: self.policy.virtual_host_domains.clone(),
            routes: self.routes.clone(),
        };
        let route_configuration = RouteConfiguration {
            name: self.policy.route_config_name.clone(),
            virtual_hosts: vec![virtual_host],
        };
        DiscoveryResponse::new(
            self.policy.route_version.as_str(),
            std::iter::once(route_configuration),
        )
    }

    pub fn render_clusters_envelope(&self) -> XdsResult<String> {
        self.render(&self.clusters_envelope())
    }

    pub fn render_routes_envelope(&self) -> XdsResult<String> {
        self.render(&self.routes_envelope())
    }

    /// Render both envelopes into a [`Snapshot`].
    pub fn build(&self) -> XdsResult<Snapshot> {
        Ok(Snapshot {
            clusters: self.render_clusters_envelope()?,
            routes: self.render_routes_envelope()?,
        })
    }

    fn render<T: Serialize>(&self, value: &T) -> XdsResult<String> {
        let rendered = if self.policy.pretty {
            serde_json::to_string_pretty(value)?
        } else {
            serde_json::to_string(value)?
        };
        Ok(rendered)
    }
}
