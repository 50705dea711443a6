use std::time::Duration;

use crate::core::{
    error::{XdsError, XdsResult},
    policy::SynthesisPolicy,
    resources::{Route, RouteAction, RouteMatch},
};

/// Builds prefix-match routes pointing at a named cluster.
///
/// The caller guarantees the target cluster exists; no cross-check happens here.
#[derive(Debug, Clone)]
pub struct RouteSynthesizer {
    timeout: Duration,
}

impl Default for RouteSynthesizer {
    fn default() -> Self {
        Self::new(&SynthesisPolicy::default())
    }
}

impl RouteSynthesizer {
    pub fn new(policy: &SynthesisPolicy) -> Self {
        Self {
            timeout: policy.timeout,
        }
    }

    /// Build a route for `prefix` targeting `cluster_name`.
    ///
    /// Blank (empty or whitespace-only) rewrites are treated as absent;
    /// non-blank ones are kept verbatim.
    pub fn synthesize(
        &self,
        prefix: &str,
        cluster_name: &str,
        prefix_rewrite: Option<&str>,
        host_rewrite_literal: Option<&str>,
    ) -> XdsResult<Route> {
        if prefix.is_empty() {
            return Err(XdsError::InvalidRoute(
                "path prefix cannot be empty".to_string(),
            ));
        }
        if cluster_name.is_empty() {
            return Err(XdsError::InvalidRoute(
                "target cluster name cannot be empty".to_string(),
            ));
        }

        Ok(Route {
            route_match: RouteMatch {
                prefix: prefix.to_string(),
            },
            route: RouteAction {
                cluster: cluster_name.to_string(),
                timeout: self.timeout.into(),
                prefix_rewrite: non_blank(prefix_rewrite),
                host_rewrite_literal: non_blank(host_rewrite_literal),
            },
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .filter(|v| !v.trim().is_empty())
        .map(str::to_string)
}
