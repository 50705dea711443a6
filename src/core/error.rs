use thiserror::Error;

/// Errors raised while synthesizing or rendering discovery resources.
///
/// Every variant aborts the triggering submission before the snapshot is
/// touched, so the cluster and route sequences never drift apart.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum XdsError {
    /// The origin string is not a parseable absolute URL with a host
    #[error("Malformed origin '{origin}': {reason}")]
    MalformedOrigin { origin: String, reason: String },

    /// The origin parsed but no port could be determined for it
    #[error("Unresolvable origin '{origin}': no explicit port and no default port for scheme '{scheme}'")]
    UnresolvableOrigin { origin: String, scheme: String },

    /// Route inputs violate a structural constraint
    #[error("Invalid route: {0}")]
    InvalidRoute(String),

    /// A cluster with the same name already exists and the policy rejects duplicates
    #[error("Cluster '{0}' already exists in the snapshot")]
    DuplicateCluster(String),

    /// Synthesis policy values are unusable
    #[error("Invalid synthesis policy: {0}")]
    InvalidPolicy(String),

    /// Internal resource structure could not be rendered
    #[error("Failed to serialize discovery resources: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl XdsError {
    /// Whether the error was caused by caller input rather than an internal defect.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, XdsError::Serialization(_) | XdsError::InvalidPolicy(_))
    }
}

/// Result type for synthesis operations
pub type XdsResult<T> = Result<T, XdsError>;
