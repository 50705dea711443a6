#![allow(clippy::collapsible_if)]

use std::{collections::HashSet, net::SocketAddr};

use regex::Regex;
use tracing_subscriber::EnvFilter;

use crate::{
    config::models::{ControlPlaneConfig, DuplicateClusterPolicy, RoutingIntent, XdsConfig},
    core::{origin::Origin, policy::SynthesisPolicy},
};

/// Validation result type alias
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validation error types
#[derive(Debug, thiserror::Error, Clone)]
pub enum ValidationError {
    #[error("Invalid field '{field}': {message}")]
    InvalidField { field: String, message: String },

    #[error("Invalid listen address '{address}': {reason}")]
    InvalidListenAddress { address: String, reason: String },

    #[error("Invalid intent #{index}: {message}")]
    InvalidIntent { index: usize, message: String },

    #[error("Origin '{origin}' is listed more than once but duplicate clusters are rejected")]
    DuplicateOrigin { origin: String },

    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },
}

/// Control plane configuration validator
pub struct ControlPlaneConfigValidator;

impl ControlPlaneConfigValidator {
    /// Validate the entire control plane configuration
    pub fn validate(config: &ControlPlaneConfig) -> ValidationResult<()> {
        let mut errors = Vec::new();

        if let Err(e) = Self::validate_listen_address(&config.listen_addr) {
            errors.push(e);
        }

        if let Err(e) = Self::validate_log_level(&config.logging.level) {
            errors.push(e);
        }

        if let Err(mut xds_errors) = Self::validate_xds_config(&config.xds) {
            errors.append(&mut xds_errors);
        }

        if let Some(dir) = &config.delivery.output_dir {
            if dir.trim().is_empty() {
                errors.push(ValidationError::InvalidField {
                    field: "delivery.output_dir".to_string(),
                    message: "Output directory cannot be blank".to_string(),
                });
            }
        }

        for (index, intent) in config.intents.iter().enumerate() {
            if let Err(e) = Self::validate_intent(index + 1, intent) {
                errors.push(e);
            }
        }

        if config.xds.duplicate_clusters == DuplicateClusterPolicy::Reject {
            errors.extend(Self::check_duplicate_origins(&config.intents));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::ValidationFailed {
                message: Self::format_multiple_errors(errors),
            })
        }
    }

    /// Validate listen address format
    fn validate_listen_address(address: &str) -> ValidationResult<()> {
        if address.parse::<SocketAddr>().is_err() {
            return Err(ValidationError::InvalidListenAddress {
                address: address.to_string(),
                reason: "Must be in format 'IP:PORT' (e.g., '127.0.0.1:18000' or '0.0.0.0:18000')"
                    .to_string(),
            });
        }
        Ok(())
    }

    fn validate_log_level(level: &str) -> ValidationResult<()> {
        EnvFilter::try_new(level)
            .map(|_| ())
            .map_err(|e| ValidationError::InvalidField {
                field: "logging.level".to_string(),
                message: format!("Invalid filter directive '{level}': {e}"),
            })
    }

    /// Validate resource policy values and virtual host domains
    fn validate_xds_config(xds: &XdsConfig) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(e) = SynthesisPolicy::try_from(xds) {
            errors.push(ValidationError::InvalidField {
                field: "xds".to_string(),
                message: e.to_string(),
            });
        }

        let domain_regex = Regex::new(
            r"^(\*|(\*[.\-])?[A-Za-z0-9][A-Za-z0-9.\-]*(:[0-9]{1,5})?|[A-Za-z0-9][A-Za-z0-9.\-]*\*)$",
        )
        .expect("invalid domain regex");

        for domain in &xds.virtual_host_domains {
            if !domain_regex.is_match(domain) {
                errors.push(ValidationError::InvalidField {
                    field: "xds.virtual_host_domains".to_string(),
                    message: format!("Invalid domain pattern: '{domain}'"),
                });
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Check that an intent would be accepted by the assembler
    fn validate_intent(index: usize, intent: &RoutingIntent) -> ValidationResult<()> {
        if let Err(e) = Origin::parse(&intent.origin) {
            return Err(ValidationError::InvalidIntent {
                index,
                message: e.to_string(),
            });
        }

        if intent.prefix.is_empty() {
            return Err(ValidationError::InvalidIntent {
                index,
                message: "Path prefix cannot be empty".to_string(),
            });
        }

        Ok(())
    }

    fn check_duplicate_origins(intents: &[RoutingIntent]) -> Vec<ValidationError> {
        let mut seen = HashSet::new();
        let mut reported = HashSet::new();
        let mut errors = Vec::new();

        for intent in intents {
            if !seen.insert(intent.origin.as_str()) && reported.insert(intent.origin.as_str()) {
                errors.push(ValidationError::DuplicateOrigin {
                    origin: intent.origin.clone(),
                });
            }
        }

        errors
    }

    /// One error is reported as is; several become a numbered list.
    fn format_multiple_errors(errors: Vec<ValidationError>) -> String {
        match errors.as_slice() {
            [] => String::new(),
            [only] => only.to_string(),
            all => all.iter().enumerate().fold(
                format!("{} problems in configuration:", all.len()),
                |mut message, (i, error)| {
                    message.push_str(&format!("\n  {}. {error}", i + 1));
                    message
                },
            ),
        }
    }
}
