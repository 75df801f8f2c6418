//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check every configured CIDR parses
//! - Validate value ranges (intervals > 0, addresses parse)
//! - Upstream must be a bare authority (`host:port`)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use axum::http::uri::Authority;
use ipnet::IpNet;
use thiserror::Error;

use crate::config::schema::ProxyConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field}: invalid CIDR {value:?}: {reason}")]
    InvalidCidr {
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },

    #[error("listener.bind_address {0:?} is not a socket address")]
    BindAddress(String),

    #[error("upstream.address must not be empty")]
    EmptyUpstream,

    #[error("upstream.address {0:?} is not host:port")]
    UpstreamAddress(String),
}

/// Validate the whole configuration, collecting every error.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_cidrs("trust.trusted_cidrs", &config.trust.trusted_cidrs, &mut errors);
    check_cidrs("trust.cluster_cidrs", &config.trust.cluster_cidrs, &mut errors);

    if config.trust.refresh_interval_secs == 0 {
        errors.push(ValidationError::Zero {
            field: "trust.refresh_interval_secs",
        });
    }
    if config.trust.dns_timeout_secs == 0 {
        errors.push(ValidationError::Zero {
            field: "trust.dns_timeout_secs",
        });
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::Zero {
            field: "timeouts.request_secs",
        });
    }
    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(
            config.listener.bind_address.clone(),
        ));
    }
    if config.upstream.address.trim().is_empty() {
        errors.push(ValidationError::EmptyUpstream);
    } else if config.upstream.address.parse::<Authority>().is_err() {
        errors.push(ValidationError::UpstreamAddress(
            config.upstream.address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_cidrs(field: &'static str, values: &[String], errors: &mut Vec<ValidationError>) {
    for value in values {
        if let Err(e) = value.parse::<IpNet>() {
            errors.push(ValidationError::InvalidCidr {
                field,
                value: value.clone(),
                reason: e.to_string(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&ProxyConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = ProxyConfig::default();
        config.trust.trusted_cidrs = vec!["10.0.0.0/8".into(), "not-a-cidr".into()];
        config.trust.cluster_cidrs = vec!["192.168.1.1".into()];
        config.trust.refresh_interval_secs = 0;
        config.upstream.address = String::new();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(matches!(
            &errors[0],
            ValidationError::InvalidCidr { field: "trust.trusted_cidrs", value, .. } if value == "not-a-cidr"
        ));
        // A bare address is not a prefix.
        assert!(matches!(
            &errors[1],
            ValidationError::InvalidCidr { field: "trust.cluster_cidrs", .. }
        ));
        assert!(errors.contains(&ValidationError::EmptyUpstream));
    }

    #[test]
    fn test_bad_bind_address() {
        let mut config = ProxyConfig::default();
        config.listener.bind_address = "localhost".into();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors, vec![ValidationError::BindAddress("localhost".into())]);
    }

    #[test]
    fn test_bad_upstream_address() {
        let mut config = ProxyConfig::default();
        config.upstream.address = "http://backend:3000/path".into();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::UpstreamAddress("http://backend:3000/path".into())]
        );
    }
}
