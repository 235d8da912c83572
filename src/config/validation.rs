//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Reject duplicate and empty route names
//! - Check methods, schemes and ports
//! - Compile every pattern and check it fits the trie
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RouterConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::RouterConfig;
use crate::routing::pattern::PatternSyntaxError;
use crate::routing::trie::TrieMatcher;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("route #{0} has an empty name")]
    EmptyName(usize),

    #[error("duplicate route name '{0}'")]
    DuplicateName(String),

    #[error("route '{route}': invalid method '{method}'")]
    InvalidMethod { route: String, method: String },

    #[error("route '{route}': unsupported scheme '{scheme}'")]
    UnsupportedScheme { route: String, scheme: String },

    #[error("route '{route}': port must be non-zero")]
    ZeroPort { route: String },

    #[error("route '{route}': {source}")]
    Pattern {
        route: String,
        #[source]
        source: PatternSyntaxError,
    },

    #[error("invalid metrics address '{0}'")]
    MetricsAddress(String),
}

/// Check a configuration, collecting every problem found.
pub fn validate_config(config: &RouterConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let mut names = HashSet::new();

    for (index, route) in config.routes.iter().enumerate() {
        if route.name.trim().is_empty() {
            errors.push(ValidationError::EmptyName(index));
        } else if !names.insert(route.name.as_str()) {
            errors.push(ValidationError::DuplicateName(route.name.clone()));
        }

        for method in &route.methods {
            if !is_method_token(method) {
                errors.push(ValidationError::InvalidMethod {
                    route: route.name.clone(),
                    method: method.clone(),
                });
            }
        }

        if let Some(scheme) = &route.scheme {
            if scheme != "http" && scheme != "https" {
                errors.push(ValidationError::UnsupportedScheme {
                    route: route.name.clone(),
                    scheme: scheme.clone(),
                });
            }
        }

        if route.port == Some(0) || route.ssl_port == Some(0) {
            errors.push(ValidationError::ZeroPort {
                route: route.name.clone(),
            });
        }

        if let Err(source) = route.to_route().and_then(|built| TrieMatcher::check(&built)) {
            errors.push(ValidationError::Pattern {
                route: route.name.clone(),
                source,
            });
        }
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// RFC 9110 `token` characters.
fn is_method_token(method: &str) -> bool {
    !method.is_empty()
        && method
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "!#$%&'*+-.^_`|~".contains(c))
}
