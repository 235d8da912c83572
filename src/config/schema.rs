//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the router.
//! All types derive Serde traits for deserialization from config files.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::routing::error::{RoutingError, RoutingResult};
use crate::routing::extractor::Value;
use crate::routing::pattern::PatternSyntaxError;
use crate::routing::route::Route;

/// Root configuration for the router.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RouterConfig {
    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Route definitions, in priority order.
    pub routes: Vec<RouteConfig>,
}

impl RouterConfig {
    /// Build every route, stopping at the first bad pattern.
    pub fn build_routes(&self) -> RoutingResult<Vec<Route>> {
        self.routes
            .iter()
            .map(|route| {
                route.to_route().map_err(|source| RoutingError::Pattern {
                    name: route.name.clone(),
                    source,
                })
            })
            .collect()
    }
}

/// One route definition.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouteConfig {
    /// Unique route identifier.
    pub name: String,

    /// Route pattern, e.g. `flower/(id)` or `flower(/id,alias)`.
    pub pattern: String,

    /// Allowed methods; empty means any.
    #[serde(default)]
    pub methods: Vec<String>,

    /// Host to match (exact match).
    #[serde(default)]
    pub host: Option<String>,

    /// Scheme to match, `http` or `https`.
    #[serde(default)]
    pub scheme: Option<String>,

    /// Port expected for plain requests.
    #[serde(default)]
    pub port: Option<u16>,

    /// Port expected for `https` requests.
    #[serde(default)]
    pub ssl_port: Option<u16>,

    /// Default variable values.
    #[serde(default)]
    pub variables: BTreeMap<String, Value>,

    /// Per-variable constraint expressions.
    #[serde(default)]
    pub requirements: BTreeMap<String, String>,

    /// Opaque data handed back on match.
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub extra: serde_json::Value,
}

impl RouteConfig {
    /// Build the route this entry describes.
    pub fn to_route(&self) -> Result<Route, PatternSyntaxError> {
        let mut builder = Route::builder(&self.name, &self.pattern)
            .methods(&self.methods)
            .variables(self.variables.clone())
            .extra(self.extra.clone());

        for (name, expression) in &self.requirements {
            builder = builder.requirement(name, expression);
        }
        if let Some(host) = &self.host {
            builder = builder.host(host);
        }
        if let Some(scheme) = &self.scheme {
            builder = builder.scheme(scheme);
        }
        if let Some(port) = self.port {
            builder = builder.port(port);
        }
        if let Some(port) = self.ssl_port {
            builder = builder.ssl_port(port);
        }

        builder.build()
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
