//! Context conditions applied to structural candidates.
//!
//! # Responsibilities
//! - Match host (exact)
//! - Match scheme (exact)
//! - Match port, choosing the SSL port when the effective scheme is secure
//! - Match method against the route's allowed set
//! - Combine conditions with AND semantics
//!
//! # Design Decisions
//! - Unset route constraint = no condition (always matches)
//! - A missing request port counts as [`DEFAULT_PORT`]
//! - No method on the request skips the method check

use crate::routing::route::Route;

/// Port assumed when the request does not carry one.
pub const DEFAULT_PORT: u16 = 80;

/// Scheme that selects a route's SSL port.
pub const SECURE_SCHEME: &str = "https";

/// Network facts about the incoming request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    pub host: Option<String>,
    pub scheme: Option<String>,
    pub port: Option<u16>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = Some(scheme.into());
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }
}

/// What a condition sees of one request.
#[derive(Debug, Clone, Copy)]
pub struct MatchRequest<'a> {
    pub method: Option<&'a str>,
    pub context: &'a RequestContext,
}

/// Trait for matching requests against route conditions.
pub trait Matcher: Send + Sync + std::fmt::Debug {
    /// Returns true if the request satisfies this condition.
    fn matches(&self, req: &MatchRequest<'_>) -> bool;
}

/// Matches the request host.
#[derive(Debug, Clone)]
pub struct HostMatcher {
    expected_host: String,
}

impl HostMatcher {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            expected_host: host.into(),
        }
    }
}

impl Matcher for HostMatcher {
    fn matches(&self, req: &MatchRequest<'_>) -> bool {
        req.context.host.as_deref() == Some(self.expected_host.as_str())
    }
}

/// Matches the request scheme.
#[derive(Debug, Clone)]
pub struct SchemeMatcher {
    expected_scheme: String,
}

impl SchemeMatcher {
    pub fn new(scheme: impl Into<String>) -> Self {
        Self {
            expected_scheme: scheme.into(),
        }
    }
}

impl Matcher for SchemeMatcher {
    fn matches(&self, req: &MatchRequest<'_>) -> bool {
        req.context.scheme.as_deref() == Some(self.expected_scheme.as_str())
    }
}

/// Matches the request port against the plain or SSL port of a route.
#[derive(Debug, Clone)]
pub struct PortMatcher {
    route_scheme: Option<String>,
    port: Option<u16>,
    ssl_port: Option<u16>,
}

impl PortMatcher {
    pub fn new(route_scheme: Option<String>, port: Option<u16>, ssl_port: Option<u16>) -> Self {
        Self {
            route_scheme,
            port,
            ssl_port,
        }
    }
}

impl Matcher for PortMatcher {
    fn matches(&self, req: &MatchRequest<'_>) -> bool {
        let scheme = req
            .context
            .scheme
            .as_deref()
            .or(self.route_scheme.as_deref())
            .unwrap_or("http");

        let expected = if scheme == SECURE_SCHEME {
            self.ssl_port
        } else {
            self.port
        };

        match expected {
            Some(port) => req.context.port.unwrap_or(DEFAULT_PORT) == port,
            None => true,
        }
    }
}

/// Matches the request method against an allowed set.
#[derive(Debug, Clone)]
pub struct MethodMatcher {
    methods: Vec<String>,
}

impl MethodMatcher {
    pub fn new(methods: Vec<String>) -> Self {
        Self { methods }
    }
}

impl Matcher for MethodMatcher {
    fn matches(&self, req: &MatchRequest<'_>) -> bool {
        match req.method {
            Some(method) => self.methods.iter().any(|m| m.eq_ignore_ascii_case(method)),
            None => true,
        }
    }
}

/// Combines multiple matchers with AND semantics.
#[derive(Debug, Default)]
pub struct AndMatcher {
    matchers: Vec<Box<dyn Matcher>>,
}

impl AndMatcher {
    pub fn new(matchers: Vec<Box<dyn Matcher>>) -> Self {
        Self { matchers }
    }

    /// Conditions for every constraint the route sets.
    pub fn for_route(route: &Route) -> Self {
        let mut matchers: Vec<Box<dyn Matcher>> = Vec::new();

        if let Some(host) = route.host() {
            matchers.push(Box::new(HostMatcher::new(host)));
        }
        if let Some(scheme) = route.scheme() {
            matchers.push(Box::new(SchemeMatcher::new(scheme)));
        }
        if route.port().is_some() || route.ssl_port().is_some() {
            matchers.push(Box::new(PortMatcher::new(
                route.scheme().map(str::to_string),
                route.port(),
                route.ssl_port(),
            )));
        }
        if !route.methods().is_empty() {
            matchers.push(Box::new(MethodMatcher::new(route.methods().to_vec())));
        }

        Self { matchers }
    }

    pub fn len(&self) -> usize {
        self.matchers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matchers.is_empty()
    }
}

impl Matcher for AndMatcher {
    fn matches(&self, req: &MatchRequest<'_>) -> bool {
        // All matchers must pass (AND)
        self.matchers.iter().all(|m| m.matches(req))
    }
}
