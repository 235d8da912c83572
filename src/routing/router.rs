//! Route lookup and dispatch.
//!
//! # Responsibilities
//! - Hold the current route table generation
//! - Rebuild off to the side and swap atomically on reload
//! - Turn a miss into an explicit `RouteNotFound`
//!
//! # Design Decisions
//! - Readers never block: each lookup loads the current `Arc<TrieMatcher>`
//! - A failed reload leaves the previous generation serving
//! - Generation numbers start at 1 and only grow

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::config::schema::RouterConfig;
use crate::observability::metrics;
use crate::routing::error::{RoutingError, RoutingResult};
use crate::routing::matcher::RequestContext;
use crate::routing::route::Route;
use crate::routing::trie::{MatchResult, TrieMatcher};

/// Shared front door over a swappable [`TrieMatcher`].
#[derive(Debug)]
pub struct Router {
    current: ArcSwap<TrieMatcher>,
    generation: AtomicU64,
}

impl Router {
    /// Build the first generation from a list of routes.
    pub fn new<I>(routes: I) -> RoutingResult<Self>
    where
        I: IntoIterator<Item = Route>,
    {
        let matcher = TrieMatcher::with_routes(routes)?;
        Ok(Self {
            current: ArcSwap::from_pointee(matcher),
            generation: AtomicU64::new(1),
        })
    }

    /// Build the first generation from a loaded configuration.
    pub fn from_config(config: &RouterConfig) -> RoutingResult<Self> {
        Self::new(config.build_routes()?)
    }

    /// Replace the route table, returning the new generation number.
    pub fn reload<I>(&self, routes: I) -> RoutingResult<u64>
    where
        I: IntoIterator<Item = Route>,
    {
        let matcher = match TrieMatcher::with_routes(routes) {
            Ok(matcher) => matcher,
            Err(e) => {
                tracing::error!(error = %e, "Route table rejected, keeping current generation");
                metrics::record_reload_failure();
                return Err(e);
            }
        };

        let routes = matcher.len();
        self.current.store(Arc::new(matcher));
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;

        tracing::info!(generation, routes, "Route table swapped");
        Ok(generation)
    }

    /// Rebuild from a freshly loaded configuration.
    pub fn reload_config(&self, config: &RouterConfig) -> RoutingResult<u64> {
        let routes = config.build_routes().inspect_err(|_| metrics::record_reload_failure())?;
        self.reload(routes)
    }

    /// The generation currently serving lookups.
    pub fn snapshot(&self) -> Arc<TrieMatcher> {
        self.current.load_full()
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Match a request, surfacing a miss as [`RoutingError::RouteNotFound`].
    pub fn dispatch(
        &self,
        path: &str,
        method: Option<&str>,
        context: &RequestContext,
    ) -> RoutingResult<MatchResult> {
        self.current
            .load()
            .match_route(path, method, context)
            .ok_or_else(|| RoutingError::RouteNotFound {
                method: method.map(str::to_string),
                path: path.to_string(),
            })
    }
}
