//! Routing error definitions.

use thiserror::Error;

use crate::routing::pattern::PatternSyntaxError;

/// Errors that can occur while building or querying a route table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoutingError {
    /// No route matched the request. A routine outcome, not a defect.
    #[error("no route matches {} {path}", .method.as_deref().unwrap_or("*"))]
    RouteNotFound { method: Option<String>, path: String },

    /// Two routes in one table share a name.
    #[error("duplicate route name '{0}'")]
    DuplicateRoute(String),

    /// A route pattern failed to compile or insert.
    #[error("route '{name}': {source}")]
    Pattern {
        name: String,
        #[source]
        source: PatternSyntaxError,
    },
}

impl RoutingError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, RoutingError::RouteNotFound { .. })
    }
}

/// Result type for routing operations.
pub type RoutingResult<T> = Result<T, RoutingError>;
