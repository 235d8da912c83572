//! Request dispatch engine.
//!
//! Compiles route patterns, indexes them in a segment trie and resolves
//! incoming request paths to a route plus its extracted variables.

pub mod config;
pub mod observability;
pub mod routing;

pub use config::schema::RouterConfig;
pub use routing::{
    MatchResult, PatternSyntaxError, RequestContext, Route, Router, RoutingError, TrieMatcher,
    Value, Variables,
};
