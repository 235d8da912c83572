//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route Registration (at startup / reload):
//!     Route { name, pattern, requirements, ... }
//!     → pattern.rs (parse into tokens)
//!     → compiler.rs (anchored expression + capture metadata)
//!     → trie.rs (expand shapes, insert into segment trie)
//!     → router.rs (swap in as the current generation)
//!
//! Incoming Request (path, method, host, scheme, port):
//!     → trie.rs (structural walk with backtracking)
//!     → matcher.rs (host / scheme / port / method conditions)
//!     → Return: MatchResult or RouteNotFound
//! ```
//!
//! # Design Decisions
//! - Routes compiled at registration, immutable at runtime
//! - Deterministic: same input always matches same route
//! - First eligible match wins; ties go to the earlier registration
//! - A miss is an ordinary value, never a panic

pub mod compiler;
pub mod error;
pub mod extractor;
pub mod matcher;
pub mod pattern;
pub mod route;
pub mod router;
pub mod trie;

pub use compiler::{compile, CaptureKind, CompiledExpression, Requirements};
pub use error::{RoutingError, RoutingResult};
pub use extractor::{extract, Value, Variables};
pub use matcher::RequestContext;
pub use pattern::{Pattern, PatternSyntaxError};
pub use route::{Route, RouteBuilder};
pub use router::Router;
pub use trie::{Attempt, MatchResult, TrieMatcher};
