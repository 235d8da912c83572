//! Segment trie matcher.
//!
//! # Data Flow
//! ```text
//! set_routes(Route[])
//!     → expand optional groups into concrete shapes
//!     → split each shape into segments: literal / variable / wildcard
//!     → insert into a fresh node arena, swap in on success
//!
//! match_route(path, method, context)
//!     → walk segments depth-first, edges tried literal → variable → wildcard
//!     → at an exhausted node, bind and filter terminals in registration order
//!     → first eligible route + bound variables, or None
//! ```
//!
//! # Design Decisions
//! - A node has at most one variable and one wildcard edge; names and
//!   requirements are bound per route at the terminal, so routes of the
//!   same shape are always ranked by registration order
//! - The walk keeps an explicit frame stack instead of recursing
//! - A failed requirement or context filter backtracks like a structural dead end
//! - Wildcards bind at least one segment; `(/*name)` covers the empty case
//! - Nothing in the tree is mutated while matching; the attempt counter is
//!   per call and only published afterwards

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use regex::Regex;

use crate::observability::metrics;
use crate::routing::compiler::{named_group, requirement_for, Requirements};
use crate::routing::error::{RoutingError, RoutingResult};
use crate::routing::extractor::{path_segments, Value, Variables};
use crate::routing::matcher::{AndMatcher, MatchRequest, Matcher, RequestContext};
use crate::routing::pattern::{PatternSyntaxError, Token};
use crate::routing::route::Route;

const ROOT: usize = 0;

/// Most concrete shapes a single pattern may expand to.
pub const MAX_SHAPES: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Piece {
    Literal(String),
    Variable(String),
    Wildcard(String),
}

#[derive(Debug)]
enum Edge {
    Literal(String),
    Variable(SegmentMatcher),
    Wildcard(String),
}

/// Binds the variables of one path segment.
#[derive(Debug)]
struct SegmentMatcher {
    names: Vec<String>,
    /// `None` for a lone variable without a requirement.
    constraint: Option<Regex>,
}

impl SegmentMatcher {
    fn from_pieces(
        pieces: &[Piece],
        requirements: &Requirements,
    ) -> Result<Self, PatternSyntaxError> {
        let mut source = String::new();
        let mut names = Vec::new();
        let mut constrained = pieces.len() > 1;

        for piece in pieces {
            match piece {
                Piece::Literal(text) => source.push_str(&regex::escape(text)),
                Piece::Variable(name) => {
                    constrained |= requirements.contains_key(name);
                    source.push_str(&named_group(name, requirement_for(name, requirements)?));
                    names.push(name.clone());
                }
                Piece::Wildcard(name) => {
                    return Err(PatternSyntaxError::WildcardSegment(name.clone()));
                }
            }
        }

        let constraint = if constrained {
            let regex = Regex::new(&format!("^{source}$"))
                .map_err(|e| PatternSyntaxError::Expression(e.to_string()))?;
            Some(regex)
        } else {
            None
        };

        Ok(Self { names, constraint })
    }

    fn bind(&self, segment: &str, out: &mut Variables) -> bool {
        let Some(constraint) = &self.constraint else {
            if let Some(name) = self.names.first() {
                out.insert(name.clone(), Value::Scalar(segment.to_string()));
            }
            return true;
        };

        let Some(captures) = constraint.captures(segment) else {
            return false;
        };
        for name in &self.names {
            if let Some(m) = captures.name(name).filter(|m| !m.is_empty()) {
                out.insert(name.clone(), Value::Scalar(m.as_str().to_string()));
            }
        }
        true
    }
}

/// How a route binds the value under one non-literal edge of its shape.
#[derive(Debug)]
enum Slot {
    Segment(SegmentMatcher),
    Rest(String),
}

/// Where the walk crossed a non-literal edge.
#[derive(Debug, Clone, Copy)]
enum Bound {
    Segment(usize),
    Segments { start: usize, end: usize },
}

/// A route shape ending at a node, one slot per non-literal edge on the way.
#[derive(Debug)]
struct Terminal {
    route: usize,
    slots: Vec<Slot>,
}

impl Terminal {
    fn bind(&self, segments: &[&str], bound: &[Bound]) -> Option<Variables> {
        if self.slots.len() != bound.len() {
            debug_assert!(false, "terminal of route {} reached off its shape", self.route);
            return None;
        }

        let mut vars = Variables::new();
        for (slot, bound) in self.slots.iter().zip(bound) {
            match (slot, *bound) {
                (Slot::Segment(matcher), Bound::Segment(index)) => {
                    if !matcher.bind(segments.get(index)?, &mut vars) {
                        return None;
                    }
                }
                (Slot::Rest(name), Bound::Segments { start, end }) => {
                    let items = segments.get(start..end)?;
                    vars.insert(
                        name.clone(),
                        Value::List(items.iter().map(|s| s.to_string()).collect()),
                    );
                }
                _ => {
                    debug_assert!(false, "slot kinds diverge for route {}", self.route);
                    return None;
                }
            }
        }
        Some(vars)
    }
}

#[derive(Debug, Default)]
struct Node {
    literals: HashMap<String, usize>,
    variable: Option<usize>,
    wildcard: Option<usize>,
    /// Registration order is priority order.
    terminals: Vec<Terminal>,
}

impl Node {
    fn is_leaf(&self) -> bool {
        self.literals.is_empty() && self.variable.is_none() && self.wildcard.is_none()
    }
}

#[derive(Debug, Clone, Copy)]
enum Step {
    Literal,
    Variable,
    /// Segments the wildcard takes next; zero when exhausted.
    Wildcard { take: usize },
}

#[derive(Debug)]
struct Frame {
    node: usize,
    depth: usize,
    /// Bindings length before the edge into this node was taken.
    bound: usize,
    step: Step,
}

impl Frame {
    fn new(node: usize, depth: usize, bound: usize) -> Self {
        Self {
            node,
            depth,
            bound,
            step: Step::Literal,
        }
    }
}

enum Action {
    Push(Frame),
    Pop,
    Accept(usize, Variables),
    Continue,
}

struct Walk {
    hit: Option<(usize, Variables)>,
    frames: usize,
}

#[derive(Debug)]
struct Trie {
    nodes: Vec<Node>,
}

impl Default for Trie {
    fn default() -> Self {
        Self {
            nodes: vec![Node::default()],
        }
    }
}

impl Trie {
    fn insert(&mut self, route: usize, edges: Vec<Edge>) {
        let mut node = ROOT;
        let mut slots = Vec::new();

        for edge in edges {
            node = match edge {
                Edge::Literal(text) => match self.nodes[node].literals.get(&text) {
                    Some(&child) => child,
                    None => {
                        let child = self.push_node();
                        self.nodes[node].literals.insert(text, child);
                        child
                    }
                },
                Edge::Variable(matcher) => {
                    slots.push(Slot::Segment(matcher));
                    match self.nodes[node].variable {
                        Some(child) => child,
                        None => {
                            let child = self.push_node();
                            self.nodes[node].variable = Some(child);
                            child
                        }
                    }
                }
                Edge::Wildcard(name) => {
                    slots.push(Slot::Rest(name));
                    match self.nodes[node].wildcard {
                        Some(child) => child,
                        None => {
                            let child = self.push_node();
                            self.nodes[node].wildcard = Some(child);
                            child
                        }
                    }
                }
            };
        }

        self.nodes[node].terminals.push(Terminal { route, slots });
    }

    fn push_node(&mut self) -> usize {
        self.nodes.push(Node::default());
        self.nodes.len() - 1
    }

    fn walk<F>(&self, segments: &[&str], mut accept: F) -> Walk
    where
        F: FnMut(usize) -> bool,
    {
        let mut stack = vec![Frame::new(ROOT, 0, 0)];
        let mut bindings: Vec<Bound> = Vec::new();
        let mut frames = 1;

        while let Some(frame) = stack.last_mut() {
            match self.advance(frame, segments, &mut bindings, &mut accept) {
                Action::Push(next) => {
                    stack.push(next);
                    frames += 1;
                }
                Action::Pop => {
                    if let Some(done) = stack.pop() {
                        bindings.truncate(done.bound);
                    }
                }
                Action::Accept(route, vars) => {
                    return Walk {
                        hit: Some((route, vars)),
                        frames,
                    };
                }
                Action::Continue => {}
            }
        }

        Walk { hit: None, frames }
    }

    fn advance<F>(
        &self,
        frame: &mut Frame,
        segments: &[&str],
        bindings: &mut Vec<Bound>,
        accept: &mut F,
    ) -> Action
    where
        F: FnMut(usize) -> bool,
    {
        let Some(node) = self.nodes.get(frame.node) else {
            debug_assert!(false, "walk reached missing node {}", frame.node);
            return Action::Pop;
        };

        if frame.depth == segments.len() {
            for terminal in &node.terminals {
                if let Some(vars) = terminal.bind(segments, bindings) {
                    if accept(terminal.route) {
                        return Action::Accept(terminal.route, vars);
                    }
                }
            }
            return Action::Pop;
        }

        let segment = segments[frame.depth];
        let remaining = segments.len() - frame.depth;

        match frame.step {
            Step::Literal => {
                frame.step = Step::Variable;
                match node.literals.get(segment) {
                    Some(&child) => Action::Push(Frame::new(child, frame.depth + 1, bindings.len())),
                    None => Action::Continue,
                }
            }
            Step::Variable => {
                frame.step = Step::Wildcard { take: remaining };
                match node.variable {
                    Some(child) => {
                        let bound = bindings.len();
                        bindings.push(Bound::Segment(frame.depth));
                        Action::Push(Frame::new(child, frame.depth + 1, bound))
                    }
                    None => Action::Continue,
                }
            }
            Step::Wildcard { take } => {
                let Some(child) = node.wildcard.filter(|_| take > 0) else {
                    return Action::Pop;
                };

                // Greedy: longest run first, shrinking only if more edges follow.
                let leaf = self.nodes.get(child).map_or(true, Node::is_leaf);
                frame.step = Step::Wildcard {
                    take: if leaf { 0 } else { take - 1 },
                };

                let bound = bindings.len();
                bindings.push(Bound::Segments {
                    start: frame.depth,
                    end: frame.depth + take,
                });
                Action::Push(Frame::new(child, frame.depth + take, bound))
            }
        }
    }
}

/// Every concrete piece sequence a token list can take.
fn expand(tokens: &[Token]) -> Result<Vec<Vec<Piece>>, PatternSyntaxError> {
    let mut shapes: Vec<Vec<Piece>> = vec![Vec::new()];

    for token in tokens {
        match token {
            Token::Literal(text) => shapes
                .iter_mut()
                .for_each(|shape| shape.push(Piece::Literal(text.clone()))),
            Token::Variable(name) => shapes
                .iter_mut()
                .for_each(|shape| shape.push(Piece::Variable(name.clone()))),
            Token::Wildcard(name) => shapes
                .iter_mut()
                .for_each(|shape| shape.push(Piece::Wildcard(name.clone()))),
            Token::Optional(inner) => {
                let tails = expand(inner)?;
                let total = shapes.len() * (tails.len() + 1);
                if total > MAX_SHAPES {
                    return Err(PatternSyntaxError::TooManyShapes(MAX_SHAPES));
                }

                let mut next = Vec::with_capacity(total);
                for shape in &shapes {
                    next.push(shape.clone());
                    for tail in &tails {
                        let mut longer = shape.clone();
                        longer.extend(tail.iter().cloned());
                        next.push(longer);
                    }
                }
                shapes = next;
            }
        }
    }

    Ok(shapes)
}

/// Cut a piece sequence at `/`, dropping empty segments.
fn split_segments(shape: Vec<Piece>) -> Vec<Vec<Piece>> {
    let mut segments = Vec::new();
    let mut current: Vec<Piece> = Vec::new();

    for piece in shape {
        let Piece::Literal(text) = piece else {
            current.push(piece);
            continue;
        };

        let mut parts = text.split('/');
        if let Some(first) = parts.next() {
            push_literal(&mut current, first);
        }
        for part in parts {
            if !current.is_empty() {
                segments.push(std::mem::take(&mut current));
            }
            push_literal(&mut current, part);
        }
    }

    if !current.is_empty() {
        segments.push(current);
    }
    segments
}

fn push_literal(segment: &mut Vec<Piece>, text: &str) {
    if text.is_empty() {
        return;
    }
    match segment.last_mut() {
        Some(Piece::Literal(prev)) => prev.push_str(text),
        _ => segment.push(Piece::Literal(text.to_string())),
    }
}

fn classify(pieces: Vec<Piece>, requirements: &Requirements) -> Result<Edge, PatternSyntaxError> {
    match pieces.as_slice() {
        [Piece::Literal(text)] => Ok(Edge::Literal(text.clone())),
        [Piece::Wildcard(name)] => Ok(Edge::Wildcard(name.clone())),
        _ => SegmentMatcher::from_pieces(&pieces, requirements).map(Edge::Variable),
    }
}

fn shapes_of(route: &Route) -> Result<Vec<Vec<Edge>>, PatternSyntaxError> {
    expand(route.pattern().tokens())?
        .into_iter()
        .map(|shape| {
            split_segments(shape)
                .into_iter()
                .map(|segment| classify(segment, route.requirements()))
                .collect()
        })
        .collect()
}

#[derive(Debug)]
struct Entry {
    route: Arc<Route>,
    conditions: AndMatcher,
}

/// A matched route and its variables.
#[derive(Debug, Clone)]
pub struct MatchResult {
    route: Arc<Route>,
    variables: Variables,
}

impl MatchResult {
    pub fn route(&self) -> &Arc<Route> {
        &self.route
    }

    pub fn name(&self) -> &str {
        self.route.name()
    }

    /// Captured values merged over the route defaults.
    pub fn variables(&self) -> &Variables {
        &self.variables
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.variables.get(name)
    }

    pub fn into_parts(self) -> (Arc<Route>, Variables) {
        (self.route, self.variables)
    }
}

/// Outcome of one match call with its own attempt count.
#[derive(Debug, Clone)]
pub struct Attempt {
    pub result: Option<MatchResult>,
    /// Walk frames pushed, root included.
    pub count: usize,
}

/// Route index over a segment trie.
#[derive(Debug, Default)]
pub struct TrieMatcher {
    trie: Trie,
    entries: Vec<Entry>,
    count: AtomicUsize,
}

impl TrieMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_routes<I, R>(routes: I) -> RoutingResult<Self>
    where
        I: IntoIterator<Item = R>,
        R: Into<Arc<Route>>,
    {
        let mut matcher = Self::new();
        matcher.set_routes(routes)?;
        Ok(matcher)
    }

    /// Rebuild the trie from scratch.
    ///
    /// Earlier routes win ties between identical shapes. On error the
    /// current table is left untouched.
    pub fn set_routes<I, R>(&mut self, routes: I) -> RoutingResult<&mut Self>
    where
        I: IntoIterator<Item = R>,
        R: Into<Arc<Route>>,
    {
        let mut trie = Trie::default();
        let mut entries = Vec::new();
        let mut names = HashSet::new();

        for route in routes {
            let route: Arc<Route> = route.into();
            if !names.insert(route.name().to_string()) {
                return Err(RoutingError::DuplicateRoute(route.name().to_string()));
            }

            let shapes = shapes_of(&route).map_err(|source| RoutingError::Pattern {
                name: route.name().to_string(),
                source,
            })?;

            let index = entries.len();
            for edges in shapes {
                trie.insert(index, edges);
            }
            entries.push(Entry {
                conditions: AndMatcher::for_route(&route),
                route,
            });
        }

        tracing::info!(
            routes = entries.len(),
            nodes = trie.nodes.len(),
            "Route trie rebuilt"
        );
        metrics::record_rebuild(entries.len());

        self.trie = trie;
        self.entries = entries;
        self.count.store(0, Ordering::Relaxed);
        Ok(self)
    }

    /// Check that a route can be inserted, without building a table.
    pub fn check(route: &Route) -> Result<(), PatternSyntaxError> {
        shapes_of(route).map(|_| ())
    }

    /// Match without touching shared state.
    pub fn attempt(&self, path: &str, method: Option<&str>, context: &RequestContext) -> Attempt {
        let segments: Vec<&str> = path_segments(path).collect();
        let request = MatchRequest { method, context };

        let walk = self.trie.walk(&segments, |index| match self.entries.get(index) {
            Some(entry) => entry.conditions.matches(&request),
            None => {
                debug_assert!(false, "terminal references unknown route {index}");
                false
            }
        });

        let result = walk.hit.and_then(|(index, captured)| {
            let entry = self.entries.get(index)?;
            let mut variables = entry.route.variables().clone();
            variables.extend(captured);
            Some(MatchResult {
                route: Arc::clone(&entry.route),
                variables,
            })
        });

        Attempt {
            result,
            count: walk.frames,
        }
    }

    /// Find the first eligible route for a request.
    pub fn match_route(
        &self,
        path: &str,
        method: Option<&str>,
        context: &RequestContext,
    ) -> Option<MatchResult> {
        let Attempt { result, count } = self.attempt(path, method, context);
        self.count.store(count, Ordering::Relaxed);
        metrics::record_match(result.is_some(), count);

        match &result {
            Some(matched) => tracing::debug!(
                path,
                method,
                route = matched.name(),
                attempts = count,
                "Route matched"
            ),
            None => tracing::debug!(path, method, attempts = count, "No route matched"),
        }
        result
    }

    /// Attempt count of the most recent `match_route` call.
    pub fn count(&self) -> usize {
        self.count.load(Ordering::Relaxed)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registered routes in registration order.
    pub fn routes(&self) -> impl Iterator<Item = &Arc<Route>> {
        self.entries.iter().map(|entry| &entry.route)
    }

    pub fn get(&self, name: &str) -> Option<&Arc<Route>> {
        self.routes().find(|route| route.name() == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::pattern::Pattern;

    fn matcher(routes: Vec<Route>) -> TrieMatcher {
        TrieMatcher::with_routes(routes).unwrap()
    }

    fn find(matcher: &TrieMatcher, path: &str) -> Option<MatchResult> {
        matcher.match_route(path, None, &RequestContext::new())
    }

    fn shape_text(pattern: &str) -> Vec<String> {
        let pattern = Pattern::parse(pattern).unwrap();
        expand(pattern.tokens())
            .unwrap()
            .into_iter()
            .map(|shape| {
                split_segments(shape)
                    .iter()
                    .map(|segment| {
                        segment
                            .iter()
                            .map(|piece| match piece {
                                Piece::Literal(t) => t.clone(),
                                Piece::Variable(n) => format!(":{n}"),
                                Piece::Wildcard(n) => format!("*{n}"),
                            })
                            .collect::<String>()
                    })
                    .collect::<Vec<_>>()
                    .join("/")
            })
            .collect()
    }

    #[test]
    fn test_optional_groups_expand() {
        assert_eq!(
            shape_text("/flower/caesar(/id,alias)"),
            vec!["flower/caesar", "flower/caesar/:id", "flower/caesar/:id/:alias"]
        );
        assert_eq!(shape_text("king(/*tags)"), vec!["king", "king/*tags"]);
        assert_eq!(shape_text("/"), vec![""]);
        assert_eq!(shape_text("/a/(id)-(alias)/"), vec!["a/:id-:alias"]);
    }

    #[test]
    fn test_literal_beats_variable() {
        let m = matcher(vec![
            Route::new("by-id", "flower/:id").unwrap(),
            Route::new("new", "flower/new").unwrap(),
        ]);
        assert_eq!(find(&m, "/flower/new").unwrap().name(), "new");
        assert_eq!(find(&m, "/flower/5").unwrap().name(), "by-id");
    }

    #[test]
    fn test_backtracks_from_literal_dead_end() {
        let m = matcher(vec![
            Route::new("edit", "flower/new/edit").unwrap(),
            Route::new("item", "flower/:id/item").unwrap(),
        ]);
        let matched = find(&m, "/flower/new/item").unwrap();
        assert_eq!(matched.name(), "item");
        assert_eq!(matched.get("id"), Some(&Value::from("new")));
        assert!(m.count() > 3);
    }

    #[test]
    fn test_registration_order_decides_between_variable_names() {
        let m = matcher(vec![
            Route::new("deeper", "a/:x/b").unwrap(),
            Route::new("first", "a/:y").unwrap(),
            Route::new("second", "a/:x").unwrap(),
        ]);
        let matched = find(&m, "/a/5").unwrap();
        assert_eq!(matched.name(), "first");
        assert_eq!(matched.get("y"), Some(&Value::from("5")));
        assert!(matched.get("x").is_none());
        assert_eq!(find(&m, "/a/5/b").unwrap().get("x"), Some(&Value::from("5")));
    }

    #[test]
    fn test_registration_order_with_requirements() {
        let m = matcher(vec![
            Route::new("query", "x/:alias/q").unwrap(),
            Route::builder("by-id", "x/:id")
                .requirement("id", r"\d+")
                .build()
                .unwrap(),
            Route::new("by-slug", "x/:slug").unwrap(),
        ]);
        assert_eq!(find(&m, "/x/5").unwrap().name(), "by-id");
        let matched = find(&m, "/x/abc").unwrap();
        assert_eq!(matched.name(), "by-slug");
        assert_eq!(matched.get("slug"), Some(&Value::from("abc")));
    }

    #[test]
    fn test_too_many_optional_groups() {
        let pattern: String = (0..18).map(|i| format!("(/v{i})")).collect();
        let route = Route::new("wide", format!("/base{pattern}")).unwrap();
        assert_eq!(
            TrieMatcher::check(&route),
            Err(PatternSyntaxError::TooManyShapes(MAX_SHAPES))
        );

        let pattern: String = (0..8).map(|i| format!("(/v{i})")).collect();
        let route = Route::new("narrow", format!("/base{pattern}")).unwrap();
        assert!(TrieMatcher::check(&route).is_ok());
    }

    #[test]
    fn test_unrooted_pattern_agrees_with_expression() {
        let route = Route::builder("flower", "flower/(id)")
            .requirement("id", r"\d+")
            .build()
            .unwrap();
        let m = matcher(vec![route.clone()]);
        let expected = route.match_path("/flower/5").unwrap();
        assert_eq!(find(&m, "/flower/5").unwrap().variables(), &expected);
        assert!(route.match_path("/flower/x").is_none());
        assert!(find(&m, "/flower/x").is_none());
    }

    #[test]
    fn test_requirement_is_enforced_per_segment() {
        let m = matcher(vec![
            Route::builder("numeric", "flower/:id")
                .requirement("id", r"\d+")
                .build()
                .unwrap(),
            Route::new("alias", "flower/:alias").unwrap(),
        ]);
        assert_eq!(find(&m, "/flower/25").unwrap().name(), "numeric");
        let matched = find(&m, "/flower/rose").unwrap();
        assert_eq!(matched.name(), "alias");
        assert_eq!(matched.get("alias"), Some(&Value::from("rose")));
    }

    #[test]
    fn test_composite_segment() {
        let m = matcher(vec![Route::builder("pair", "/flower/caesar/(id)-(alias)")
            .requirement("id", r"\d+")
            .build()
            .unwrap()]);
        let matched = find(&m, "/flower/caesar/25-othello").unwrap();
        assert_eq!(matched.get("id"), Some(&Value::from("25")));
        assert_eq!(matched.get("alias"), Some(&Value::from("othello")));
        assert!(find(&m, "/flower/caesar/x-othello").is_none());
    }

    #[test]
    fn test_wildcard_binds_rest() {
        let m = matcher(vec![Route::new("tags", "flower/*tags").unwrap()]);
        let matched = find(&m, "/flower/foo/bar/baz").unwrap();
        assert_eq!(matched.get("tags"), Some(&Value::from(vec!["foo", "bar", "baz"])));
        assert!(find(&m, "/flower").is_none());
    }

    #[test]
    fn test_optional_wildcard_may_be_absent() {
        let m = matcher(vec![Route::new("king", "king(/*tags)").unwrap()]);
        assert!(find(&m, "/king").unwrap().variables().is_empty());
        assert_eq!(
            find(&m, "/king/john/troilus").unwrap().get("tags"),
            Some(&Value::from(vec!["john", "troilus"]))
        );
    }

    #[test]
    fn test_wildcard_followed_by_segments() {
        let m = matcher(vec![Route::new("king", "/king/(*tags)/and/(alias)").unwrap()]);
        let matched = find(&m, "/king/john/troilus/and/cressida").unwrap();
        assert_eq!(matched.get("tags"), Some(&Value::from(vec!["john", "troilus"])));
        assert_eq!(matched.get("alias"), Some(&Value::from("cressida")));
    }

    #[test]
    fn test_context_failure_falls_through_to_other_shape() {
        let m = matcher(vec![
            Route::builder("create", "flower/new")
                .method("POST")
                .build()
                .unwrap(),
            Route::builder("show", "flower/:id")
                .method("GET")
                .build()
                .unwrap(),
        ]);
        let ctx = RequestContext::new();
        assert_eq!(
            m.match_route("/flower/new", Some("POST"), &ctx).unwrap().name(),
            "create"
        );
        assert_eq!(
            m.match_route("/flower/new", Some("GET"), &ctx).unwrap().name(),
            "show"
        );
        assert!(m.match_route("/flower/new", Some("DELETE"), &ctx).is_none());
    }

    #[test]
    fn test_root() {
        let m = matcher(vec![Route::new("home", "/").unwrap()]);
        assert!(find(&m, "/").is_some());
        assert!(find(&m, "").is_some());
        assert!(find(&m, "/flower").is_none());
    }

    #[test]
    fn test_rebuild_replaces_table() {
        let mut m = matcher(vec![Route::new("a", "a").unwrap()]);
        assert!(find(&m, "/a").is_some());

        m.set_routes(vec![Route::new("b", "b").unwrap()]).unwrap();
        assert!(find(&m, "/a").is_none());
        assert!(find(&m, "/b").is_some());
        assert_eq!(m.len(), 1);
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let err = TrieMatcher::with_routes(vec![
            Route::new("a", "a").unwrap(),
            Route::new("a", "b").unwrap(),
        ])
        .unwrap_err();
        assert_eq!(err, RoutingError::DuplicateRoute("a".into()));
    }

    #[test]
    fn test_wildcard_must_fill_segment() {
        let err = TrieMatcher::with_routes(vec![Route::new("files", "/files/(*path).txt").unwrap()])
            .unwrap_err();
        assert!(matches!(
            err,
            RoutingError::Pattern {
                source: PatternSyntaxError::WildcardSegment(_),
                ..
            }
        ));
    }

    #[test]
    fn test_failed_rebuild_keeps_previous_table() {
        let mut m = matcher(vec![Route::new("a", "a").unwrap()]);
        let result = m.set_routes(vec![
            Route::new("x", "x").unwrap(),
            Route::new("x", "y").unwrap(),
        ]);
        assert!(result.is_err());
        assert!(find(&m, "/a").is_some());
    }

    #[test]
    fn test_attempt_does_not_publish_count() {
        let m = matcher(vec![Route::new("a", "a/:b").unwrap()]);
        let attempt = m.attempt("/a/c", None, &RequestContext::new());
        assert_eq!(attempt.count, 3);
        assert!(attempt.result.is_some());
        assert_eq!(m.count(), 0);

        find(&m, "/a/c");
        assert_eq!(m.count(), 3);
    }
}
