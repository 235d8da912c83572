//! Trie matcher behavior over realistic route tables.

mod common;

use route_dispatch::routing::{PatternSyntaxError, RequestContext, Route, TrieMatcher, Value};

use common::{fixture_routes, request};

fn flower(pattern: &str) -> Route {
    Route::builder("flower", pattern)
        .variable("_controller", "FlowerController")
        .variable("id", "1")
        .methods(["GET", "PUT"])
        .host("windwalker.com")
        .scheme("http")
        .port(80)
        .ssl_port(443)
        .requirement("id", r"\d+")
        .build()
        .unwrap()
}

#[test]
fn test_match_rules() {
    let cases = [
        // Same route, different server params
        ("http://windwalker.com/flower/5", "flower/:id", "GET", true),
        ("https://windwalker.com/flower/5", "flower/:id", "GET", false),
        ("https://windwalker.com:137/flower/5", "flower/:id", "GET", false),
        ("http://windwalker.com/flower/5", "flower/:id", "POST", false),
        ("http://windwalker.com/flower/5", "flower/:id", "PUT", true),
        ("http://johnnywalker.com/flower/5", "flower/:id", "GET", false),
        // Different routes
        ("http://windwalker.com/", "/", "GET", true),
        ("http://windwalker.com/flower/5", "flower/:id/item/:alias", "GET", false),
        ("http://windwalker.com/flower/foo/bar/baz", "flower/*tags", "GET", true),
        ("http://windwalker.com/flower", "flower/*tags", "GET", false),
    ];

    let mut matcher = TrieMatcher::new();
    for (url, pattern, method, expected) in cases {
        let (path, context) = request(url);
        let result = matcher
            .set_routes([flower(pattern)])
            .unwrap()
            .match_route(&path, Some(method), &context);
        assert_eq!(result.is_some(), expected, "{method} {url} against {pattern}");
    }
}

#[test]
fn test_captured_values_override_defaults() {
    let matcher = TrieMatcher::with_routes([flower("flower/:id")]).unwrap();
    let (path, context) = request("http://windwalker.com/flower/5");
    let matched = matcher.match_route(&path, Some("get"), &context).unwrap();

    assert_eq!(matched.get("id"), Some(&Value::from("5")));
    assert_eq!(matched.get("_controller"), Some(&Value::from("FlowerController")));
}

#[test]
fn test_fixture_table() {
    let matcher = TrieMatcher::with_routes(fixture_routes()).unwrap();
    let ctx = RequestContext::new();

    let matched = matcher.match_route("/corge/quux/qux", None, &ctx).unwrap();
    assert_eq!(matched.name(), "corge/quux/:qux");
    assert_eq!(matched.get("_return"), Some(&Value::from("corge/quux/:qux")));
    assert_eq!(matched.get("qux"), Some(&Value::from("qux")));
    assert!(matcher.count() > 0);

    let cases = [
        ("/", ""),
        ("/foo", "foo"),
        ("/foo/bar/baz", "foo/bar/:baz"),
        ("/foo/qux/baz", "foo/:bar/baz"),
        ("/corge/quux", "corge/quux"),
        ("/corge/quux/qux/5", "corge/quux/qux/:id"),
        ("/corge/quux/qux/5/6", "corge/quux/:qux/:waldo"),
        ("/corge/x/garply", "corge/:grault/garply"),
        ("/corge/a/b/plugh", "corge/*fred/plugh"),
        ("/grault/a/b", "grault/*garply"),
        ("/thud", "thud(/xyzzy,plugh)"),
        ("/thud/x/y", "thud(/xyzzy,plugh)"),
    ];
    for (path, name) in cases {
        let matched = matcher
            .match_route(path, None, &ctx)
            .unwrap_or_else(|| panic!("no route for {path}"));
        assert_eq!(matched.name(), name, "{path}");
    }

    assert!(matcher.match_route("/corge/quux/qux/5/6/7", None, &ctx).is_none());
    assert!(matcher.match_route("/nothing", None, &ctx).is_none());
}

#[test]
fn test_wildcard_backtracks_to_trailing_literal() {
    let matcher = TrieMatcher::with_routes(fixture_routes()).unwrap();
    let matched = matcher
        .match_route("/corge/a/b/plugh", None, &RequestContext::new())
        .unwrap();
    assert_eq!(matched.get("fred"), Some(&Value::from(vec!["a", "b"])));
}

#[test]
fn test_optional_group_variables() {
    let matcher = TrieMatcher::with_routes(fixture_routes()).unwrap();
    let ctx = RequestContext::new();

    let short = matcher.match_route("/thud/x", None, &ctx).unwrap();
    assert_eq!(short.get("xyzzy"), Some(&Value::from("x")));
    assert_eq!(short.get("plugh"), None);

    let long = matcher.match_route("/thud/x/y", None, &ctx).unwrap();
    assert_eq!(long.get("plugh"), Some(&Value::from("y")));
}

#[test]
fn test_earlier_route_wins_tie() {
    let matcher = TrieMatcher::with_routes([
        Route::new("first", "a/:x").unwrap(),
        Route::new("second", "a/:y").unwrap(),
        Route::new("third", "a/(x)").unwrap(),
    ])
    .unwrap();
    let matched = matcher
        .match_route("/a/b", None, &RequestContext::new())
        .unwrap();
    assert_eq!(matched.name(), "first");
}

#[test]
fn test_shorter_route_registered_first_wins_over_longer_sibling() {
    let matcher = TrieMatcher::with_routes([
        Route::new("long", "a/:x/b").unwrap(),
        Route::new("short", "a/:y").unwrap(),
        Route::new("late", "a/:x").unwrap(),
    ])
    .unwrap();
    let ctx = RequestContext::new();

    let matched = matcher.match_route("/a/5", None, &ctx).unwrap();
    assert_eq!(matched.name(), "short");
    assert_eq!(matched.get("y"), Some(&Value::from("5")));
    assert_eq!(matcher.match_route("/a/5/b", None, &ctx).unwrap().name(), "long");
}

#[test]
fn test_unrooted_pattern_matches_like_compiled_expression() {
    let route = Route::builder("flower", "flower/(id)")
        .requirement("id", r"\d+")
        .build()
        .unwrap();
    let matcher = TrieMatcher::with_routes([route.clone()]).unwrap();
    let ctx = RequestContext::new();

    for path in ["/flower/5", "flower/5", "/flower/5/", "/flower/x", "/flower"] {
        let trie = matcher
            .match_route(path, None, &ctx)
            .map(|m| m.variables().clone());
        assert_eq!(trie, route.match_path(path), "{path}");
    }
}

#[test]
fn test_requirement_spanning_segments_rejected() {
    let route = Route::builder("files", "/files/(path)").requirement("path", ".+").build();
    assert!(matches!(
        route,
        Err(PatternSyntaxError::SeparatorInRequirement(name)) if name == "path"
    ));
}

#[test]
fn test_deterministic() {
    let matcher = TrieMatcher::with_routes(fixture_routes()).unwrap();
    let ctx = RequestContext::new();

    for path in ["/corge/quux/qux", "/foo/bar/baz", "/corge/a/b/plugh", "/nothing"] {
        let first = matcher.attempt(path, None, &ctx);
        let second = matcher.attempt(path, None, &ctx);
        assert_eq!(
            first.result.as_ref().map(|m| m.name().to_string()),
            second.result.as_ref().map(|m| m.name().to_string())
        );
        assert_eq!(
            first.result.map(|m| m.variables().clone()),
            second.result.map(|m| m.variables().clone())
        );
        assert_eq!(first.count, second.count);
    }
}

#[test]
fn test_count_tracks_latest_call() {
    let matcher = TrieMatcher::with_routes(fixture_routes()).unwrap();
    let ctx = RequestContext::new();

    let expected = matcher.attempt("/corge/quux/qux", None, &ctx).count;
    matcher.match_route("/corge/quux/qux", None, &ctx);
    assert_eq!(matcher.count(), expected);

    matcher.match_route("/", None, &ctx);
    assert_eq!(matcher.count(), 1);
}

#[test]
fn test_empty_table_misses() {
    let matcher = TrieMatcher::new();
    assert!(matcher.is_empty());
    assert!(matcher.match_route("/", None, &RequestContext::new()).is_none());
}
