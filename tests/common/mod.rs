//! Shared fixtures for integration tests.

use route_dispatch::{RequestContext, Route};
use url::Url;

/// A route table of mostly overlapping shapes.
#[allow(dead_code)]
pub const FIXTURE_PATTERNS: &[&str] = &[
    "/",
    "foo",
    "foo/:bar",
    "foo/:bar/baz",
    "foo/bar/:baz",
    "grault/*garply",
    "corge",
    "corge/:grault",
    "corge/:grault/garply",
    "corge/quux",
    "corge/quux/qux/:id",
    "corge/quux/:qux",
    "corge/quux/:qux/:waldo",
    "corge/*fred/plugh",
    "thud(/xyzzy,plugh)",
];

/// One route per fixture line, named after its own pattern, carrying it back in `_return`.
#[allow(dead_code)]
pub fn fixture_routes() -> Vec<Route> {
    FIXTURE_PATTERNS
        .iter()
        .map(|line| {
            let pattern = line.trim().trim_matches('/');
            Route::builder(pattern, pattern)
                .variable("_return", pattern)
                .build()
                .expect("fixture pattern compiles")
        })
        .collect()
}

/// Split a URL into a path and context, defaulting the port to 80 when absent.
#[allow(dead_code)]
pub fn request(url: &str) -> (String, RequestContext) {
    let url = Url::parse(url).expect("fixture url parses");
    let mut context = RequestContext::new()
        .with_scheme(url.scheme())
        .with_port(url.port().unwrap_or(80));
    if let Some(host) = url.host_str() {
        context = context.with_host(host);
    }
    (url.path().to_string(), context)
}
