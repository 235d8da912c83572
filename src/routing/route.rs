//! The route entity.

use crate::routing::compiler::{compile_pattern, CompiledExpression, Requirements};
use crate::routing::extractor::{Value, Variables};
use crate::routing::pattern::{Pattern, PatternSyntaxError};

/// One routable endpoint.
///
/// Immutable once built. The pattern is parsed and compiled in `build`, so
/// a malformed route fails at registration rather than at match time.
#[derive(Debug, Clone)]
pub struct Route {
    name: String,
    pattern: Pattern,
    expression: CompiledExpression,
    variables: Variables,
    methods: Vec<String>,
    host: Option<String>,
    scheme: Option<String>,
    port: Option<u16>,
    ssl_port: Option<u16>,
    requirements: Requirements,
    extra: serde_json::Value,
}

impl Route {
    /// Start building a route.
    pub fn builder(name: impl Into<String>, pattern: impl Into<String>) -> RouteBuilder {
        RouteBuilder {
            name: name.into(),
            pattern: pattern.into(),
            variables: Variables::new(),
            methods: Vec::new(),
            host: None,
            scheme: None,
            port: None,
            ssl_port: None,
            requirements: Requirements::new(),
            extra: serde_json::Value::Null,
        }
    }

    /// A route with no defaults or constraints.
    pub fn new(
        name: impl Into<String>,
        pattern: impl Into<String>,
    ) -> Result<Self, PatternSyntaxError> {
        Self::builder(name, pattern).build()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    pub fn expression(&self) -> &CompiledExpression {
        &self.expression
    }

    /// Default variable values.
    pub fn variables(&self) -> &Variables {
        &self.variables
    }

    /// Allowed methods, upper-cased. Empty means any method.
    pub fn methods(&self) -> &[String] {
        &self.methods
    }

    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    pub fn scheme(&self) -> Option<&str> {
        self.scheme.as_deref()
    }

    pub fn port(&self) -> Option<u16> {
        self.port
    }

    pub fn ssl_port(&self) -> Option<u16> {
        self.ssl_port
    }

    pub fn requirements(&self) -> &Requirements {
        &self.requirements
    }

    pub fn extra(&self) -> &serde_json::Value {
        &self.extra
    }

    pub fn allows_method(&self, method: &str) -> bool {
        self.methods.is_empty() || self.methods.iter().any(|m| m.eq_ignore_ascii_case(method))
    }

    /// Match a full path against the compiled expression, merging defaults.
    pub fn match_path(&self, path: &str) -> Option<Variables> {
        let captured = self.expression.match_path(path)?;
        let mut vars = self.variables.clone();
        vars.extend(captured);
        Some(vars)
    }
}

/// Builder for [`Route`].
#[derive(Debug, Clone)]
pub struct RouteBuilder {
    name: String,
    pattern: String,
    variables: Variables,
    methods: Vec<String>,
    host: Option<String>,
    scheme: Option<String>,
    port: Option<u16>,
    ssl_port: Option<u16>,
    requirements: Requirements,
    extra: serde_json::Value,
}

impl RouteBuilder {
    pub fn variable(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.variables.insert(name.into(), value.into());
        self
    }

    pub fn variables(mut self, variables: impl IntoIterator<Item = (String, Value)>) -> Self {
        self.variables.extend(variables);
        self
    }

    pub fn method(mut self, method: impl AsRef<str>) -> Self {
        let method = method.as_ref().to_ascii_uppercase();
        if !self.methods.contains(&method) {
            self.methods.push(method);
        }
        self
    }

    pub fn methods<I, S>(self, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        methods.into_iter().fold(self, |builder, m| builder.method(m))
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = Some(scheme.into());
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn ssl_port(mut self, port: u16) -> Self {
        self.ssl_port = Some(port);
        self
    }

    pub fn requirement(mut self, name: impl Into<String>, expression: impl Into<String>) -> Self {
        self.requirements.insert(name.into(), expression.into());
        self
    }

    pub fn extra(mut self, extra: serde_json::Value) -> Self {
        self.extra = extra;
        self
    }

    /// Parse and compile the pattern.
    pub fn build(self) -> Result<Route, PatternSyntaxError> {
        let pattern = Pattern::parse(&self.pattern)?;
        let expression = compile_pattern(&pattern, &self.requirements)?;

        Ok(Route {
            name: self.name,
            pattern,
            expression,
            variables: self.variables,
            methods: self.methods,
            host: self.host,
            scheme: self.scheme,
            port: self.port,
            ssl_port: self.ssl_port,
            requirements: self.requirements,
            extra: self.extra,
        })
    }
}
