//! Variable extraction from expression captures.

use std::collections::BTreeMap;

use regex::Captures;
use serde::{Deserialize, Serialize};

use crate::routing::compiler::{CaptureKind, CompiledExpression};

/// A bound route variable.
///
/// Values stay textual; numeric interpretation is left to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Scalar(String),
    /// Path segments bound by a wildcard, in path order.
    List(Vec<String>),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Scalar(text) => Some(text),
            Value::List(_) => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Value::Scalar(_) => None,
            Value::List(items) => Some(items),
        }
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Value::Scalar(text.to_string())
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Value::Scalar(text)
    }
}

impl From<Vec<String>> for Value {
    fn from(items: Vec<String>) -> Self {
        Value::List(items)
    }
}

impl From<Vec<&str>> for Value {
    fn from(items: Vec<&str>) -> Self {
        Value::List(items.into_iter().map(str::to_string).collect())
    }
}

/// Variable name to bound value, ordered by name.
pub type Variables = BTreeMap<String, Value>;

/// Non-empty segments of a path, left to right.
pub fn path_segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|segment| !segment.is_empty())
}

/// Rebuild a path from its segments: rooted at `/`, no empty or trailing segments.
pub fn normalize_path(path: &str) -> String {
    let mut out = String::with_capacity(path.len() + 1);
    for segment in path_segments(path) {
        out.push('/');
        out.push_str(segment);
    }
    if out.is_empty() {
        out.push('/');
    }
    out
}

/// Turn the captures of a successful match into variables.
///
/// Absent and empty captures are skipped, so an optional group that did not
/// participate leaves no trace in the result.
pub fn extract(captures: &Captures<'_>, expression: &CompiledExpression) -> Variables {
    let mut vars = Variables::new();
    for capture in expression.captures() {
        let Some(text) = captures.name(&capture.name).map(|m| m.as_str()) else {
            continue;
        };
        if text.is_empty() {
            continue;
        }

        let value = match capture.kind {
            CaptureKind::Scalar => Value::Scalar(text.to_string()),
            CaptureKind::Wildcard => Value::List(path_segments(text).map(str::to_string).collect()),
        };
        vars.insert(capture.name.clone(), value);
    }
    vars
}
