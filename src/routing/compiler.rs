//! Pattern compilation into an anchored matching expression.
//!
//! ```text
//! /flower/caesar(/id,alias)  + { id: \d+ }
//!     → ^/flower/caesar(?:/(?P<id>\d+)(?:/(?P<alias>[^/]+))?)?$
//! ```
//!
//! Compilation is pure: the same pattern and requirements always produce
//! the same expression, so routes compile once at registration.
//!
//! Expressions are rooted at `/` with no trailing separator, and paths are
//! normalised the same way before matching, so `flower/(id)` and
//! `/flower/(id)/` accept exactly the paths the trie accepts.

use std::collections::BTreeMap;
use std::iter::Peekable;
use std::str::Chars;

use regex::Regex;
use serde::Serialize;

use crate::routing::extractor::{extract, normalize_path, Variables};
use crate::routing::pattern::{Pattern, PatternSyntaxError, Token};

/// Sub-expression used for a variable without a requirement.
pub const DEFAULT_VARIABLE_EXPRESSION: &str = "[^/]+";

/// Sub-expression used for wildcard variables.
pub const WILDCARD_EXPRESSION: &str = ".*";

/// Per-variable constraint overrides, keyed by variable name.
pub type Requirements = BTreeMap<String, String>;

/// How a captured value is turned into a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureKind {
    Scalar,
    Wildcard,
}

/// A named capture declared by the pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Capture {
    pub name: String,
    pub kind: CaptureKind,
}

/// The compiled form of a route pattern.
#[derive(Debug, Clone)]
pub struct CompiledExpression {
    regex: Regex,
    captures: Vec<Capture>,
}

impl CompiledExpression {
    /// The expression source, anchors included.
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    /// Declared captures in pattern order.
    pub fn captures(&self) -> &[Capture] {
        &self.captures
    }

    pub fn kind_of(&self, name: &str) -> Option<CaptureKind> {
        self.captures
            .iter()
            .find(|capture| capture.name == name)
            .map(|capture| capture.kind)
    }

    /// Match a full path and extract its variables.
    pub fn match_path(&self, path: &str) -> Option<Variables> {
        let path = normalize_path(path);
        let captures = self.regex.captures(&path)?;
        Some(extract(&captures, self))
    }
}

/// Compile a raw pattern string.
pub fn compile(
    pattern: &str,
    requirements: &Requirements,
) -> Result<CompiledExpression, PatternSyntaxError> {
    compile_pattern(&Pattern::parse(pattern)?, requirements)
}

/// Compile an already parsed pattern.
pub fn compile_pattern(
    pattern: &Pattern,
    requirements: &Requirements,
) -> Result<CompiledExpression, PatternSyntaxError> {
    let tokens = rooted(pattern.tokens());
    let mut source = String::from("^");
    if matches!(tokens.first(), Some(Token::Optional(_))) {
        source.push_str("/?");
    }
    let mut captures = Vec::new();
    emit(&tokens, requirements, &mut source, &mut captures)?;
    source.push('$');

    let regex = Regex::new(&source).map_err(|e| PatternSyntaxError::Expression(e.to_string()))?;
    Ok(CompiledExpression { regex, captures })
}

/// Anchor the tokens at `/` and drop any trailing separator.
///
/// A leading optional group keeps its own separator; the caller lets the
/// root `/` stand alone in that case.
fn rooted(tokens: &[Token]) -> Vec<Token> {
    let mut out = tokens.to_vec();
    match out.first_mut() {
        Some(Token::Literal(text)) if text.starts_with('/') => {}
        Some(Token::Literal(text)) => text.insert(0, '/'),
        Some(Token::Optional(_)) => {}
        _ => out.insert(0, Token::Literal("/".to_string())),
    }

    let only = out.len() == 1;
    if let Some(Token::Literal(text)) = out.last_mut() {
        let keep = text.trim_end_matches('/').len().max(usize::from(only));
        text.truncate(keep);
    }
    out
}

fn emit(
    tokens: &[Token],
    requirements: &Requirements,
    out: &mut String,
    captures: &mut Vec<Capture>,
) -> Result<(), PatternSyntaxError> {
    for token in tokens {
        match token {
            Token::Literal(text) => out.push_str(&regex::escape(text)),
            Token::Variable(name) => {
                let expression = requirement_for(name, requirements)?;
                out.push_str(&named_group(name, expression));
                captures.push(Capture {
                    name: name.clone(),
                    kind: CaptureKind::Scalar,
                });
            }
            Token::Wildcard(name) => {
                out.push_str(&named_group(name, WILDCARD_EXPRESSION));
                captures.push(Capture {
                    name: name.clone(),
                    kind: CaptureKind::Wildcard,
                });
            }
            Token::Optional(inner) => {
                out.push_str("(?:");
                emit(inner, requirements, out, captures)?;
                out.push_str(")?");
            }
        }
    }
    Ok(())
}

pub(crate) fn named_group(name: &str, expression: &str) -> String {
    format!("(?P<{name}>{expression})")
}

/// The sub-expression for `name`, validating a custom requirement on the way.
pub(crate) fn requirement_for<'a>(
    name: &str,
    requirements: &'a Requirements,
) -> Result<&'a str, PatternSyntaxError> {
    let Some(expression) = requirements.get(name) else {
        return Ok(DEFAULT_VARIABLE_EXPRESSION);
    };

    Regex::new(&format!("^(?:{expression})$")).map_err(|e| {
        PatternSyntaxError::InvalidRequirement {
            name: name.to_string(),
            reason: e.to_string(),
        }
    })?;
    if may_match_separator(expression) {
        return Err(PatternSyntaxError::SeparatorInRequirement(name.to_string()));
    }
    Ok(expression)
}

/// Whether an expression might match text containing `/`.
///
/// Conservative: anything that could stand for `/` counts, so a few harmless
/// expressions (`\p{Common}`, `[[:ascii:]]`) are refused with the offenders.
fn may_match_separator(expression: &str) -> bool {
    let mut chars = expression.chars().peekable();
    while let Some(c) = chars.next() {
        let hit = match c {
            '/' | '.' => true,
            '\\' => match read_escape(&mut chars) {
                Escape::Literal(c) => c == '/',
                Escape::Class { certain, maybe } => certain || maybe,
            },
            '[' => class_may_match_separator(&mut chars),
            _ => false,
        };
        if hit {
            return true;
        }
    }
    false
}

enum Escape {
    Literal(char),
    /// `certain`: the class surely holds `/`; `maybe`: it might.
    Class { certain: bool, maybe: bool },
}

const UNKNOWN: Escape = Escape::Class {
    certain: false,
    maybe: true,
};

fn read_escape(chars: &mut Peekable<Chars<'_>>) -> Escape {
    match chars.next() {
        Some('d' | 'w' | 's' | 'b' | 'B' | 'A' | 'z') => Escape::Class {
            certain: false,
            maybe: false,
        },
        Some('D' | 'W' | 'S') => Escape::Class {
            certain: true,
            maybe: false,
        },
        Some('p') => {
            let name = read_braced(chars);
            if matches!(name.chars().next(), Some('L' | 'N')) {
                Escape::Class {
                    certain: false,
                    maybe: false,
                }
            } else {
                UNKNOWN
            }
        }
        Some('P') => {
            read_braced(chars);
            UNKNOWN
        }
        Some(c @ ('x' | 'u' | 'U')) => {
            let width = match c {
                'x' => 2,
                'u' => 4,
                _ => 8,
            };
            let digits: String = if chars.next_if_eq(&'{').is_some() {
                chars.by_ref().take_while(|&c| c != '}').collect()
            } else {
                (0..width).map_while(|_| chars.next()).collect()
            };
            u32::from_str_radix(&digits, 16)
                .ok()
                .and_then(char::from_u32)
                .map_or(UNKNOWN, Escape::Literal)
        }
        Some(c) => Escape::Literal(c),
        None => UNKNOWN,
    }
}

fn read_braced(chars: &mut Peekable<Chars<'_>>) -> String {
    if chars.next_if_eq(&'{').is_some() {
        chars.by_ref().take_while(|&c| c != '}').collect()
    } else {
        chars.next().map(String::from).unwrap_or_default()
    }
}

/// Scan a bracket class whose `[` is already consumed.
fn class_may_match_separator(chars: &mut Peekable<Chars<'_>>) -> bool {
    let negated = chars.next_if_eq(&'^').is_some();
    let mut certain = false;
    let mut maybe = false;
    let mut prev: Option<char> = None;
    let mut first = true;

    loop {
        let Some(c) = chars.next() else {
            return true;
        };
        match c {
            ']' if !first => break,
            // Nested classes, ASCII classes and set operations are not worth modelling.
            '[' => return true,
            '&' | '~' if chars.peek() == Some(&c) => return true,
            '-' if chars.peek() == Some(&'-') => return true,
            '-' if prev.is_some() && chars.peek().is_some_and(|&n| n != ']') => {
                let low = prev.take().unwrap_or('-');
                let high = match chars.next() {
                    Some('\\') => match read_escape(chars) {
                        Escape::Literal(c) => c,
                        Escape::Class { .. } => return true,
                    },
                    Some(c) => c,
                    None => return true,
                };
                certain |= low <= '/' && '/' <= high;
            }
            '\\' => match read_escape(chars) {
                Escape::Literal(c) => {
                    certain |= c == '/';
                    prev = Some(c);
                }
                Escape::Class {
                    certain: sure,
                    maybe: unsure,
                } => {
                    certain |= sure;
                    maybe |= unsure;
                    prev = None;
                }
            },
            c => {
                certain |= c == '/';
                prev = Some(c);
            }
        }
        first = false;
    }

    if negated {
        !certain
    } else {
        certain || maybe
    }
}
