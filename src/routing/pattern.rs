//! Route pattern parsing.
//!
//! # Grammar
//! ```text
//! flower/(id)              required variable
//! flower/(*tags)           wildcard variable (rest of the path)
//! flower/caesar(/id,alias) optional group, nested per name
//! flower/:id, flower/*tags segment shorthand
//! ```
//!
//! The parsed token tree is shared by the expression compiler and the trie
//! builder, so both always agree on what a pattern means.

use std::collections::HashSet;

use thiserror::Error;

/// Errors raised while parsing or compiling a route pattern.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternSyntaxError {
    /// A `(` without its closing `)`.
    #[error("unclosed group opened at byte {0}")]
    UnclosedGroup(usize),

    /// A `)` with no group open.
    #[error("unexpected ')' at byte {0}")]
    UnexpectedClose(usize),

    /// Groups cannot contain other groups; nesting comes from name lists.
    #[error("nested '(' at byte {0}")]
    NestedGroup(usize),

    #[error("empty variable name in group at byte {0}")]
    EmptyName(usize),

    #[error("invalid variable name '{0}'")]
    InvalidName(String),

    #[error("variable '{0}' declared more than once")]
    DuplicateVariable(String),

    #[error("wildcard '{0}' must be the last name of its group")]
    WildcardNotLast(String),

    #[error("variable list '{0}' needs a leading separator")]
    MissingSeparator(String),

    #[error("invalid requirement for '{name}': {reason}")]
    InvalidRequirement { name: String, reason: String },

    #[error("wildcard '{0}' must occupy a whole path segment")]
    WildcardSegment(String),

    /// Variables bind a single segment, so their requirement must not span `/`.
    #[error("requirement for '{0}' may match '/'")]
    SeparatorInRequirement(String),

    #[error("pattern expands to more than {0} shapes")]
    TooManyShapes(usize),

    #[error("failed to build expression: {0}")]
    Expression(String),
}

/// One element of a parsed pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Text matched verbatim, separators included.
    Literal(String),
    /// A single required variable.
    Variable(String),
    /// A variable binding the remainder of the path.
    Wildcard(String),
    /// Zero-or-one group; inner groups only apply once this one is present.
    Optional(Vec<Token>),
}

/// A parsed route pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    raw: String,
    tokens: Vec<Token>,
}

impl Pattern {
    /// Parse a raw pattern string.
    pub fn parse(raw: &str) -> Result<Self, PatternSyntaxError> {
        let mut parser = Parser {
            raw,
            tokens: Vec::new(),
            literal: String::new(),
            seen: HashSet::new(),
        };
        parser.run()?;

        Ok(Self {
            raw: raw.to_string(),
            tokens: parser.tokens,
        })
    }

    /// The pattern as written.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Declared variables in order of appearance, flagged `true` for wildcards.
    pub fn variables(&self) -> Vec<(&str, bool)> {
        let mut out = Vec::new();
        collect_variables(&self.tokens, &mut out);
        out
    }
}

fn collect_variables<'a>(tokens: &'a [Token], out: &mut Vec<(&'a str, bool)>) {
    for token in tokens {
        match token {
            Token::Literal(_) => {}
            Token::Variable(name) => out.push((name, false)),
            Token::Wildcard(name) => out.push((name, true)),
            Token::Optional(inner) => collect_variables(inner, out),
        }
    }
}

pub(crate) fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn is_name_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn validate_name(name: &str) -> Result<(), PatternSyntaxError> {
    let valid = name.chars().next().is_some_and(is_name_start) && name.chars().all(is_name_char);
    if valid {
        Ok(())
    } else {
        Err(PatternSyntaxError::InvalidName(name.to_string()))
    }
}

struct Parser<'a> {
    raw: &'a str,
    tokens: Vec<Token>,
    literal: String,
    seen: HashSet<String>,
}

impl Parser<'_> {
    fn run(&mut self) -> Result<(), PatternSyntaxError> {
        let raw = self.raw;
        let mut pos = 0;
        let mut segment_start = true;

        while let Some(c) = raw[pos..].chars().next() {
            match c {
                '(' => {
                    let body_start = pos + 1;
                    let offset = raw[body_start..]
                        .find(|ch: char| ch == '(' || ch == ')')
                        .ok_or(PatternSyntaxError::UnclosedGroup(pos))?;
                    let close = body_start + offset;
                    if raw[close..].starts_with('(') {
                        return Err(PatternSyntaxError::NestedGroup(close));
                    }

                    self.flush_literal();
                    let group = self.parse_group(&raw[body_start..close], pos)?;
                    self.tokens.push(group);
                    pos = close + 1;
                    segment_start = false;
                }
                ')' => return Err(PatternSyntaxError::UnexpectedClose(pos)),
                ':' | '*' if segment_start && raw[pos + 1..].starts_with(is_name_start) => {
                    let name_start = pos + 1;
                    let name_end = raw[name_start..]
                        .find(|ch: char| !is_name_char(ch))
                        .map_or(raw.len(), |i| name_start + i);
                    let name = &raw[name_start..name_end];
                    self.register(name)?;

                    self.flush_literal();
                    self.tokens.push(if c == '*' {
                        Token::Wildcard(name.to_string())
                    } else {
                        Token::Variable(name.to_string())
                    });
                    pos = name_end;
                    segment_start = false;
                }
                _ => {
                    self.literal.push(c);
                    pos += c.len_utf8();
                    segment_start = c == '/';
                }
            }
        }

        self.flush_literal();
        Ok(())
    }

    fn flush_literal(&mut self) {
        if !self.literal.is_empty() {
            self.tokens.push(Token::Literal(std::mem::take(&mut self.literal)));
        }
    }

    fn register(&mut self, name: &str) -> Result<(), PatternSyntaxError> {
        validate_name(name)?;
        if !self.seen.insert(name.to_string()) {
            return Err(PatternSyntaxError::DuplicateVariable(name.to_string()));
        }
        Ok(())
    }

    /// Parse the inside of `( ... )`: an optional separator run, then names.
    fn parse_group(&mut self, body: &str, pos: usize) -> Result<Token, PatternSyntaxError> {
        let split = body
            .find(|c: char| is_name_char(c) || c == '*' || c == ',')
            .unwrap_or(body.len());
        let (separator, list) = body.split_at(split);
        if list.is_empty() {
            return Err(PatternSyntaxError::EmptyName(pos));
        }

        let names: Vec<&str> = list.split(',').collect();
        let mut vars = Vec::with_capacity(names.len());
        for (i, entry) in names.iter().enumerate() {
            let (wildcard, name) = match entry.strip_prefix('*') {
                Some(name) => (true, name),
                None => (false, *entry),
            };
            if name.is_empty() {
                return Err(PatternSyntaxError::EmptyName(pos));
            }
            self.register(name)?;
            if wildcard && i + 1 != names.len() {
                return Err(PatternSyntaxError::WildcardNotLast(name.to_string()));
            }
            vars.push(if wildcard {
                Token::Wildcard(name.to_string())
            } else {
                Token::Variable(name.to_string())
            });
        }

        if separator.is_empty() {
            if vars.len() > 1 {
                return Err(PatternSyntaxError::MissingSeparator(body.to_string()));
            }
            return vars.pop().ok_or(PatternSyntaxError::EmptyName(pos));
        }

        // `(/a,b,c)` becomes `(/a(/b(/c)?)?)?`, built from the innermost out.
        let mut nested: Option<Token> = None;
        for var in vars.into_iter().rev() {
            let mut group = vec![Token::Literal(separator.to_string()), var];
            if let Some(inner) = nested.take() {
                group.push(inner);
            }
            nested = Some(Token::Optional(group));
        }
        nested.ok_or(PatternSyntaxError::EmptyName(pos))
    }
}
