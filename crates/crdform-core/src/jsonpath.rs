//! JSONPath subset for wait conditions
//!
//! Supports the kubectl-style expressions used to wait on object status:
//!
//! - optional `{...}` wrapper and `$` root: `{.status.phase}`, `$.status.phase`
//! - field access: `.status`, `['status']`
//! - list index: `.status.conditions[0]`
//! - equality filter, first match: `.status.conditions[?(@.type=="Ready")].status`

use serde_json::Value;

use crate::error::{CoreError, Result};

#[derive(Debug, Clone, PartialEq)]
enum Segment {
    Field(String),
    Index(usize),
    Filter { key: Vec<String>, value: String },
}

/// A parsed JSONPath expression
#[derive(Debug, Clone, PartialEq)]
pub struct JsonPath {
    segments: Vec<Segment>,
}

impl JsonPath {
    pub fn parse(expression: &str) -> Result<Self> {
        let err = |message: &str| CoreError::InvalidJsonPath {
            expression: expression.to_string(),
            message: message.to_string(),
        };

        let mut body = expression.trim();
        if let Some(inner) = body.strip_prefix('{') {
            body = inner.strip_suffix('}').ok_or_else(|| err("unbalanced braces"))?;
        }
        let body = body.strip_prefix('$').unwrap_or(body);
        if body.is_empty() {
            return Err(err("expression is empty"));
        }

        let chars: Vec<char> = body.chars().collect();
        let mut segments = Vec::new();
        let mut i = 0;

        while i < chars.len() {
            match chars[i] {
                '.' => {
                    let (field, next) = read_identifier(&chars, i + 1);
                    if field.is_empty() {
                        return Err(err("empty field name"));
                    }
                    segments.push(Segment::Field(field));
                    i = next;
                }
                '[' => {
                    let close = find_closing_bracket(&chars, i).ok_or_else(|| err("unclosed '['"))?;
                    let inner: String = chars[i + 1..close].iter().collect();
                    segments.push(parse_bracket(inner.trim()).map_err(|m| err(&m))?);
                    i = close + 1;
                }
                _ if i == 0 => {
                    // kubectl requires the leading dot; accept `status.phase` too
                    let (field, next) = read_identifier(&chars, 0);
                    if field.is_empty() {
                        return Err(err("unexpected character"));
                    }
                    segments.push(Segment::Field(field));
                    i = next;
                }
                c => return Err(err(&format!("unexpected character '{}'", c))),
            }
        }

        Ok(Self { segments })
    }

    /// Resolve the expression against a document
    pub fn find<'a>(&self, root: &'a Value) -> Option<&'a Value> {
        let mut current = root;
        for segment in &self.segments {
            current = match segment {
                Segment::Field(name) => current.get(name)?,
                Segment::Index(index) => current.get(*index)?,
                Segment::Filter { key, value } => current
                    .as_array()?
                    .iter()
                    .find(|item| lookup(item, key).map(render) == Some(value.clone()))?,
            };
        }
        Some(current)
    }

    /// Whether the expression resolves to a value rendering as `expected`
    pub fn matches(&self, root: &Value, expected: &str) -> bool {
        self.find(root).map(render).as_deref() == Some(expected)
    }
}

fn lookup<'a>(value: &'a Value, key: &[String]) -> Option<&'a Value> {
    key.iter().try_fold(value, |v, k| v.get(k))
}

/// Strings render without quotes, everything else as compact JSON
pub fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn read_identifier(chars: &[char], start: usize) -> (String, usize) {
    let mut end = start;
    while end < chars.len() && chars[end] != '.' && chars[end] != '[' {
        end += 1;
    }
    (chars[start..end].iter().collect(), end)
}

fn find_closing_bracket(chars: &[char], open: usize) -> Option<usize> {
    let mut quote: Option<char> = None;
    for (offset, &c) in chars[open + 1..].iter().enumerate() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"') => quote = Some(c),
            (None, ']') => return Some(open + 1 + offset),
            (None, _) => {}
        }
    }
    None
}

fn unquote(s: &str) -> Option<&str> {
    s.strip_prefix('\'')
        .and_then(|rest| rest.strip_suffix('\''))
        .or_else(|| s.strip_prefix('"').and_then(|rest| rest.strip_suffix('"')))
}

fn parse_bracket(inner: &str) -> std::result::Result<Segment, String> {
    if let Some(field) = unquote(inner) {
        return Ok(Segment::Field(field.to_string()));
    }

    if let Some(filter) = inner.strip_prefix('?') {
        let filter = filter
            .trim()
            .strip_prefix('(')
            .and_then(|f| f.strip_suffix(')'))
            .ok_or("filter must be wrapped in parentheses")?;
        let (left, right) = filter
            .split_once("==")
            .ok_or("only '==' filters are supported")?;
        let key = left
            .trim()
            .strip_prefix("@.")
            .ok_or("filter must start with '@.'")?;
        let right = right.trim();
        let value = unquote(right).unwrap_or(right).to_string();
        return Ok(Segment::Filter {
            key: key.split('.').map(str::to_string).collect(),
            value,
        });
    }

    inner
        .parse::<usize>()
        .map(Segment::Index)
        .map_err(|_| format!("unsupported subscript '{}'", inner))
}
