//! Parsing of schema and parameter list text.
//!
//! Admin commands describe columns and parameters as text such as
//! `(Timestamp:datetime, ['Event Name']:string)` or
//! `(T:(*), limit:long = 10)`. These helpers split that text at top-level
//! separators, ignoring separators nested in brackets or quotes.

use super::symbol::{ColumnSymbol, ParameterKind, ParameterSymbol};
use super::types::ScalarType;

/// Error raised for schema text that cannot be parsed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("invalid schema text `{text}`: {message}")]
pub struct SchemaTextError {
    pub text: String,
    pub message: String,
}

impl SchemaTextError {
    fn new(text: &str, message: impl Into<String>) -> Self {
        Self {
            text: text.to_string(),
            message: message.into(),
        }
    }
}

/// Split `text` at every `separator` that is not nested or quoted.
///
/// Pieces are trimmed; empty pieces are dropped.
pub fn split_top_level(text: &str, separator: char) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut start = 0;

    for (i, c) in text.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }

        match c {
            '\'' | '"' => quote = Some(c),
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth = depth.saturating_sub(1),
            _ if c == separator && depth == 0 => {
                pieces.push(text[start..i].trim());
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    pieces.push(text[start..].trim());

    pieces.into_iter().filter(|p| !p.is_empty()).collect()
}

/// Remove one pair of enclosing delimiters if they wrap the whole text.
pub fn strip_enclosing(text: &str, open: char, close: char) -> &str {
    let trimmed = text.trim();
    if trimmed.starts_with(open)
        && trimmed.ends_with(close)
        && closing_index(trimmed, open, close) == Some(trimmed.len() - close.len_utf8())
    {
        trimmed[open.len_utf8()..trimmed.len() - close.len_utf8()].trim()
    } else {
        trimmed
    }
}

/// Index of the delimiter closing the one at position 0.
fn closing_index(text: &str, open: char, close: char) -> Option<usize> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    for (i, c) in text.char_indices() {
        if let Some(q) = quote {
            if c == q {
                quote = None;
            }
            continue;
        }
        if c == '\'' || c == '"' {
            quote = Some(c);
        } else if c == open {
            depth += 1;
        } else if c == close {
            depth = depth.saturating_sub(1);
            if depth == 0 {
                return Some(i);
            }
        }
    }
    None
}

/// Wrap schema text in parentheses unless it already is.
pub fn parenthesize(schema: &str) -> String {
    let trimmed = schema.trim();
    if strip_enclosing(trimmed, '(', ')').len() != trimmed.len() {
        trimmed.to_string()
    } else {
        format!("({})", trimmed)
    }
}

/// Unescape a possibly bracket-quoted name: `['a b']`, `["a b"]`, `[a]`.
pub fn unquote_name(name: &str) -> String {
    let inner = strip_enclosing(name, '[', ']');
    if inner.len() == name.trim().len() {
        return inner.to_string();
    }
    let inner = inner.trim();
    for q in ['\'', '"'] {
        if inner.len() >= 2 && inner.starts_with(q) && inner.ends_with(q) {
            return inner[1..inner.len() - 1].to_string();
        }
    }
    inner.to_string()
}

/// Parse `(name:type, ...)` into columns.
pub fn parse_columns(text: &str) -> Result<Vec<ColumnSymbol>, SchemaTextError> {
    let body = strip_enclosing(text, '(', ')');

    split_top_level(body, ',')
        .into_iter()
        .map(|item| {
            let parts = split_top_level(item, ':');
            match parts.as_slice() {
                [name, column_type] => Ok(ColumnSymbol::new(
                    unquote_name(name),
                    ScalarType::resolve(column_type),
                )),
                _ => Err(SchemaTextError::new(text, format!("expected name:type in `{}`", item))),
            }
        })
        .collect()
}

/// Parse a function parameter list such as `(T:(*), x:long, y:string = "a")`.
pub fn parse_parameters(text: &str) -> Result<Vec<ParameterSymbol>, SchemaTextError> {
    let body = strip_enclosing(text, '(', ')');

    split_top_level(body, ',')
        .into_iter()
        .map(|item| {
            let (declaration, default_value) = match split_top_level(item, '=').as_slice() {
                [declaration] => (*declaration, None),
                [declaration, default] => (*declaration, Some(default.to_string())),
                _ => {
                    return Err(SchemaTextError::new(
                        text,
                        format!("unexpected `=` in `{}`", item),
                    ))
                }
            };

            let parts = split_top_level(declaration, ':');
            let [name, type_text] = parts.as_slice() else {
                return Err(SchemaTextError::new(
                    text,
                    format!("expected name:type in `{}`", item),
                ));
            };

            Ok(ParameterSymbol {
                name: unquote_name(name),
                kind: parse_parameter_kind(type_text, text)?,
                default_value,
            })
        })
        .collect()
}

fn parse_parameter_kind(type_text: &str, text: &str) -> Result<ParameterKind, SchemaTextError> {
    let type_text = type_text.trim();
    if !type_text.starts_with('(') {
        return Ok(ParameterKind::Scalar {
            scalar_type: ScalarType::resolve(type_text),
        });
    }

    let inner = strip_enclosing(type_text, '(', ')');
    let mut open = false;
    let mut columns = Vec::new();
    for item in split_top_level(inner, ',') {
        if item == "*" {
            open = true;
        } else {
            columns.extend(parse_columns(item).map_err(|e| SchemaTextError::new(text, e.message))?);
        }
    }

    Ok(ParameterKind::Tabular { columns, open })
}

/// Parse an entity list such as `[cluster('a').database('b'), database('c')]`.
pub fn parse_entities(text: &str) -> Vec<String> {
    split_top_level(strip_enclosing(text, '[', ']'), ',')
        .into_iter()
        .map(str::to_string)
        .collect()
}
