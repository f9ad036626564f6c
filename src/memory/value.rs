//! Runtime value representation
//!
//! This module defines the [`Value`] enum, which represents every value that can
//! live in the constant pool, on the operand stack, or in a variable slot.
//!
//! # Value Types
//!
//! - [`Value::None`]: The null / absence marker (slice bounds left open)
//! - [`Value::Int`]: 64-bit signed integer
//! - [`Value::Str`]: Unicode string, indexed by scalar value
//! - [`Value::Tuple`]: Immutable sequence (the key tuple of a mapping)
//! - [`Value::Slice`]: A `(start, stop, step)` descriptor built by `BUILD_SLICE`
//! - [`Value::Mapping`]: Insertion-ordered key → value table
//!
//! # Rendering
//!
//! [`Value::repr`] renders values the way the original tool printed them in its
//! trace (`'TB'`, `72`, `('o', 'l', 'a')`, `slice(None, None, -1)`), which is
//! what the trace log and the TUI panes display.

use indexmap::IndexMap;
use std::fmt;

/// Insertion-ordered mapping; iteration order is the order keys were inserted.
pub type Mapping = IndexMap<String, Value>;

/// Runtime values in the engine
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    None,
    Int(i64),
    Str(String),
    Tuple(Vec<Value>),
    Slice(SliceDescriptor),
    Mapping(Mapping),
}

/// Slice descriptor; a `None` component means "sequence boundary" (or step 1)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SliceDescriptor {
    pub start: Option<i64>,
    pub stop: Option<i64>,
    pub step: Option<i64>,
}

impl SliceDescriptor {
    pub fn new(start: Option<i64>, stop: Option<i64>, step: Option<i64>) -> Self {
        SliceDescriptor { start, stop, step }
    }

    /// The `[::-1]` idiom
    pub fn reverse() -> Self {
        SliceDescriptor::new(None, None, Some(-1))
    }
}

impl Value {
    /// Convenience constructor for string values
    pub fn str(s: impl Into<String>) -> Self {
        Value::Str(s.into())
    }

    /// Name of the value's kind, as used in type mismatch diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            Value::None => "NoneType",
            Value::Int(_) => "int",
            Value::Str(_) => "str",
            Value::Tuple(_) => "tuple",
            Value::Slice(_) => "slice",
            Value::Mapping(_) => "dict",
        }
    }

    /// Get the integer value, returns None if not an Int
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Get the string value, returns None if not a Str
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Render the value in trace form
    pub fn repr(&self) -> String {
        match self {
            Value::None => "None".to_string(),
            Value::Int(n) => n.to_string(),
            Value::Str(s) => quote(s),
            Value::Tuple(items) => {
                let inner: Vec<String> = items.iter().map(Value::repr).collect();
                if inner.len() == 1 {
                    format!("({},)", inner[0])
                } else {
                    format!("({})", inner.join(", "))
                }
            }
            Value::Slice(slice) => format!(
                "slice({}, {}, {})",
                bound_repr(slice.start),
                bound_repr(slice.stop),
                bound_repr(slice.step)
            ),
            Value::Mapping(map) => {
                let inner: Vec<String> = map
                    .iter()
                    .map(|(k, v)| format!("{}: {}", quote(k), v.repr()))
                    .collect();
                format!("{{{}}}", inner.join(", "))
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.repr())
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

fn bound_repr(bound: Option<i64>) -> String {
    bound.map_or_else(|| "None".to_string(), |n| n.to_string())
}

/// Quote a string, preferring single quotes unless the text contains one
fn quote(s: &str) -> String {
    let delimiter = if s.contains('\'') && !s.contains('"') {
        '"'
    } else {
        '\''
    };

    let mut out = String::with_capacity(s.len() + 2);
    out.push(delimiter);
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c if c == delimiter => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out.push(delimiter);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repr_matches_trace_format() {
        assert_eq!(Value::Int(72).repr(), "72");
        assert_eq!(Value::str("apts_c").repr(), "'apts_c'");
        assert_eq!(Value::None.repr(), "None");
        assert_eq!(
            Value::Slice(SliceDescriptor::reverse()).repr(),
            "slice(None, None, -1)"
        );
        let keys = Value::Tuple(vec!["o".into(), "l".into(), "a".into()]);
        assert_eq!(keys.repr(), "('o', 'l', 'a')");
    }

    #[test]
    fn test_repr_quotes() {
        assert_eq!(Value::str("it's").repr(), "\"it's\"");
        assert_eq!(Value::str("a'\"b").repr(), "'a\\'\"b'");
        assert_eq!(Value::Tuple(vec![Value::Int(1)]).repr(), "(1,)");
    }

    #[test]
    fn test_mapping_repr_keeps_insertion_order() {
        let mut map = Mapping::new();
        map.insert("o".to_string(), "0".into());
        map.insert("l".to_string(), "1".into());
        map.insert("a".to_string(), "4".into());
        assert_eq!(
            Value::Mapping(map).repr(),
            "{'o': '0', 'l': '1', 'a': '4'}"
        );
    }
}
