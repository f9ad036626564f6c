//! JSON program sources
//!
//! A [`ProgramSource`] describes a code object on disk:
//!
//! ```json
//! {
//!   "consts": [null, 72, "apts_c", ["o", "l", "a"]],
//!   "names": ["chr", "replace"],
//!   "varnames": ["self", "f"],
//!   "code": "64017d01..."
//! }
//! ```
//!
//! Constants are JSON literals (`null`, integers, strings, arrays as tuples) and
//! `code` is the wordcode as a hex string.

use crate::memory::Value;
use crate::program::decode::{decode, CodeObject, DecodeError};
use crate::program::Program;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Errors raised while loading a program source
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read program source: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid program source: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid hex in code: {0}")]
    Hex(#[from] hex::FromHexError),

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// A constant pool entry as written in JSON
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ConstLiteral {
    Null,
    Int(i64),
    Str(String),
    Tuple(Vec<ConstLiteral>),
}

impl From<&ConstLiteral> for Value {
    fn from(literal: &ConstLiteral) -> Self {
        match literal {
            ConstLiteral::Null => Value::None,
            ConstLiteral::Int(n) => Value::Int(*n),
            ConstLiteral::Str(s) => Value::Str(s.clone()),
            ConstLiteral::Tuple(items) => Value::Tuple(items.iter().map(Value::from).collect()),
        }
    }
}

/// JSON form of a code object
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProgramSource {
    pub consts: Vec<ConstLiteral>,
    #[serde(default)]
    pub names: Vec<String>,
    pub varnames: Vec<String>,
    pub code: String,
}

impl ProgramSource {
    pub fn from_json(text: &str) -> Result<Self, SourceError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Convert into a raw code object
    pub fn to_code_object(&self) -> Result<CodeObject, SourceError> {
        Ok(CodeObject {
            consts: self.consts.iter().map(Value::from).collect(),
            names: self.names.clone(),
            varnames: self.varnames.clone(),
            code: hex::decode(self.code.trim())?,
        })
    }

    /// Decode into an executable program
    pub fn to_program(&self) -> Result<Program, SourceError> {
        Ok(decode(&self.to_code_object()?)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_const_literals() {
        let source = ProgramSource::from_json(
            r#"{
                "consts": [null, 72, "BT", ["o", "l"]],
                "varnames": ["self"],
                "code": "6401 5300"
            }"#,
        );
        // whitespace inside the hex string is not allowed
        assert!(matches!(
            source.as_ref().map(|s| s.to_code_object()),
            Ok(Err(SourceError::Hex(_)))
        ));

        let source = source.unwrap();
        let consts: Vec<Value> = source.consts.iter().map(Value::from).collect();
        assert_eq!(
            consts,
            vec![
                Value::None,
                Value::Int(72),
                Value::str("BT"),
                Value::Tuple(vec!["o".into(), "l".into()]),
            ]
        );
        assert!(source.names.is_empty());
    }

    #[test]
    fn test_to_program() {
        let source = ProgramSource {
            consts: vec![ConstLiteral::Null, ConstLiteral::Str("BT".to_string())],
            names: vec![],
            varnames: vec!["s".to_string()],
            code: "64017d017c015300".to_string(),
        };
        let program = source.to_program().unwrap();
        assert_eq!(program.code.len(), 4);
        assert_eq!(program.slot_names, vec!["s".to_string()]);
    }

    #[test]
    fn test_rejects_bad_json() {
        assert!(matches!(
            ProgramSource::from_json("{\"consts\": 3}"),
            Err(SourceError::Json(_))
        ));
    }
}
