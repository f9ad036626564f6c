//! `SUBSCRIPT`: indexing and slicing of strings, tuples and mappings

use super::slice::{slice_items, slice_str};
use crate::engine::errors::Fault;
use crate::memory::Value;

/// Resolve a possibly negative index against a sequence length
fn resolve_index(index: i64, len: usize, kind: &'static str) -> Result<usize, Fault> {
    let resolved = if index < 0 {
        index.checked_add(len as i64)
    } else {
        Some(index)
    };
    resolved
        .filter(|i| *i >= 0 && (*i as usize) < len)
        .map(|i| i as usize)
        .ok_or(Fault::IndexOutOfRange { index, kind, len })
}

/// `container[key]`
pub fn subscript(container: Value, key: Value) -> Result<Value, Fault> {
    match (container, key) {
        (Value::Str(s), Value::Int(index)) => {
            let len = s.chars().count();
            let position = resolve_index(index, len, "str")?;
            Ok(s.chars().nth(position).map(String::from).unwrap_or_default().into())
        }
        (Value::Str(s), Value::Slice(slice)) => Ok(Value::Str(slice_str(&s, &slice)?)),
        (Value::Tuple(items), Value::Int(index)) => {
            let position = resolve_index(index, items.len(), "tuple")?;
            Ok(items[position].clone())
        }
        (Value::Tuple(items), Value::Slice(slice)) => {
            Ok(Value::Tuple(slice_items(&items, &slice)?))
        }
        (Value::Mapping(map), key) => {
            let found = key.as_str().and_then(|k| map.get(k));
            found.cloned().ok_or_else(|| Fault::MissingKey { key: key.repr() })
        }
        (container, key) => Err(Fault::TypeMismatch {
            operation: "SUBSCRIPT",
            expected: "str or tuple indexed by int or slice, or dict indexed by key",
            got: format!("{}[{}]", container.kind(), key.kind()),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{Mapping, SliceDescriptor};

    #[test]
    fn test_string_index() {
        assert_eq!(subscript(Value::str("orc"), Value::Int(0)), Ok(Value::str("o")));
        assert_eq!(subscript(Value::str("orc"), Value::Int(-1)), Ok(Value::str("c")));
        assert_eq!(
            subscript(Value::str("orc"), Value::Int(3)),
            Err(Fault::IndexOutOfRange {
                index: 3,
                kind: "str",
                len: 3
            })
        );
        assert!(subscript(Value::str(""), Value::Int(-1)).is_err());
    }

    #[test]
    fn test_string_slice() {
        assert_eq!(
            subscript(Value::str("ocoh"), Value::Slice(SliceDescriptor::reverse())),
            Ok(Value::str("hoco"))
        );
    }

    #[test]
    fn test_tuple_access() {
        let keys = Value::Tuple(vec!["o".into(), "l".into(), "a".into()]);
        assert_eq!(subscript(keys.clone(), Value::Int(1)), Ok(Value::str("l")));
        assert_eq!(
            subscript(keys, Value::Slice(SliceDescriptor::reverse())),
            Ok(Value::Tuple(vec!["a".into(), "l".into(), "o".into()]))
        );
    }

    #[test]
    fn test_mapping_lookup() {
        let mut map = Mapping::new();
        map.insert("o".to_string(), "0".into());

        assert_eq!(
            subscript(Value::Mapping(map.clone()), Value::str("o")),
            Ok(Value::str("0"))
        );
        assert_eq!(
            subscript(Value::Mapping(map), Value::str("z")),
            Err(Fault::MissingKey {
                key: "'z'".to_string()
            })
        );
    }

    #[test]
    fn test_mismatch() {
        assert!(matches!(
            subscript(Value::Int(72), Value::Int(0)),
            Err(Fault::TypeMismatch { .. })
        ));
    }
}
