//! `BUILD_MAPPING`
//!
//! Zips a constant key tuple with the popped values. The resulting mapping
//! iterates in key-tuple order, which is the order `FOR_EACH_KEY` applies the
//! substitutions in.

use crate::engine::errors::Fault;
use crate::memory::{Mapping, Value};

/// Zip `keys` (a tuple of strings) with `values`
pub fn build_mapping(keys: &Value, values: Vec<Value>) -> Result<Mapping, Fault> {
    let Value::Tuple(keys) = keys else {
        return Err(Fault::TypeMismatch {
            operation: "BUILD_MAPPING",
            expected: "tuple of str keys",
            got: keys.kind().to_string(),
        });
    };

    if keys.len() != values.len() {
        return Err(Fault::MappingShape {
            keys: keys.len(),
            values: values.len(),
        });
    }

    let mut mapping = Mapping::with_capacity(keys.len());
    for (key, value) in keys.iter().zip(values) {
        let key = key.as_str().ok_or_else(|| Fault::TypeMismatch {
            operation: "BUILD_MAPPING",
            expected: "str key",
            got: key.kind().to_string(),
        })?;
        mapping.insert(key.to_string(), value);
    }
    Ok(mapping)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_keep_declared_order() {
        let keys = Value::Tuple(vec!["o".into(), "l".into(), "a".into()]);
        let mapping = build_mapping(&keys, vec!["0".into(), "1".into(), "4".into()]).unwrap();

        let order: Vec<&str> = mapping.keys().map(String::as_str).collect();
        assert_eq!(order, vec!["o", "l", "a"]);
        assert_eq!(mapping.get("a"), Some(&Value::str("4")));
    }

    #[test]
    fn test_shape_mismatch() {
        let keys = Value::Tuple(vec!["o".into(), "l".into()]);
        assert_eq!(
            build_mapping(&keys, vec!["0".into()]),
            Err(Fault::MappingShape { keys: 2, values: 1 })
        );
    }

    #[test]
    fn test_non_tuple_keys() {
        assert!(matches!(
            build_mapping(&Value::str("ola"), vec![]),
            Err(Fault::TypeMismatch { .. })
        ));
        let keys = Value::Tuple(vec![Value::Int(1)]);
        assert!(matches!(
            build_mapping(&keys, vec!["0".into()]),
            Err(Fault::TypeMismatch {
                expected: "str key",
                ..
            })
        ));
    }
}
