//! `CONCAT` and `REPEAT`
//!
//! Both operators are overloaded by operand kind: `+` concatenates strings and
//! tuples and adds integers, `*` repeats a string by an integer count and
//! multiplies integers. Any other combination is a type mismatch.

use crate::engine::constants::MAX_STRING_LEN;
use crate::engine::errors::Fault;
use crate::memory::Value;

fn mismatch(operation: &'static str, symbol: &str, left: &Value, right: &Value) -> Fault {
    Fault::TypeMismatch {
        operation,
        expected: match operation {
            "CONCAT" => "str + str, int + int or tuple + tuple",
            _ => "str * int or int * int",
        },
        got: format!("{} {} {}", left.kind(), symbol, right.kind()),
    }
}

/// `left + right`
pub fn concat(left: Value, right: Value) -> Result<Value, Fault> {
    match (left, right) {
        (Value::Str(mut a), Value::Str(b)) => {
            a.push_str(&b);
            Ok(Value::Str(a))
        }
        (Value::Int(a), Value::Int(b)) => a
            .checked_add(b)
            .map(Value::Int)
            .ok_or_else(|| Fault::IntegerOverflow {
                operation: format!("{} + {}", a, b),
            }),
        (Value::Tuple(mut a), Value::Tuple(b)) => {
            a.extend(b);
            Ok(Value::Tuple(a))
        }
        (left, right) => Err(mismatch("CONCAT", "+", &left, &right)),
    }
}

/// `left * right`
pub fn repeat(left: Value, right: Value) -> Result<Value, Fault> {
    match (left, right) {
        (Value::Str(s), Value::Int(count)) | (Value::Int(count), Value::Str(s)) => {
            Ok(Value::Str(repeat_str(&s, count)?))
        }
        (Value::Int(a), Value::Int(b)) => a
            .checked_mul(b)
            .map(Value::Int)
            .ok_or_else(|| Fault::IntegerOverflow {
                operation: format!("{} * {}", a, b),
            }),
        (left, right) => Err(mismatch("REPEAT", "*", &left, &right)),
    }
}

/// Repeat `s` `count` times; non-positive counts give the empty string
pub fn repeat_str(s: &str, count: i64) -> Result<String, Fault> {
    let times = usize::try_from(count).unwrap_or(0);
    let requested = s.len().checked_mul(times).ok_or_else(|| Fault::IntegerOverflow {
        operation: format!("{} * {}", Value::str(s).repr(), count),
    })?;
    if requested > MAX_STRING_LEN {
        return Err(Fault::StringTooLong {
            requested,
            limit: MAX_STRING_LEN,
        });
    }
    Ok(s.repeat(times))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(text: &str) -> Value {
        Value::str(text)
    }

    #[test]
    fn test_concat_strings_and_ints() {
        assert_eq!(concat(s("H"), s("TB")), Ok(s("HTB")));
        assert_eq!(concat(Value::Int(40), Value::Int(2)), Ok(Value::Int(42)));
        assert_eq!(
            concat(
                Value::Tuple(vec![s("o")]),
                Value::Tuple(vec![s("l"), s("a")])
            ),
            Ok(Value::Tuple(vec![s("o"), s("l"), s("a")]))
        );
    }

    #[test]
    fn test_concat_is_associative() {
        let triples = [("HTB", "{", "cro"), ("", "iss", ""), ("_h", "mmmm", "}")];
        for (a, b, c) in triples {
            let left = concat(concat(s(a), s(b)).unwrap(), s(c)).unwrap();
            let right = concat(s(a), concat(s(b), s(c)).unwrap()).unwrap();
            assert_eq!(left, right);
        }
    }

    #[test]
    fn test_concat_mismatch() {
        let err = concat(s("H"), Value::Int(72)).unwrap_err();
        assert_eq!(
            err,
            Fault::TypeMismatch {
                operation: "CONCAT",
                expected: "str + str, int + int or tuple + tuple",
                got: "str + int".to_string(),
            }
        );
    }

    #[test]
    fn test_concat_overflow() {
        assert!(matches!(
            concat(Value::Int(i64::MAX), Value::Int(1)),
            Err(Fault::IntegerOverflow { .. })
        ));
    }

    #[test]
    fn test_repeat_overflow() {
        assert!(matches!(
            repeat(s("mmm"), Value::Int(i64::MAX)),
            Err(Fault::IntegerOverflow { .. })
        ));
        assert_eq!(
            repeat(s("m"), Value::Int(i64::MAX)),
            Err(Fault::StringTooLong {
                requested: i64::MAX as usize,
                limit: MAX_STRING_LEN,
            })
        );
        assert_eq!(
            repeat_str("m", MAX_STRING_LEN as i64).map(|r| r.len()),
            Ok(MAX_STRING_LEN)
        );
    }

    #[test]
    fn test_repeat_counts() {
        assert_eq!(repeat(s("m"), Value::Int(0)), Ok(s("")));
        assert_eq!(repeat(s("m"), Value::Int(1)), Ok(s("m")));
        assert_eq!(repeat(s("m"), Value::Int(4)), Ok(s("mmmm")));
        assert_eq!(repeat(Value::Int(2), s("ab")), Ok(s("abab")));
        assert_eq!(repeat(s("m"), Value::Int(-3)), Ok(s("")));
        assert_eq!(repeat(Value::Int(6), Value::Int(7)), Ok(Value::Int(42)));
    }

    #[test]
    fn test_repeat_length() {
        for n in 0..6 {
            assert_eq!(repeat_str("croissant", n).unwrap().len(), n as usize * 9);
        }
    }

    #[test]
    fn test_repeat_two_strings_is_mismatch() {
        assert!(matches!(
            repeat(s("m"), s("4")),
            Err(Fault::TypeMismatch {
                operation: "REPEAT",
                ..
            })
        ));
    }
}
