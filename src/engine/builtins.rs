//! Built-in function and method implementations
//!
//! # Supported Built-ins
//!
//! - `chr(code_point)`: one-character string for a Unicode scalar value
//! - `replace(s, old, new[, count])`: function form of `str.replace`
//! - `str.replace(old, new[, count])`: replace non-overlapping occurrences of
//!   `old`, scanning left to right; a negative or missing `count` replaces all
//!
//! # Implementation Notes
//!
//! - Surrogate code points cannot be represented in a Rust `String`, so `chr`
//!   rejects them along with anything above `0x10FFFF`.
//! - An empty `old` inserts `new` between every character and at both ends.

use crate::engine::errors::Fault;
use crate::memory::Value;
use crate::program::{Builtin, Method};

/// Call a built-in function with its popped arguments
pub fn call_builtin(builtin: Builtin, args: Vec<Value>) -> Result<Value, Fault> {
    match builtin {
        Builtin::Chr => {
            let [code] = <[Value; 1]>::try_from(args).map_err(|args| {
                Fault::ArgumentCountMismatch {
                    function: "chr",
                    expected: "1",
                    got: args.len(),
                }
            })?;
            let code = code.as_int().ok_or_else(|| Fault::TypeMismatch {
                operation: "chr",
                expected: "int",
                got: code.kind().to_string(),
            })?;
            Ok(Value::Str(chr(code)?.to_string()))
        }
        Builtin::Replace => {
            if !(3..=4).contains(&args.len()) {
                return Err(Fault::ArgumentCountMismatch {
                    function: "replace",
                    expected: "3 or 4",
                    got: args.len(),
                });
            }
            let mut args = args;
            let receiver = args.remove(0);
            replace_call("replace", receiver, args, "3 or 4")
        }
    }
}

/// Call a method on `receiver` with its popped arguments
pub fn call_method(method: Method, receiver: Value, args: Vec<Value>) -> Result<Value, Fault> {
    match method {
        Method::Replace => replace_call("str.replace", receiver, args, "2 or 3"),
    }
}

fn replace_call(
    function: &'static str,
    receiver: Value,
    args: Vec<Value>,
    expected: &'static str,
) -> Result<Value, Fault> {
    let got = args.len();
    let (old, new, count) = match args.as_slice() {
        [old, new] => (old, new, None),
        [old, new, count] => (old, new, Some(count)),
        _ => {
            return Err(Fault::ArgumentCountMismatch {
                function,
                expected,
                got,
            })
        }
    };

    let expect_str = |value: &Value| -> Result<String, Fault> {
        value.as_str().map(str::to_string).ok_or_else(|| Fault::TypeMismatch {
            operation: function,
            expected: "str",
            got: value.kind().to_string(),
        })
    };
    let text = expect_str(&receiver)?;
    let old = expect_str(old)?;
    let new = expect_str(new)?;
    let count = match count {
        None => None,
        Some(value) => Some(value.as_int().ok_or_else(|| Fault::TypeMismatch {
            operation: function,
            expected: "int count",
            got: value.kind().to_string(),
        })?),
    };

    Ok(Value::Str(replace(&text, &old, &new, count)))
}

/// Map an integer code point to its character
pub fn chr(code: i64) -> Result<char, Fault> {
    u32::try_from(code)
        .ok()
        .and_then(char::from_u32)
        .ok_or(Fault::InvalidCodePoint(code))
}

/// Replace up to `count` (all when `None` or negative) occurrences of `old`
pub fn replace(text: &str, old: &str, new: &str, count: Option<i64>) -> String {
    match count.and_then(|n| usize::try_from(n).ok()) {
        Some(n) => text.replacen(old, new, n),
        None => text.replace(old, new),
    }
}
