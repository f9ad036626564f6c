//! Slice construction and application
//!
//! Slice bounds are resolved against a sequence length the same way the
//! original runtime does it: negative bounds count from the end, out-of-range
//! bounds are clamped, and open bounds default according to the sign of the
//! step. `[::-1]` therefore visits `len-1, len-2, ..., 0`.

use crate::engine::errors::Fault;
use crate::memory::{SliceDescriptor, Value};

/// Build a slice descriptor from 2 or 3 popped bounds
pub fn build_slice(bounds: Vec<Value>) -> Result<SliceDescriptor, Fault> {
    let mut parts = Vec::with_capacity(3);
    for bound in &bounds {
        match bound {
            Value::None => parts.push(None),
            Value::Int(n) => parts.push(Some(*n)),
            other => {
                return Err(Fault::TypeMismatch {
                    operation: "BUILD_SLICE",
                    expected: "int or None",
                    got: other.kind().to_string(),
                })
            }
        }
    }

    match parts.as_slice() {
        [start, stop] => Ok(SliceDescriptor::new(*start, *stop, None)),
        [start, stop, step] => Ok(SliceDescriptor::new(*start, *stop, *step)),
        _ => Err(Fault::ArgumentCountMismatch {
            function: "slice",
            expected: "2 or 3",
            got: bounds.len(),
        }),
    }
}

/// Positions selected by `slice` over a sequence of `len` elements
pub fn indices(slice: &SliceDescriptor, len: usize) -> Result<Vec<usize>, Fault> {
    let step = slice.step.unwrap_or(1);
    if step == 0 {
        return Err(Fault::InvalidSlice);
    }
    let len = len as i64;

    let (default_start, default_stop) = if step > 0 { (0, len) } else { (len - 1, -1) };
    let clamp = |bound: Option<i64>, default: i64| match bound {
        None => default,
        Some(b) if b < 0 => {
            let b = b.saturating_add(len);
            if b < 0 {
                if step < 0 {
                    -1
                } else {
                    0
                }
            } else {
                b
            }
        }
        Some(b) if b >= len => {
            if step < 0 {
                len - 1
            } else {
                len
            }
        }
        Some(b) => b,
    };

    let start = clamp(slice.start, default_start);
    let stop = clamp(slice.stop, default_stop);

    let mut selected = Vec::new();
    let mut i = start;
    while (step > 0 && i < stop) || (step < 0 && i > stop) {
        selected.push(i as usize);
        match i.checked_add(step) {
            Some(next) => i = next,
            None => break,
        }
    }
    Ok(selected)
}

/// Slice a string by Unicode scalar values
pub fn slice_str(s: &str, slice: &SliceDescriptor) -> Result<String, Fault> {
    let chars: Vec<char> = s.chars().collect();
    Ok(indices(slice, chars.len())?
        .into_iter()
        .map(|i| chars[i])
        .collect())
}

/// Slice any sequence of cloneable items
pub fn slice_items<T: Clone>(items: &[T], slice: &SliceDescriptor) -> Result<Vec<T>, Fault> {
    Ok(indices(slice, items.len())?
        .into_iter()
        .map(|i| items[i].clone())
        .collect())
}
