//! Memory model for the reconstruction engine
//!
//! This module provides the core storage abstractions:
//! - [`value`]: Runtime value representation (None, Int, Str, Tuple, Slice, Mapping)
//! - [`stack`]: Operand stack passing values between instructions
//! - [`slots`]: Named variable slots, unset until first assignment
//!
//! Both the operand stack and the slots are owned by a single engine run and
//! are cloned wholesale into each snapshot.

pub mod slots;
pub mod stack;
pub mod value;

pub use slots::Slots;
pub use stack::OperandStack;
pub use value::{Mapping, SliceDescriptor, Value};

/// Rough heap footprint of a value in bytes, used for snapshot accounting
pub fn approximate_size(value: &Value) -> usize {
    let base = std::mem::size_of::<Value>();
    match value {
        Value::None | Value::Int(_) | Value::Slice(_) => base,
        Value::Str(s) => base + s.len(),
        Value::Tuple(items) => base + items.iter().map(approximate_size).sum::<usize>(),
        Value::Mapping(map) => {
            base + map
                .iter()
                .map(|(k, v)| k.len() + approximate_size(v))
                .sum::<usize>()
        }
    }
}
