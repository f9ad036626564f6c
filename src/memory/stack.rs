//! Operand stack
//!
//! The implicit last-in-first-out buffer that passes values between consecutive
//! instructions. Every pop is checked: popping more values than are present is a
//! [`Fault::StackUnderflow`], which signals a malformed instruction stream.

use super::value::Value;
use crate::engine::errors::Fault;

/// Array-backed operand stack
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OperandStack {
    values: Vec<Value>,
}

impl OperandStack {
    pub fn new() -> Self {
        OperandStack { values: Vec::new() }
    }

    pub fn push(&mut self, value: Value) {
        self.values.push(value);
    }

    /// Pop the top value
    pub fn pop(&mut self) -> Result<Value, Fault> {
        self.values.pop().ok_or(Fault::StackUnderflow {
            needed: 1,
            available: 0,
        })
    }

    /// Pop `count` values, returned in the order they were pushed
    pub fn pop_many(&mut self, count: usize) -> Result<Vec<Value>, Fault> {
        let available = self.values.len();
        if count > available {
            return Err(Fault::StackUnderflow {
                needed: count,
                available,
            });
        }
        Ok(self.values.split_off(available - count))
    }

    /// Pop exactly `N` values into an array, bottom-most first
    pub fn pop_array<const N: usize>(&mut self) -> Result<[Value; N], Fault> {
        let available = self.values.len();
        self.pop_many(N)?
            .try_into()
            .map_err(|_: Vec<Value>| Fault::StackUnderflow {
                needed: N,
                available,
            })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Values from bottom to top
    pub fn values(&self) -> &[Value] {
        &self.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pop_many_preserves_push_order() {
        let mut stack = OperandStack::new();
        stack.push(Value::Int(1));
        stack.push(Value::Int(2));
        stack.push(Value::Int(3));

        let popped = stack.pop_many(2).unwrap();
        assert_eq!(popped, vec![Value::Int(2), Value::Int(3)]);
        assert_eq!(stack.len(), 1);
    }

    #[test]
    fn test_underflow_leaves_stack_untouched() {
        let mut stack = OperandStack::new();
        stack.push(Value::str("BT"));

        let err = stack.pop_array::<3>().unwrap_err();
        assert_eq!(
            err,
            Fault::StackUnderflow {
                needed: 3,
                available: 1
            }
        );
        assert_eq!(stack.len(), 1);
    }

    #[test]
    fn test_pop_empty() {
        let mut stack = OperandStack::new();
        assert!(matches!(
            stack.pop(),
            Err(Fault::StackUnderflow { needed: 1, .. })
        ));
    }
}
