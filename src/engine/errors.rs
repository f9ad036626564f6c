//! Runtime error types for the reconstruction engine
//!
//! A [`Fault`] describes what went wrong; a [`RuntimeError`] pins the fault to
//! the instruction that raised it. All runtime errors are fatal: the run halts
//! and no result string is produced.

use crate::program::CodePath;
use thiserror::Error;

/// What went wrong while executing an instruction
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Fault {
    /// Constant pool index out of range
    #[error("constant index {index} out of range for a pool of {len}")]
    ConstantOutOfRange { index: usize, len: usize },

    /// Variable slot index out of range
    #[error("variable slot {index} out of range for {len} slots")]
    SlotOutOfRange { index: usize, len: usize },

    /// Slot read before its first assignment
    #[error("variable '{name}' read before assignment")]
    UndefinedVariable { name: String },

    /// Pop from a stack holding too few values
    #[error("stack underflow: needed {needed} operand(s), found {available}")]
    StackUnderflow { needed: usize, available: usize },

    /// Operand kinds the operation cannot combine
    #[error("type mismatch in {operation}: expected {expected}, got {got}")]
    TypeMismatch {
        operation: &'static str,
        expected: &'static str,
        got: String,
    },

    /// Sequence subscript out of range
    #[error("index {index} out of range for {kind} of length {len}")]
    IndexOutOfRange {
        index: i64,
        kind: &'static str,
        len: usize,
    },

    /// Mapping subscript with an absent key
    #[error("key {key} not found in mapping")]
    MissingKey { key: String },

    /// Slice with a step of zero
    #[error("slice step cannot be zero")]
    InvalidSlice,

    /// `chr()` argument that is not a Unicode scalar value
    #[error("chr() argument {0} is not a valid code point")]
    InvalidCodePoint(i64),

    /// Checked integer arithmetic overflowed
    #[error("integer overflow in {operation}")]
    IntegerOverflow { operation: String },

    /// String result larger than the engine allows
    #[error("string of {requested} bytes exceeds the {limit}-byte limit")]
    StringTooLong { requested: usize, limit: usize },

    /// Call with the wrong number of arguments
    #[error("{function}() takes {expected} argument(s), got {got}")]
    ArgumentCountMismatch {
        function: &'static str,
        expected: &'static str,
        got: usize,
    },

    /// Mapping key tuple and value count disagree
    #[error("mapping has {keys} key(s) but {values} value(s)")]
    MappingShape { keys: usize, values: usize },

    /// Operands left behind when the run returned
    #[error("{count} operand(s) left on the stack at return")]
    DanglingOperands { count: usize },

    /// Instruction stream exhausted without a return
    #[error("instruction stream ended without a return")]
    MissingReturn,

    /// Snapshot history would exceed its memory budget
    #[error("snapshot memory limit exceeded: {current} + {requested} > {limit} bytes")]
    SnapshotLimitExceeded {
        current: usize,
        requested: usize,
        limit: usize,
    },
}

/// A fault together with the instruction that raised it
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{fault} at {path} ({op})")]
pub struct RuntimeError {
    pub path: CodePath,
    pub op: &'static str,
    pub fault: Fault,
}

impl RuntimeError {
    pub fn new(path: CodePath, op: &'static str, fault: Fault) -> Self {
        RuntimeError { path, op, fault }
    }

    pub fn fault(&self) -> &Fault {
        &self.fault
    }

    pub fn path(&self) -> &CodePath {
        &self.path
    }
}

/// Errors from history navigation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum HistoryError {
    #[error("no execution history recorded")]
    Empty,

    #[error("already at the first step")]
    AtStart,

    #[error("already at the last step")]
    AtEnd,
}
