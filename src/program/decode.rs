//! Code object decoder
//!
//! Lifts the wordcode of a CPython 3.8 code object into the closed
//! [`Instruction`] set. Only the opcodes needed by the fixed `get_credentials`
//! function are understood; everything else is rejected.
//!
//! # Lifting Rules
//!
//! - `LOAD_GLOBAL` / `LOAD_METHOD` push nothing: the callable is remembered and
//!   attached to the matching `CALL_FUNCTION` / `CALL_METHOD`.
//! - `BUILD_CONST_KEY_MAP` absorbs the `LOAD_CONST` of its key tuple.
//! - `GET_ITER FOR_ITER STORE_FAST <body> JUMP_ABSOLUTE` becomes a single
//!   [`Instruction::ForEachKey`] whose body is the decoded `<body>`.
//!
//! Constant and slot indices are passed through unchecked; the engine reports
//! out-of-range operands when it executes them.

use crate::memory::Value;
use crate::program::instruction::{Builtin, Instruction, Method};
use crate::program::Program;
use thiserror::Error;
use tracing::debug;

mod opcode {
    pub const BINARY_MULTIPLY: u8 = 20;
    pub const BINARY_ADD: u8 = 23;
    pub const BINARY_SUBSCR: u8 = 25;
    pub const GET_ITER: u8 = 68;
    pub const RETURN_VALUE: u8 = 83;
    pub const FOR_ITER: u8 = 93;
    pub const LOAD_CONST: u8 = 100;
    pub const JUMP_ABSOLUTE: u8 = 113;
    pub const LOAD_GLOBAL: u8 = 116;
    pub const LOAD_FAST: u8 = 124;
    pub const STORE_FAST: u8 = 125;
    pub const CALL_FUNCTION: u8 = 131;
    pub const BUILD_SLICE: u8 = 133;
    pub const BUILD_CONST_KEY_MAP: u8 = 156;
    pub const LOAD_METHOD: u8 = 160;
    pub const CALL_METHOD: u8 = 161;
}

/// Raw code object: the static data the original tool extracted
#[derive(Debug, Clone, PartialEq)]
pub struct CodeObject {
    pub consts: Vec<Value>,
    pub names: Vec<String>,
    pub varnames: Vec<String>,
    pub code: Vec<u8>,
}

/// Errors raised while lifting wordcode
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("code length {0} is not a whole number of 2-byte instructions")]
    OddLength(usize),

    #[error("unsupported opcode {opcode} at offset {offset}")]
    UnsupportedOpcode { offset: usize, opcode: u8 },

    #[error("name index {index} out of range for {len} names at offset {offset}")]
    NameOutOfRange {
        offset: usize,
        index: usize,
        len: usize,
    },

    #[error("unknown built-in '{name}' at offset {offset}")]
    UnknownBuiltin { offset: usize, name: String },

    #[error("unknown method '{name}' at offset {offset}")]
    UnknownMethod { offset: usize, name: String },

    #[error("call at offset {offset} has no matching callable")]
    NoPendingCall { offset: usize },

    #[error("{count} callable(s) loaded but never called")]
    UnresolvedCall { count: usize },

    #[error("BUILD_CONST_KEY_MAP at offset {offset} is not preceded by a key tuple constant")]
    MalformedMapping { offset: usize },

    #[error("malformed loop at offset {offset}: {reason}")]
    MalformedLoop { offset: usize, reason: &'static str },

    #[error("code ends inside the instruction at offset {offset}")]
    Truncated { offset: usize },
}

#[derive(Debug, Clone, Copy)]
enum PendingCall {
    Builtin(Builtin),
    Method(Method),
}

struct Decoder<'a> {
    code: &'a [u8],
    names: &'a [String],
    offset: usize,
    pending: Vec<PendingCall>,
}

/// Decode a code object into a program
pub fn decode(object: &CodeObject) -> Result<Program, DecodeError> {
    if object.code.len() % 2 != 0 {
        return Err(DecodeError::OddLength(object.code.len()));
    }

    let mut decoder = Decoder {
        code: &object.code,
        names: &object.names,
        offset: 0,
        pending: Vec::new(),
    };
    let code = decoder.decode_until(object.code.len())?;

    if !decoder.pending.is_empty() {
        return Err(DecodeError::UnresolvedCall {
            count: decoder.pending.len(),
        });
    }

    debug!(
        bytes = object.code.len(),
        instructions = code.len(),
        "decoded code object"
    );
    Ok(Program::new(
        object.consts.clone(),
        object.varnames.clone(),
        code,
    ))
}

impl Decoder<'_> {
    /// Read the `(opcode, arg)` word at `offset`
    fn word(&self, offset: usize) -> Result<(u8, u8), DecodeError> {
        match (self.code.get(offset), self.code.get(offset + 1)) {
            (Some(&op), Some(&arg)) => Ok((op, arg)),
            _ => Err(DecodeError::Truncated { offset }),
        }
    }

    fn name(&self, offset: usize, index: u8) -> Result<&str, DecodeError> {
        self.names
            .get(index as usize)
            .map(String::as_str)
            .ok_or(DecodeError::NameOutOfRange {
                offset,
                index: index as usize,
                len: self.names.len(),
            })
    }

    /// Decode instructions from the current offset up to (not including) `end`
    fn decode_until(&mut self, end: usize) -> Result<Vec<Instruction>, DecodeError> {
        let mut block = Vec::new();

        while self.offset < end {
            let offset = self.offset;
            let (op, arg) = self.word(offset)?;
            self.offset += 2;

            match op {
                opcode::LOAD_CONST => block.push(Instruction::LoadConst(arg as usize)),
                opcode::STORE_FAST => block.push(Instruction::StoreVar(arg as usize)),
                opcode::LOAD_FAST => block.push(Instruction::LoadVar(arg as usize)),
                opcode::BUILD_SLICE => block.push(Instruction::BuildSlice(arg as usize)),
                opcode::BINARY_SUBSCR => block.push(Instruction::Subscript),
                opcode::BINARY_ADD => block.push(Instruction::Concat),
                opcode::BINARY_MULTIPLY => block.push(Instruction::Repeat),
                opcode::RETURN_VALUE => block.push(Instruction::Return),

                opcode::LOAD_GLOBAL => {
                    let name = self.name(offset, arg)?;
                    let builtin =
                        Builtin::from_name(name).ok_or_else(|| DecodeError::UnknownBuiltin {
                            offset,
                            name: name.to_string(),
                        })?;
                    self.pending.push(PendingCall::Builtin(builtin));
                }
                opcode::LOAD_METHOD => {
                    let name = self.name(offset, arg)?;
                    let method =
                        Method::from_name(name).ok_or_else(|| DecodeError::UnknownMethod {
                            offset,
                            name: name.to_string(),
                        })?;
                    self.pending.push(PendingCall::Method(method));
                }
                opcode::CALL_FUNCTION => match self.pending.pop() {
                    Some(PendingCall::Builtin(builtin)) => block.push(Instruction::CallBuiltin {
                        builtin,
                        argc: arg as usize,
                    }),
                    _ => return Err(DecodeError::NoPendingCall { offset }),
                },
                opcode::CALL_METHOD => match self.pending.pop() {
                    Some(PendingCall::Method(method)) => block.push(Instruction::CallMethod {
                        method,
                        argc: arg as usize,
                    }),
                    _ => return Err(DecodeError::NoPendingCall { offset }),
                },

                opcode::BUILD_CONST_KEY_MAP => match block.pop() {
                    Some(Instruction::LoadConst(keys)) => block.push(Instruction::BuildMapping {
                        keys,
                        count: arg as usize,
                    }),
                    _ => return Err(DecodeError::MalformedMapping { offset }),
                },

                opcode::GET_ITER => block.push(self.decode_loop(offset)?),

                _ => return Err(DecodeError::UnsupportedOpcode { offset, opcode: op }),
            }
        }

        Ok(block)
    }

    /// Decode `GET_ITER FOR_ITER STORE_FAST <body> JUMP_ABSOLUTE`; `get_iter` is
    /// the offset of `GET_ITER`, already consumed
    fn decode_loop(&mut self, get_iter: usize) -> Result<Instruction, DecodeError> {
        let for_iter = get_iter + 2;
        let (op, delta) = self.word(for_iter)?;
        if op != opcode::FOR_ITER {
            return Err(DecodeError::MalformedLoop {
                offset: for_iter,
                reason: "GET_ITER is not followed by FOR_ITER",
            });
        }
        // FOR_ITER's delta is relative to the next instruction
        let exit = for_iter + 2 + delta as usize;

        let (op, slot) = self.word(for_iter + 2)?;
        if op != opcode::STORE_FAST {
            return Err(DecodeError::MalformedLoop {
                offset: for_iter + 2,
                reason: "loop key is not stored into a slot",
            });
        }

        let body_start = for_iter + 4;
        let jump = match exit.checked_sub(2) {
            Some(jump) if jump >= body_start && exit <= self.code.len() => jump,
            _ => {
                return Err(DecodeError::MalformedLoop {
                    offset: for_iter,
                    reason: "loop exit lies outside the code",
                })
            }
        };
        let (op, target) = self.word(jump)?;
        if op != opcode::JUMP_ABSOLUTE || target as usize != for_iter {
            return Err(DecodeError::MalformedLoop {
                offset: jump,
                reason: "loop body does not jump back to its FOR_ITER",
            });
        }

        self.offset = body_start;
        let body = self.decode_until(jump)?;
        self.offset = exit;

        Ok(Instruction::ForEachKey {
            slot: slot as usize,
            body,
        })
    }
}
