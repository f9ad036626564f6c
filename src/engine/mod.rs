//! Reconstruction engine
//!
//! This module provides the core execution logic:
//! - [`engine`]: The [`Engine`](engine::Engine) dispatch loop and history navigation
//! - [`ops`]: Slice, subscript, binary operator and mapping semantics
//! - [`builtins`]: `chr` and `replace`
//! - [`errors`]: Runtime error types
//!
//! # Execution Model
//!
//! Instructions run strictly in order against an operand stack and the
//! variable slots. The only control flow is the bounded `FOR_EACH_KEY` loop.
//! A snapshot is taken before the first instruction and after every
//! instruction, so the run can be replayed step by step afterwards.

pub mod builtins;
pub mod constants;
#[allow(clippy::module_inception)]
pub mod engine;
pub mod errors;
pub mod ops;

pub use engine::{reconstruct, Engine};
pub use errors::{Fault, HistoryError, RuntimeError};
