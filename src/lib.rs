//! # Introduction
//!
//! Vipère reconstructs a hidden credential string by executing a small stack
//! machine program, recording a snapshot of the operand stack, the variable
//! slots and the trace after every instruction. The snapshot history can then
//! be navigated forward and backward through a terminal UI built with
//! [ratatui](https://docs.rs/ratatui).
//!
//! ## Execution pipeline
//!
//! ```text
//! Code object → Decoder → Program → Engine → Snapshots → TUI
//! ```
//!
//! 1. [`program`]: the instruction set, a decoder lifting CPython 3.8 bytecode
//!    into it, the built-in `get_credentials` fixture and a JSON loader.
//! 2. [`engine`]: executes a [`program::Program`], applying the value
//!    operations and the `chr`/`replace` built-ins, and captures
//!    [`snapshot::Snapshot`]s at each step.
//! 3. [`memory`]: tagged [`memory::Value`]s held in an
//!    [`memory::OperandStack`] and named [`memory::Slots`].
//! 4. [`snapshot`]: snapshot history with a configurable memory limit and the
//!    [`snapshot::TraceLog`] of assignments.
//! 5. [`ui`]: ratatui-based TUI; not part of the stable library API.
//!
//! ## Quick use
//!
//! ```
//! use vipere::engine::reconstruct;
//! use vipere::program::fixture::{credentials_program, FLAG};
//!
//! let program = credentials_program().unwrap();
//! assert_eq!(reconstruct(program).unwrap(), FLAG);
//! ```

pub mod engine;
pub mod memory;
pub mod program;
pub mod snapshot;
pub mod ui;
