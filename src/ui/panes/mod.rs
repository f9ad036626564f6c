//! TUI pane rendering modules
//!
//! # Pane Modules
//!
//! - [`code`]: Lifted instruction listing with the current instruction marked
//! - [`stack`]: Operand stack, top first
//! - [`variables`]: Variable slots and their values
//! - [`trace`]: Trace lines recorded so far
//! - [`status`]: Status bar with keybindings and execution state
//! - `formatting`: Shared value coloring and scroll helpers
//!
//! Each pane exports a `render_*` function taking the frame, its area, the
//! snapshot data it shows, whether it is focused, and its scroll state.

mod formatting;

pub mod code;
pub mod stack;
pub mod status;
pub mod trace;
pub mod variables;

pub use code::{render_code_pane, CodeRenderData, CodeScrollState};
pub use stack::render_stack_pane;
pub use status::{render_status_bar, StatusRenderData};
pub use trace::render_trace_pane;
pub use variables::render_variables_pane;
