//! Main TUI application state and logic

use crate::engine::errors::RuntimeError;
use crate::engine::Engine;
use crate::memory::{OperandStack, Slots};
use crate::program::{listing_rows, CodePath, ListingLine};
use crate::snapshot::TraceLog;
use crate::ui::panes::{
    render_code_pane, render_stack_pane, render_status_bar, render_trace_pane,
    render_variables_pane, CodeRenderData, CodeScrollState, StatusRenderData,
};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    Frame, Terminal,
};
use rustc_hash::FxHashMap;
use std::io;
use std::time::{Duration, Instant};

/// Which pane is currently focused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusedPane {
    Code,
    Stack,
    Variables,
    Trace,
}

impl FocusedPane {
    /// Move focus to the next pane (clockwise: code -> trace -> stack -> variables)
    pub fn next(self) -> Self {
        match self {
            FocusedPane::Code => FocusedPane::Trace,
            FocusedPane::Trace => FocusedPane::Stack,
            FocusedPane::Stack => FocusedPane::Variables,
            FocusedPane::Variables => FocusedPane::Code,
        }
    }

    /// Move focus to the previous pane (counter-clockwise)
    pub fn prev(self) -> Self {
        match self {
            FocusedPane::Code => FocusedPane::Variables,
            FocusedPane::Trace => FocusedPane::Code,
            FocusedPane::Stack => FocusedPane::Trace,
            FocusedPane::Variables => FocusedPane::Stack,
        }
    }
}

/// The main application state
pub struct App {
    /// The engine holding the recorded history
    pub engine: Engine,

    /// Flattened program listing
    pub listing: Vec<ListingLine>,

    /// Listing row of each code path
    pub listing_rows: FxHashMap<CodePath, usize>,

    /// Error that ended the run, if any
    pub error: Option<RuntimeError>,

    /// Currently focused pane
    pub focused_pane: FocusedPane,

    /// Per-pane scroll state
    pub code_scroll: CodeScrollState,
    pub stack_scroll: usize,
    pub variables_scroll: usize,
    pub trace_scroll: usize,

    /// Whether the app should quit
    pub should_quit: bool,

    /// Status message to display
    pub status_message: String,

    /// Whether auto-play mode is active
    pub is_playing: bool,

    /// Last time a step was taken in play mode
    pub last_play_time: Instant,

    /// Last time space was pressed (for debouncing)
    pub last_space_press: Instant,
}

impl App {
    /// Create a new app over an engine that has already run
    pub fn new(engine: Engine, error: Option<RuntimeError>) -> Self {
        let listing = engine.program().listing();
        let listing_rows = listing_rows(&listing);
        let status_message = match &error {
            Some(err) => format!("Run failed: {}", err),
            None => String::from("Ready!"),
        };
        let long_ago = Instant::now()
            .checked_sub(Duration::from_secs(1))
            .unwrap_or_else(Instant::now);

        App {
            engine,
            listing,
            listing_rows,
            error,
            focused_pane: FocusedPane::Code,
            code_scroll: CodeScrollState {
                offset: 0,
                follow: true,
            },
            stack_scroll: 0,
            variables_scroll: 0,
            trace_scroll: 0,
            should_quit: false,
            status_message,
            is_playing: false,
            last_play_time: Instant::now(),
            last_space_press: long_ago,
        }
    }

    /// Run the TUI application
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;

            if self.should_quit {
                break;
            }

            // Handle auto-play mode
            if self.is_playing && self.last_play_time.elapsed() >= Duration::from_millis(500) {
                if self.engine.step_forward().is_ok() {
                    self.after_step("Playing...");
                } else {
                    self.is_playing = false;
                    self.status_message = "Playback complete".to_string();
                }
                self.last_play_time = Instant::now();
            }

            // Use poll with timeout to allow auto-play to work
            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key_event(key);
                    }
                }
            }
        }

        Ok(())
    }

    /// Render the UI
    fn render(&mut self, frame: &mut Frame) {
        let size = frame.area();

        let main_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(size);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(main_chunks[0]);

        // Left column: Instructions (top) | Trace (bottom)
        let left_rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
            .split(columns[0]);

        // Right column: Operand stack (top) | Variables (bottom)
        let right_rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(columns[1]);

        let empty_stack = OperandStack::new();
        let empty_slots = Slots::new(Vec::new());
        let empty_trace = TraceLog::new();
        let snapshot = self.engine.current_snapshot();
        let at_end = self.engine.history_position() + 1 >= self.engine.total_snapshots();

        render_code_pane(
            frame,
            left_rows[0],
            CodeRenderData {
                listing: &self.listing,
                rows: &self.listing_rows,
                executed: snapshot.and_then(|s| s.executed.as_ref()),
                error_path: self.error.as_ref().filter(|_| at_end).map(|e| e.path()),
            },
            self.focused_pane == FocusedPane::Code,
            &mut self.code_scroll,
        );

        render_trace_pane(
            frame,
            left_rows[1],
            snapshot.map_or(&empty_trace, |s| &s.trace),
            self.focused_pane == FocusedPane::Trace,
            &mut self.trace_scroll,
        );

        render_stack_pane(
            frame,
            right_rows[0],
            snapshot.map_or(&empty_stack, |s| &s.stack),
            self.focused_pane == FocusedPane::Stack,
            &mut self.stack_scroll,
        );

        render_variables_pane(
            frame,
            right_rows[1],
            snapshot.map_or(&empty_slots, |s| &s.slots),
            self.focused_pane == FocusedPane::Variables,
            &mut self.variables_scroll,
        );

        render_status_bar(
            frame,
            main_chunks[1],
            StatusRenderData {
                message: &self.status_message,
                current_step: self.engine.history_position(),
                total_steps: self.engine.total_snapshots(),
                has_error: self.error.is_some(),
                is_playing: self.is_playing,
            },
        );
    }

    /// Handle keyboard events
    fn handle_key_event(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                self.should_quit = true;
            }
            // Number keys step forward N times directly
            KeyCode::Char(c @ '1'..='9') => {
                self.is_playing = false;
                let n = c.to_digit(10).unwrap_or(1);
                let mut stepped = 0;
                for _ in 0..n {
                    if self.engine.step_forward().is_err() {
                        break;
                    }
                    stepped += 1;
                }
                self.after_step(&format!("Stepped forward {} step(s)", stepped));
            }
            KeyCode::Tab => {
                self.focused_pane = self.focused_pane.next();
            }
            KeyCode::BackTab => {
                self.focused_pane = self.focused_pane.prev();
            }
            KeyCode::Left => {
                self.is_playing = false;
                match self.engine.step_backward() {
                    Ok(()) => self.after_step("Stepped backward"),
                    Err(e) => self.status_message = format!("Cannot step backward: {}", e),
                }
            }
            KeyCode::Right => {
                self.is_playing = false;
                match self.engine.step_forward() {
                    Ok(()) => self.after_step("Stepped forward"),
                    Err(e) => self.status_message = format!("Cannot step forward: {}", e),
                }
            }
            KeyCode::Up => match self.focused_pane {
                FocusedPane::Code => {
                    self.code_scroll.follow = false;
                    self.code_scroll.offset = self.code_scroll.offset.saturating_sub(1);
                }
                FocusedPane::Stack => self.stack_scroll = self.stack_scroll.saturating_sub(1),
                FocusedPane::Variables => {
                    self.variables_scroll = self.variables_scroll.saturating_sub(1)
                }
                FocusedPane::Trace => self.trace_scroll = self.trace_scroll.saturating_sub(1),
            },
            KeyCode::Down => match self.focused_pane {
                FocusedPane::Code => {
                    self.code_scroll.follow = false;
                    self.code_scroll.offset = self.code_scroll.offset.saturating_add(1);
                }
                FocusedPane::Stack => self.stack_scroll = self.stack_scroll.saturating_add(1),
                FocusedPane::Variables => {
                    self.variables_scroll = self.variables_scroll.saturating_add(1)
                }
                FocusedPane::Trace => self.trace_scroll = self.trace_scroll.saturating_add(1),
            },
            KeyCode::Char(' ') => {
                // Toggle auto-play mode (with 200ms debounce to prevent key repeat spam)
                if self.last_space_press.elapsed() >= Duration::from_millis(200) {
                    self.last_space_press = Instant::now();
                    self.is_playing = !self.is_playing;
                    if self.is_playing {
                        self.last_play_time = Instant::now();
                        self.status_message = "Playing...".to_string();
                    } else {
                        self.status_message = "Paused".to_string();
                    }
                }
            }
            KeyCode::Enter => {
                self.is_playing = false;
                if self.engine.jump_to_end().is_ok() {
                    self.after_step("Jumped to end");
                }
            }
            KeyCode::Backspace => {
                self.is_playing = false;
                if self.engine.rewind_to_start().is_ok() {
                    self.after_step("Jumped to start");
                }
            }
            _ => {}
        }
    }

    /// Re-follow the current instruction and pin the trace to its newest line
    fn after_step(&mut self, message: &str) {
        self.status_message = message.to_string();
        self.code_scroll.follow = true;
        self.trace_scroll = usize::MAX;
    }
}
