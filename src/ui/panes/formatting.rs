//! Shared value and border styling for panes

use crate::memory::Value;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    style::{Modifier, Style},
    text::Span,
};

/// Render a value in trace form, colored by kind
pub fn value_span(value: &Value) -> Span<'static> {
    let color = match value {
        Value::Str(_) => DEFAULT_THEME.string,
        Value::Int(_) => DEFAULT_THEME.number,
        Value::None => DEFAULT_THEME.comment,
        Value::Tuple(_) | Value::Slice(_) | Value::Mapping(_) => DEFAULT_THEME.structure,
    };
    Span::styled(value.repr(), Style::default().fg(color))
}

/// Border style for a pane, highlighted when focused
pub fn border_style(is_focused: bool) -> Style {
    if is_focused {
        Style::default()
            .fg(DEFAULT_THEME.border_focused)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(DEFAULT_THEME.border_normal)
    }
}

/// Clamp a scroll offset so the last page stays full
pub fn clamp_scroll(offset: &mut usize, total_items: usize, visible_height: usize) {
    if total_items > visible_height {
        *offset = (*offset).min(total_items - visible_height);
    } else {
        *offset = 0;
    }
}
