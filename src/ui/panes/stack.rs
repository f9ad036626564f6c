//! Operand stack pane
//!
//! Lists the operand stack top-first, each entry with its depth and value.

use super::formatting::{border_style, clamp_scroll, value_span};
use crate::memory::OperandStack;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
    Frame,
};

/// Render the operand stack pane
pub fn render_stack_pane(
    frame: &mut Frame,
    area: Rect,
    stack: &OperandStack,
    is_focused: bool,
    scroll_offset: &mut usize,
) {
    let block = Block::default()
        .title(format!(" Operand Stack ({}) ", stack.len()))
        .borders(Borders::ALL)
        .border_style(border_style(is_focused));

    let items: Vec<ListItem> = if stack.is_empty() {
        vec![ListItem::new("(empty)").style(Style::default().fg(DEFAULT_THEME.comment))]
    } else {
        stack
            .values()
            .iter()
            .rev()
            .enumerate()
            .map(|(depth, value)| {
                let label = if depth == 0 {
                    Span::styled(
                        " top ",
                        Style::default()
                            .fg(DEFAULT_THEME.secondary)
                            .add_modifier(Modifier::BOLD),
                    )
                } else {
                    Span::styled(
                        format!(" [{}] ", depth),
                        Style::default().fg(DEFAULT_THEME.comment),
                    )
                };
                ListItem::new(Line::from(vec![
                    label,
                    Span::styled("│ ", Style::default().fg(DEFAULT_THEME.comment)),
                    value_span(value),
                ]))
            })
            .collect()
    };

    let visible_height = area.height.saturating_sub(2).max(1) as usize;
    clamp_scroll(scroll_offset, items.len(), visible_height);

    let visible: Vec<ListItem> = items
        .into_iter()
        .skip(*scroll_offset)
        .take(visible_height)
        .collect();

    frame.render_widget(List::new(visible).block(block), area);
}
