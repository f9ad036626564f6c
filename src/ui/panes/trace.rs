//! Trace output pane rendering

use super::formatting::{border_style, clamp_scroll};
use crate::engine::constants::FLAG_PREFIX;
use crate::snapshot::TraceLog;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    widgets::{Block, Borders, List, ListItem, Padding, Paragraph},
    Frame,
};

/// Render the trace pane
pub fn render_trace_pane(
    frame: &mut Frame,
    area: Rect,
    trace: &TraceLog,
    is_focused: bool,
    scroll_offset: &mut usize,
) {
    let block = Block::default()
        .title(" Trace ")
        .borders(Borders::ALL)
        .border_style(border_style(is_focused));

    if trace.is_empty() {
        let paragraph = Paragraph::new("(no assignments yet)")
            .block(block)
            .style(Style::default().fg(DEFAULT_THEME.comment));
        frame.render_widget(paragraph, area);
        return;
    }

    let block = block.padding(Padding::new(1, 0, 0, 0));
    let all_items: Vec<ListItem> = trace
        .lines
        .iter()
        .map(|line| {
            let style = if line.text.starts_with(FLAG_PREFIX) {
                Style::default()
                    .fg(DEFAULT_THEME.flag)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(DEFAULT_THEME.fg)
            };
            ListItem::new(line.text.as_str()).style(style)
        })
        .collect();

    let visible_height = area.height.saturating_sub(2).max(1) as usize;
    clamp_scroll(scroll_offset, all_items.len(), visible_height);

    let visible_items: Vec<ListItem> = all_items
        .into_iter()
        .skip(*scroll_offset)
        .take(visible_height)
        .collect();

    frame.render_widget(List::new(visible_items).block(block), area);
}
