//! Variable slot pane

use super::formatting::{border_style, clamp_scroll, value_span};
use crate::memory::Slots;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
    Frame,
};

/// Render the variable slot pane; unset slots are shown dimmed
pub fn render_variables_pane(
    frame: &mut Frame,
    area: Rect,
    slots: &Slots,
    is_focused: bool,
    scroll_offset: &mut usize,
) {
    let block = Block::default()
        .title(" Variables ")
        .borders(Borders::ALL)
        .border_style(border_style(is_focused));

    let name_width = slots.iter().map(|(name, _)| name.len()).max().unwrap_or(0);

    let items: Vec<ListItem> = slots
        .iter()
        .map(|(name, value)| {
            let name_span = Span::styled(
                format!(" {:<width$} ", name, width = name_width),
                Style::default()
                    .fg(DEFAULT_THEME.primary)
                    .add_modifier(Modifier::BOLD),
            );
            let rendered = match value {
                Some(value) => value_span(value),
                None => Span::styled("<unset>", Style::default().fg(DEFAULT_THEME.comment)),
            };
            ListItem::new(Line::from(vec![
                name_span,
                Span::styled("= ", Style::default().fg(DEFAULT_THEME.comment)),
                rendered,
            ]))
        })
        .collect();

    let visible_height = area.height.saturating_sub(2).max(1) as usize;
    clamp_scroll(scroll_offset, items.len(), visible_height);

    let visible: Vec<ListItem> = items
        .into_iter()
        .skip(*scroll_offset)
        .take(visible_height)
        .collect();

    frame.render_widget(List::new(visible).block(block), area);
}
