//! Instruction listing pane
//!
//! Shows the lifted program one instruction per line, loop bodies indented
//! under their `FOR_EACH_KEY`. The instruction that produced the current
//! snapshot is marked with an arrow; when the run failed, the failing
//! instruction is drawn in the error color.

use super::formatting::{border_style, clamp_scroll};
use crate::program::{CodePath, ListingLine};
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
    Frame,
};
use rustc_hash::FxHashMap;

/// Scroll state for the code pane
pub struct CodeScrollState {
    pub offset: usize,
    /// Keep the current instruction centered; cleared by manual scrolling
    pub follow: bool,
}

/// Data needed to render the code pane
pub struct CodeRenderData<'a> {
    pub listing: &'a [ListingLine],
    /// Row of each code path in `listing`
    pub rows: &'a FxHashMap<CodePath, usize>,
    pub executed: Option<&'a CodePath>,
    pub error_path: Option<&'a CodePath>,
}

/// Split an instruction's text into mnemonic and operands for styling
fn styled_text(text: &str) -> Vec<Span<'static>> {
    match text.split_once(' ') {
        Some((mnemonic, rest)) => vec![
            Span::styled(mnemonic.to_string(), Style::default().fg(DEFAULT_THEME.mnemonic)),
            Span::styled(format!(" {}", rest), Style::default().fg(DEFAULT_THEME.fg)),
        ],
        None => vec![Span::styled(
            text.to_string(),
            Style::default().fg(DEFAULT_THEME.mnemonic),
        )],
    }
}

/// Render the code pane
pub fn render_code_pane(
    frame: &mut Frame,
    area: Rect,
    data: CodeRenderData,
    is_focused: bool,
    scroll_state: &mut CodeScrollState,
) {
    let block = Block::default()
        .title(" Instructions ")
        .borders(Borders::ALL)
        .border_style(border_style(is_focused));

    let current = data.executed.and_then(|path| data.rows.get(path).copied());
    let error_row = data.error_path.and_then(|path| data.rows.get(path).copied());

    let items: Vec<ListItem> = data
        .listing
        .iter()
        .enumerate()
        .map(|(index, line)| {
            let is_current = current == Some(index);
            let is_error = error_row == Some(index);

            let marker = if is_current { "▶ " } else { "  " };
            let indent = "    ".repeat(line.path.depth());

            let mut spans = vec![
                Span::styled(marker, Style::default().fg(DEFAULT_THEME.secondary)),
                Span::styled(
                    format!("{:<7}", line.path.to_string()),
                    Style::default().fg(DEFAULT_THEME.comment),
                ),
                Span::raw(indent),
            ];
            if is_error {
                spans.push(Span::styled(
                    line.text.clone(),
                    Style::default()
                        .fg(DEFAULT_THEME.error)
                        .add_modifier(Modifier::BOLD),
                ));
            } else {
                spans.extend(styled_text(&line.text));
            }

            let item = ListItem::new(Line::from(spans));
            if is_current {
                item.style(Style::default().bg(DEFAULT_THEME.current_line_bg))
            } else {
                item
            }
        })
        .collect();

    let visible_height = area.height.saturating_sub(2).max(1) as usize;
    if scroll_state.follow {
        scroll_state.offset = current.unwrap_or(0).saturating_sub(visible_height / 2);
    }
    clamp_scroll(&mut scroll_state.offset, items.len(), visible_height);

    let visible: Vec<ListItem> = items
        .into_iter()
        .skip(scroll_state.offset)
        .take(visible_height)
        .collect();

    frame.render_widget(List::new(visible).block(block), area);
}
