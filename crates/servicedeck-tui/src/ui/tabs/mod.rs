//! Tab-specific content rendering, plus widgets shared between tabs.

pub mod cache;
pub mod products;
pub mod users;

use ratatui::{
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use super::styles;

/// Visible width of a form input
const FIELD_WIDTH: usize = 32;

/// One labelled input line; the focused field shows a cursor.
pub fn form_field<'a>(label: &'a str, value: &str, focused: bool) -> Line<'a> {
    let style = if focused {
        styles::selected_style()
    } else {
        styles::list_item_style()
    };
    let cursor = if focused { "▌" } else { "" };

    // Keep the tail visible while typing past the field width
    let char_count = value.chars().count();
    let visible: String = value
        .chars()
        .skip(char_count.saturating_sub(FIELD_WIDTH))
        .collect();

    Line::from(vec![
        Span::styled(format!("{:<13}[", label), styles::muted_style()),
        Span::styled(format!("{:<width$}{}", visible, cursor, width = FIELD_WIDTH), style),
        Span::styled("]", styles::muted_style()),
    ])
}

pub fn render_loading(frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));
    let paragraph = Paragraph::new(Line::from(Span::styled(
        "Loading...",
        styles::muted_style(),
    )))
    .alignment(Alignment::Center)
    .block(block);
    frame.render_widget(paragraph, area);
}

pub fn render_error_banner(frame: &mut Frame, message: &str, area: Rect) {
    let block = Block::default()
        .title(" Error ")
        .title_style(styles::error_style())
        .borders(Borders::ALL)
        .border_style(styles::error_style());
    let paragraph = Paragraph::new(Span::styled(message.to_string(), styles::error_style()))
        .wrap(Wrap { trim: true })
        .block(block);
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_form_field_shows_cursor_only_when_focused() {
        assert!(text(&form_field("Key:", "abc", true)).contains("abc▌"));
        assert!(!text(&form_field("Key:", "abc", false)).contains('▌'));
    }

    #[test]
    fn test_form_field_keeps_tail_of_long_input() {
        let long = format!("{}tail", "x".repeat(40));
        let rendered = text(&form_field("Value:", &long, false));
        assert!(rendered.contains("tail"));
        assert!(!rendered.contains(&long));
    }
}
