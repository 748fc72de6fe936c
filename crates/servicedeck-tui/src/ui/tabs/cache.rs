use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, CacheField};
use crate::ui::styles;

use super::form_field;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Server time
            Constraint::Length(6), // Inputs
            Constraint::Min(4),    // Held entry and message
        ])
        .split(area);

    render_time(frame, app, chunks[0]);
    render_inputs(frame, app, chunks[1]);
    render_entry(frame, app, chunks[2]);
}

fn render_time(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(" Current Time ")
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));
    let paragraph = Paragraph::new(Span::raw(app.cache.time_display().to_string())).block(block);
    frame.render_widget(paragraph, area);
}

fn render_inputs(frame: &mut Frame, app: &App, area: Rect) {
    let lines = vec![
        form_field("Key:", &app.cache.key_input, app.cache_field == CacheField::Key),
        form_field("Value:", &app.cache.value_input, app.cache_field == CacheField::Value),
        Line::from(""),
        Line::from(vec![
            Span::styled("[^S]", styles::help_key_style()),
            Span::styled(" Set  ", styles::muted_style()),
            Span::styled("[^G]", styles::help_key_style()),
            Span::styled(" Get  ", styles::muted_style()),
            Span::styled("[^D]", styles::help_key_style()),
            Span::styled(" Delete", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .title(" Cache ")
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_entry(frame: &mut Frame, app: &App, area: Rect) {
    let mut lines = vec![];

    if let Some(message) = app.cache.message() {
        lines.push(Line::from(Span::styled(
            message.to_string(),
            styles::success_style(),
        )));
        lines.push(Line::from(""));
    }

    match app.cache.entry() {
        Some(entry) => {
            lines.push(Line::from(vec![
                Span::styled("Key:   ", styles::highlight_style()),
                Span::raw(entry.key.clone()),
            ]));
            lines.push(Line::from(vec![
                Span::styled("Value: ", styles::highlight_style()),
                Span::raw(entry.value.clone()),
            ]));
        }
        None => lines.push(Line::from(Span::styled(
            "Nothing fetched yet.",
            styles::muted_style(),
        ))),
    }

    let block = Block::default()
        .title(" Cached Data ")
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));

    let paragraph = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(block);
    frame.render_widget(paragraph, area);
}
