use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use servicedeck_core::utils::truncate_string;

use crate::app::{App, UserField};
use crate::ui::styles;

use super::{form_field, render_error_banner, render_loading};

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    if app.collections.is_loading() {
        render_loading(frame, area);
        return;
    }

    let area = match app.collections.error() {
        Some(error) => {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Length(3), Constraint::Min(5)])
                .split(area);
            render_error_banner(frame, error, chunks[0]);
            chunks[1]
        }
        None => area,
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(6), Constraint::Min(3)])
        .split(area);

    render_form(frame, app, chunks[0]);
    render_user_list(frame, app, chunks[1]);
}

fn render_form(frame: &mut Frame, app: &App, area: Rect) {
    let form = &app.collections.user_form;
    let lines = vec![
        form_field("Username:", &form.username, app.user_field == UserField::Username),
        form_field("Email:", &form.email, app.user_field == UserField::Email),
        Line::from(""),
        Line::from(vec![
            Span::styled("[Enter]", styles::help_key_style()),
            Span::styled(" Add User", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .title(" Add User ")
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_user_list(frame: &mut Frame, app: &App, area: Rect) {
    let users = app.collections.users();

    let block = Block::default()
        .title(format!(" Users ({}) ", users.len()))
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));

    if users.is_empty() {
        let paragraph = Paragraph::new(Span::styled("No users found.", styles::muted_style()))
            .block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    let name_width = (area.width as usize / 3).max(12);
    let items: Vec<ListItem> = users
        .iter()
        .enumerate()
        .map(|(i, user)| {
            let style = if i == app.users_selection {
                styles::selected_style()
            } else {
                styles::list_item_style()
            };
            let line = Line::from(vec![
                Span::raw(format!(
                    "{:<width$} ",
                    truncate_string(&user.username, name_width),
                    width = name_width
                )),
                Span::styled(user.email.clone(), styles::highlight_style()),
                Span::styled(format!("  {}", user.created_display()), styles::muted_style()),
            ]);
            ListItem::new(line).style(style)
        })
        .collect();

    let mut state = ListState::default();
    state.select(Some(app.users_selection));

    frame.render_stateful_widget(List::new(items).block(block), area, &mut state);
}
