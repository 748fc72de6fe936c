use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use servicedeck_core::utils::truncate_string;

use crate::app::{App, ProductField};
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
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(area);

    render_form(frame, app, chunks[0]);
    render_product_list(frame, app, chunks[1]);
}

fn render_form(frame: &mut Frame, app: &App, area: Rect) {
    let form = &app.collections.product_form;
    let mut lines = vec![
        form_field("Name:", &form.name, app.product_field == ProductField::Name),
        form_field(
            "Description:",
            &form.description,
            app.product_field == ProductField::Description,
        ),
        form_field("Price:", &form.price, app.product_field == ProductField::Price),
        Line::from(""),
    ];

    // Flag a price that will not convert before the user submits
    if !form.price.trim().is_empty() && form.price_value().is_none() {
        lines.push(Line::from(Span::styled(
            "Price must be a number",
            styles::error_style(),
        )));
    }

    lines.push(Line::from(vec![
        Span::styled("[Enter]", styles::help_key_style()),
        Span::styled(" Add Product", styles::muted_style()),
    ]));

    let block = Block::default()
        .title(" Add Product ")
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_product_list(frame: &mut Frame, app: &App, area: Rect) {
    let products = app.collections.products();

    let block = Block::default()
        .title(format!(" Products ({}) ", products.len()))
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));

    if products.is_empty() {
        let paragraph = Paragraph::new(Span::styled("No products found.", styles::muted_style()))
            .block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    let inner_width = area.width.saturating_sub(4) as usize;
    let items: Vec<ListItem> = products
        .iter()
        .enumerate()
        .map(|(i, product)| {
            let style = if i == app.products_selection {
                styles::selected_style()
            } else {
                styles::list_item_style()
            };

            let price = product.price_display();
            let name_width = inner_width.saturating_sub(price.len() + 1);
            let header = Line::from(vec![
                Span::raw(format!(
                    "{:<width$} ",
                    truncate_string(&product.name, name_width),
                    width = name_width
                )),
                Span::styled(price, styles::highlight_style()),
            ]);
            let description = Line::from(Span::styled(
                format!("  {}", truncate_string(product.description_display(), inner_width)),
                styles::muted_style(),
            ));
            let created = Line::from(Span::styled(
                format!("  Created {}", product.created_display()),
                styles::muted_style(),
            ));

            ListItem::new(vec![header, description, created]).style(style)
        })
        .collect();

    let mut state = ListState::default();
    state.select(Some(app.products_selection));

    frame.render_stateful_widget(List::new(items).block(block), area, &mut state);
}
