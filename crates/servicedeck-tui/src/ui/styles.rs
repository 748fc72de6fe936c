use ratatui::style::{Color, Modifier, Style};

// Color palette: teal chrome, amber values, dark slate backgrounds
pub const TEAL: Color = Color::Rgb(38, 166, 154);
pub const GREEN: Color = Color::Rgb(139, 195, 74);
pub const AMBER: Color = Color::Rgb(255, 183, 77);
pub const RED: Color = Color::Rgb(229, 115, 115);
pub const SLATE: Color = Color::Rgb(120, 134, 145);
pub const SELECTION: Color = Color::Rgb(33, 58, 64);
pub const STATUS_BAR: Color = Color::Rgb(22, 33, 38);

pub fn title_style() -> Style {
    Style::default().fg(TEAL).add_modifier(Modifier::BOLD)
}

pub fn selected_style() -> Style {
    Style::default().bg(SELECTION).add_modifier(Modifier::BOLD)
}

pub fn list_item_style() -> Style {
    Style::default().fg(Color::White)
}

pub fn muted_style() -> Style {
    Style::default().fg(SLATE)
}

pub fn highlight_style() -> Style {
    Style::default().fg(AMBER)
}

pub fn success_style() -> Style {
    Style::default().fg(GREEN)
}

pub fn error_style() -> Style {
    Style::default().fg(RED)
}

pub fn tab_style(selected: bool) -> Style {
    if selected {
        Style::default()
            .fg(TEAL)
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
    } else {
        Style::default().fg(Color::White)
    }
}

pub fn border_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(TEAL)
    } else {
        Style::default().fg(SLATE)
    }
}

pub fn status_bar_style() -> Style {
    Style::default().bg(STATUS_BAR).fg(Color::White)
}

pub fn help_key_style() -> Style {
    Style::default().fg(AMBER).add_modifier(Modifier::BOLD)
}

pub fn help_desc_style() -> Style {
    Style::default().fg(Color::White)
}
