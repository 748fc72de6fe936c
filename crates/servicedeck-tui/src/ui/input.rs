//! Keyboard input handling for the TUI.
//!
//! Translates key events into application state changes. Plain characters
//! always go to the focused input, so every command is bound to a function
//! key or a Ctrl chord.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::{App, AppState, CacheField, CycleDirection, Tab, PAGE_SCROLL_SIZE};

/// Handle keyboard input. Returns true if the app should quit.
pub fn handle_input(app: &mut App, key: KeyEvent) -> bool {
    // Handle help overlay
    if matches!(app.state, AppState::ShowingHelp) {
        if matches!(key.code, KeyCode::Esc | KeyCode::F(1)) {
            app.state = AppState::Normal;
        }
        return false;
    }

    // Handle quit confirmation
    if matches!(app.state, AppState::ConfirmingQuit) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                app.state = AppState::Quitting;
                return true;
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                app.state = AppState::Normal;
            }
            _ => {}
        }
        return false;
    }

    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    match key.code {
        KeyCode::F(1) => app.state = AppState::ShowingHelp,
        KeyCode::Esc => app.state = AppState::ConfirmingQuit,
        KeyCode::F(2) => app.current_tab = Tab::Users,
        KeyCode::F(3) => app.current_tab = Tab::Products,
        KeyCode::F(4) => app.current_tab = Tab::Cache,
        KeyCode::Right if ctrl => app.current_tab = app.current_tab.next(),
        KeyCode::Left if ctrl => app.current_tab = app.current_tab.prev(),
        KeyCode::Tab => app.cycle_field(CycleDirection::Forward),
        KeyCode::BackTab => app.cycle_field(CycleDirection::Backward),
        KeyCode::Up => app.scroll_up(1),
        KeyCode::Down => app.scroll_down(1),
        KeyCode::PageUp => app.scroll_up(PAGE_SCROLL_SIZE),
        KeyCode::PageDown => app.scroll_down(PAGE_SCROLL_SIZE),
        KeyCode::Backspace => app.pop_char(),
        _ => match app.current_tab {
            Tab::Users | Tab::Products => handle_form_input(app, key, ctrl),
            Tab::Cache => handle_cache_input(app, key, ctrl),
        },
    }

    false
}

fn handle_form_input(app: &mut App, key: KeyEvent, ctrl: bool) {
    match key.code {
        KeyCode::Enter => match app.current_tab {
            Tab::Users => app.submit_user_form(),
            Tab::Products => app.submit_product_form(),
            Tab::Cache => {}
        },
        KeyCode::Char(c) if !ctrl => app.push_char(c),
        _ => {}
    }
}

fn handle_cache_input(app: &mut App, key: KeyEvent, ctrl: bool) {
    match key.code {
        KeyCode::Char('s') if ctrl => {
            app.cache.set();
        }
        KeyCode::Char('g') if ctrl => {
            app.cache.get();
        }
        KeyCode::Char('d') if ctrl => {
            app.cache.delete();
        }
        // Enter stores from the value field and looks up from the key field
        KeyCode::Enter => {
            match app.cache_field {
                CacheField::Key => app.cache.get(),
                CacheField::Value => app.cache.set(),
            };
        }
        KeyCode::Char(c) if !ctrl => app.push_char(c),
        _ => {}
    }
}
