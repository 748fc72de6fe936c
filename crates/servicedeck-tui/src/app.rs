//! Application state management for servicedeck.
//!
//! The `App` struct owns the two controllers, the UI state (tab, focused
//! field, list selections, overlays) and the form-completeness checks that
//! run before anything is handed to the core.

use anyhow::{Context, Result};
use tracing::debug;

use servicedeck_core::{ApiClient, CacheClient, CollectionSync, Config};

// ============================================================================
// Constants
// ============================================================================

/// Maximum length of any single input field.
pub const MAX_INPUT_LENGTH: usize = 256;

/// Number of items to scroll on page up/down.
pub const PAGE_SCROLL_SIZE: usize = 10;

pub const USER_FORM_INCOMPLETE: &str = "Username and email are required.";
pub const PRODUCT_FORM_INCOMPLETE: &str =
    "Name, description and a non-negative price are required.";

// ============================================================================
// UI State Types
// ============================================================================

/// Main navigation tabs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Users,
    Products,
    Cache,
}

impl Tab {
    /// Get the display title for this tab.
    pub fn title(&self) -> &'static str {
        match self {
            Tab::Users => "Users",
            Tab::Products => "Products",
            Tab::Cache => "Cache",
        }
    }

    /// Get the next tab (wrapping around)
    pub fn next(&self) -> Self {
        match self {
            Tab::Users => Tab::Products,
            Tab::Products => Tab::Cache,
            Tab::Cache => Tab::Users,
        }
    }

    /// Get the previous tab (wrapping around)
    pub fn prev(&self) -> Self {
        match self {
            Tab::Users => Tab::Cache,
            Tab::Products => Tab::Users,
            Tab::Cache => Tab::Products,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    ShowingHelp,
    ConfirmingQuit,
    Quitting,
}

/// Focused field of the user form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserField {
    Username,
    Email,
}

/// Focused field of the product form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductField {
    Name,
    Description,
    Price,
}

/// Focused field on the cache tab
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheField {
    Key,
    Value,
}

/// Direction for cycling through form fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleDirection {
    Forward,
    Backward,
}

// ============================================================================
// App
// ============================================================================

pub struct App {
    pub state: AppState,
    pub current_tab: Tab,

    pub user_field: UserField,
    pub product_field: ProductField,
    pub cache_field: CacheField,

    pub users_selection: usize,
    pub products_selection: usize,

    pub collections: CollectionSync,
    pub cache: CacheClient,

    /// Local feedback from the form checks
    pub status_message: Option<String>,
}

impl App {
    /// Create a new application instance
    pub fn new(config: &Config) -> Result<Self> {
        let endpoints = config.endpoints();
        debug!(?endpoints, "Endpoints resolved");

        let api = ApiClient::new(endpoints).context("Invalid endpoint configuration")?;

        Ok(Self {
            state: AppState::Normal,
            current_tab: Tab::Users,
            user_field: UserField::Username,
            product_field: ProductField::Name,
            cache_field: CacheField::Key,
            users_selection: 0,
            products_selection: 0,
            collections: CollectionSync::new(api.clone()),
            cache: CacheClient::new(api),
            status_message: None,
        })
    }

    /// Kick off the bootstrap fetches of both controllers
    pub fn start(&mut self) {
        self.collections.mount();
        self.cache.mount();
    }

    /// Apply finished background work. Returns true if anything changed.
    pub fn check_background_tasks(&mut self) -> bool {
        let applied = self.collections.check_background_tasks() + self.cache.check_background_tasks();
        if applied > 0 {
            self.clamp_selections();
        }
        applied > 0
    }

    // =========================================================================
    // Forms
    // =========================================================================

    pub fn submit_user_form(&mut self) {
        if !self.collections.user_form.is_complete() {
            self.status_message = Some(USER_FORM_INCOMPLETE.to_string());
            return;
        }
        self.status_message = self.collections.submit_user().err().map(|e| e.to_string());
    }

    pub fn submit_product_form(&mut self) {
        if !self.collections.product_form.is_complete() {
            self.status_message = Some(PRODUCT_FORM_INCOMPLETE.to_string());
            return;
        }
        self.status_message = self.collections.submit_product().err().map(|e| e.to_string());
    }

    /// Move focus to the next or previous field of the current tab
    pub fn cycle_field(&mut self, direction: CycleDirection) {
        let forward = direction == CycleDirection::Forward;
        match self.current_tab {
            Tab::Users => {
                self.user_field = match self.user_field {
                    UserField::Username => UserField::Email,
                    UserField::Email => UserField::Username,
                };
            }
            Tab::Products => {
                self.product_field = match (self.product_field, forward) {
                    (ProductField::Name, true) => ProductField::Description,
                    (ProductField::Description, true) => ProductField::Price,
                    (ProductField::Price, true) => ProductField::Name,
                    (ProductField::Name, false) => ProductField::Price,
                    (ProductField::Description, false) => ProductField::Name,
                    (ProductField::Price, false) => ProductField::Description,
                };
            }
            Tab::Cache => {
                self.cache_field = match self.cache_field {
                    CacheField::Key => CacheField::Value,
                    CacheField::Value => CacheField::Key,
                };
            }
        }
    }

    /// The input that receives typed characters
    pub fn focused_input_mut(&mut self) -> &mut String {
        match self.current_tab {
            Tab::Users => {
                let form = &mut self.collections.user_form;
                match self.user_field {
                    UserField::Username => &mut form.username,
                    UserField::Email => &mut form.email,
                }
            }
            Tab::Products => {
                let form = &mut self.collections.product_form;
                match self.product_field {
                    ProductField::Name => &mut form.name,
                    ProductField::Description => &mut form.description,
                    ProductField::Price => &mut form.price,
                }
            }
            Tab::Cache => match self.cache_field {
                CacheField::Key => &mut self.cache.key_input,
                CacheField::Value => &mut self.cache.value_input,
            },
        }
    }

    pub fn push_char(&mut self, c: char) {
        let input = self.focused_input_mut();
        if can_add_input_char(input.chars().count(), c) {
            input.push(c);
        }
    }

    pub fn pop_char(&mut self) {
        self.focused_input_mut().pop();
    }

    // =========================================================================
    // Lists
    // =========================================================================

    fn list_len(&self) -> usize {
        match self.current_tab {
            Tab::Users => self.collections.users().len(),
            Tab::Products => self.collections.products().len(),
            Tab::Cache => 0,
        }
    }

    fn selection_mut(&mut self) -> Option<&mut usize> {
        match self.current_tab {
            Tab::Users => Some(&mut self.users_selection),
            Tab::Products => Some(&mut self.products_selection),
            Tab::Cache => None,
        }
    }

    pub fn scroll_down(&mut self, amount: usize) {
        let last = self.list_len().saturating_sub(1);
        if let Some(selection) = self.selection_mut() {
            *selection = (*selection + amount).min(last);
        }
    }

    pub fn scroll_up(&mut self, amount: usize) {
        if let Some(selection) = self.selection_mut() {
            *selection = selection.saturating_sub(amount);
        }
    }

    fn clamp_selections(&mut self) {
        let users_last = self.collections.users().len().saturating_sub(1);
        let products_last = self.collections.products().len().saturating_sub(1);
        self.users_selection = self.users_selection.min(users_last);
        self.products_selection = self.products_selection.min(products_last);
    }
}

/// Check if a character can be added to an input of the given length.
/// Rejects control characters and enforces `MAX_INPUT_LENGTH`.
pub fn can_add_input_char(current_len: usize, c: char) -> bool {
    current_len < MAX_INPUT_LENGTH && !c.is_control()
}
