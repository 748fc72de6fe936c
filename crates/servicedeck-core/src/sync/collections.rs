//! Collection synchronizer for the users and products services.
//!
//! Both collections are loaded together at mount time and fail together:
//! if either fetch fails, neither result is adopted and a single aggregate
//! error is recorded. After a successful load, created records are appended
//! once the server has confirmed them, in the order the confirmations arrive.

use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::api::{ApiClient, ApiError, ApiResult};
use crate::config::Endpoints;
use crate::models::{NewProduct, NewUser, Product, User};

use super::{send_result, LoadState, SyncError, CHANNEL_BUFFER_SIZE};

// ============================================================================
// Messages
// ============================================================================

pub const USERS_FETCH_FAILED: &str = "Failed to fetch users";
pub const PRODUCTS_FETCH_FAILED: &str = "Failed to fetch products";
pub const USER_CREATE_FAILED: &str = "Failed to create user";
pub const PRODUCT_CREATE_FAILED: &str = "Failed to create product";
pub const LOAD_TASK_PANICKED: &str = "Loading collections failed unexpectedly";

// ============================================================================
// Forms
// ============================================================================

/// Input fields of the user creation form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserForm {
    pub username: String,
    pub email: String,
}

impl UserForm {
    /// All required fields are filled in
    pub fn is_complete(&self) -> bool {
        !self.username.trim().is_empty() && !self.email.trim().is_empty()
    }

    pub fn clear(&mut self) {
        self.username.clear();
        self.email.clear();
    }

    fn to_payload(&self) -> NewUser {
        NewUser {
            username: self.username.clone(),
            email: self.email.clone(),
        }
    }
}

/// Input fields of the product creation form. The price is kept as typed
/// and converted to a number when the form is submitted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductForm {
    pub name: String,
    pub description: String,
    pub price: String,
}

impl ProductForm {
    /// The typed price as a number, if it parses to a finite value
    pub fn price_value(&self) -> Option<f64> {
        self.price
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|p| p.is_finite())
    }

    /// All required fields are filled in and the price is a non-negative number
    pub fn is_complete(&self) -> bool {
        !self.name.trim().is_empty()
            && !self.description.trim().is_empty()
            && self.price_value().is_some_and(|p| p >= 0.0)
    }

    pub fn clear(&mut self) {
        self.name.clear();
        self.description.clear();
        self.price.clear();
    }

    fn to_payload(&self) -> Result<NewProduct, SyncError> {
        let price = self
            .price_value()
            .ok_or_else(|| SyncError::InvalidPrice(self.price.clone()))?;
        Ok(NewProduct {
            name: self.name.clone(),
            description: self.description.clone(),
            price,
        })
    }
}

// ============================================================================
// Controller
// ============================================================================

type LoadOutcome = Result<(Vec<User>, Vec<Product>), String>;

/// Results sent back from background tasks
#[derive(Debug)]
enum SyncEvent {
    /// `generation` identifies the load that produced the outcome
    Loaded { generation: u64, outcome: LoadOutcome },
    UserCreated(ApiResult<User>),
    ProductCreated(ApiResult<Product>),
}

/// Keeps the users and products collections in sync with their services.
///
/// State machine: `Idle -> Loading -> (Ready | LoadFailed)`. Creates are only
/// accepted in `Ready`, and a failed create does not leave it. Operations
/// spawn tokio tasks, so they must be called from within a runtime.
pub struct CollectionSync {
    api: ApiClient,
    state: LoadState,
    mounted: bool,
    users: Vec<User>,
    products: Vec<Product>,
    error: Option<String>,
    /// Bumped by every load; only the latest load's outcome is adopted
    load_generation: u64,
    pub user_form: UserForm,
    pub product_form: ProductForm,
    /// Spawned tasks whose result has not been applied yet
    pending: usize,
    events_tx: mpsc::Sender<SyncEvent>,
    events_rx: mpsc::Receiver<SyncEvent>,
}

impl CollectionSync {
    pub fn new(api: ApiClient) -> Self {
        let (events_tx, events_rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);
        Self {
            api,
            state: LoadState::Idle,
            mounted: false,
            users: Vec::new(),
            products: Vec::new(),
            error: None,
            load_generation: 0,
            user_form: UserForm::default(),
            product_form: ProductForm::default(),
            pending: 0,
            events_tx,
            events_rx,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn is_loading(&self) -> bool {
        self.state == LoadState::Loading
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// The aggregate error of the most recent failed operation
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn has_pending(&self) -> bool {
        self.pending > 0
    }

    // =========================================================================
    // Bootstrap
    // =========================================================================

    /// Start the bootstrap load. Only the first call has an effect.
    pub fn mount(&mut self) {
        if self.mounted {
            return;
        }
        self.mounted = true;
        self.start_load();
    }

    /// Point the controller at other services. When mounted and the
    /// endpoints actually changed, the bootstrap load runs again and any
    /// load still in flight is superseded. Returns whether anything changed.
    pub fn set_endpoints(&mut self, endpoints: Endpoints) -> ApiResult<bool> {
        if self.api.endpoints() == &endpoints {
            return Ok(false);
        }
        self.api = self.api.with_endpoints(endpoints)?;
        if self.mounted {
            self.start_load();
        }
        Ok(true)
    }

    fn start_load(&mut self) {
        self.state = LoadState::Loading;
        self.pending += 1;
        self.load_generation += 1;
        let generation = self.load_generation;

        let api = self.api.clone();
        let tx = self.events_tx.clone();
        debug!(generation, endpoints = ?api.endpoints(), "Starting collection load");

        tokio::spawn(async move {
            // Loading must always end, even if the fetch task panics
            let outcome = AssertUnwindSafe(Self::load_collections(&api))
                .catch_unwind()
                .await
                .unwrap_or_else(|_| Err(LOAD_TASK_PANICKED.to_string()));
            send_result(&tx, SyncEvent::Loaded { generation, outcome }).await;
        });
    }

    /// Fetch both collections concurrently. Both requests always run to
    /// completion; the users failure is reported ahead of the products one.
    async fn load_collections(api: &ApiClient) -> LoadOutcome {
        let (users, products) = tokio::join!(api.fetch_users(), api.fetch_products());

        let users = users.map_err(|e| Self::load_failure("users", USERS_FETCH_FAILED, e));
        let products =
            products.map_err(|e| Self::load_failure("products", PRODUCTS_FETCH_FAILED, e));

        Ok((users?, products?))
    }

    /// Status failures get the fixed message; transport and parse failures
    /// keep their own text.
    fn load_failure(collection: &str, fixed: &str, err: ApiError) -> String {
        error!(collection, error = %err, "Collection fetch failed");
        if err.is_status() {
            fixed.to_string()
        } else {
            err.to_string()
        }
    }

    // =========================================================================
    // Create
    // =========================================================================

    fn ensure_ready(&self) -> Result<(), SyncError> {
        if self.state == LoadState::Ready {
            Ok(())
        } else {
            Err(SyncError::NotReady(self.state))
        }
    }

    /// Submit the user form. The form is cleared once the server confirms.
    pub fn submit_user(&mut self) -> Result<(), SyncError> {
        self.ensure_ready()?;
        let payload = self.user_form.to_payload();
        self.pending += 1;

        let api = self.api.clone();
        let tx = self.events_tx.clone();
        debug!(username = %payload.username, "Submitting user");

        tokio::spawn(async move {
            let result = api.create_user(&payload).await;
            send_result(&tx, SyncEvent::UserCreated(result)).await;
        });
        Ok(())
    }

    /// Submit the product form, converting the typed price to a number first.
    pub fn submit_product(&mut self) -> Result<(), SyncError> {
        self.ensure_ready()?;
        let payload = self.product_form.to_payload()?;
        self.pending += 1;

        let api = self.api.clone();
        let tx = self.events_tx.clone();
        debug!(name = %payload.name, price = payload.price, "Submitting product");

        tokio::spawn(async move {
            let result = api.create_product(&payload).await;
            send_result(&tx, SyncEvent::ProductCreated(result)).await;
        });
        Ok(())
    }

    // =========================================================================
    // Result processing
    // =========================================================================

    /// Apply every result that has already arrived. Returns how many were
    /// applied, so the caller knows whether to redraw.
    pub fn check_background_tasks(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.events_rx.try_recv() {
            self.apply(event);
            applied += 1;
        }
        applied
    }

    /// Wait for the next result and apply it.
    /// Returns false immediately when nothing is in flight.
    pub async fn wait_for_update(&mut self) -> bool {
        if self.pending == 0 {
            return false;
        }
        match self.events_rx.recv().await {
            Some(event) => {
                self.apply(event);
                true
            }
            None => false,
        }
    }

    fn apply(&mut self, event: SyncEvent) {
        self.pending = self.pending.saturating_sub(1);
        match event {
            SyncEvent::Loaded { generation, .. } if generation != self.load_generation => {
                debug!(generation, current = self.load_generation, "Discarding superseded load");
            }
            SyncEvent::Loaded {
                outcome: Ok((users, products)),
                ..
            } => {
                info!(users = users.len(), products = products.len(), "Collections loaded");
                self.users = users;
                self.products = products;
                self.error = None;
                self.state = LoadState::Ready;
            }
            SyncEvent::Loaded {
                outcome: Err(message),
                ..
            } => {
                self.error = Some(message);
                self.state = LoadState::LoadFailed;
            }
            SyncEvent::UserCreated(Ok(user)) => {
                debug!(id = user.id, "User created");
                self.users.push(user);
                self.user_form.clear();
            }
            SyncEvent::UserCreated(Err(e)) => {
                warn!(error = %e, "Failed to create user");
                self.error = Some(USER_CREATE_FAILED.to_string());
            }
            SyncEvent::ProductCreated(Ok(product)) => {
                debug!(id = product.id, "Product created");
                self.products.push(product);
                self.product_form.clear();
            }
            SyncEvent::ProductCreated(Err(e)) => {
                warn!(error = %e, "Failed to create product");
                self.error = Some(PRODUCT_CREATE_FAILED.to_string());
            }
        }
    }
}
