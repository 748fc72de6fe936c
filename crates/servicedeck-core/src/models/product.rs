use serde::{Deserialize, Serialize};

use crate::utils::{format_created_at, format_price};

/// A product as stored by the products service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: f64,
    pub created_at: String,
}

impl Product {
    pub fn price_display(&self) -> String {
        format_price(self.price)
    }

    pub fn description_display(&self) -> &str {
        self.description.as_deref().unwrap_or("")
    }

    pub fn created_display(&self) -> String {
        format_created_at(&self.created_at)
    }
}

/// Body of a product creation request. `price` goes over the wire as a
/// JSON number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: f64,
}
