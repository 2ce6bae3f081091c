//! Product Model

use serde::{Deserialize, Serialize};

/// Product entity (read-only to the ordering core)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub category_id: i64,
    pub price: f64,
    pub is_active: bool,
}

impl Product {
    pub fn new(id: i64, name: impl Into<String>, category_id: i64, price: f64) -> Self {
        Self {
            id,
            name: name.into(),
            category_id,
            price,
            is_active: true,
        }
    }
}
