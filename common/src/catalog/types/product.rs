use serde::{Deserialize, Serialize};

use super::category_contains;
use crate::index::types::ProductDocument;

/// Full product projection returned to callers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub product_id: String,
    pub sku: String,
    pub name: String,
    pub url_key: String,
    pub stock_status: String,
    pub product_type: String,
    pub description: Option<String>,
    pub short_description: Option<String>,
    pub price: Option<f64>,
    pub currency: String,
    pub image_url: Option<String>,
    pub categories: Vec<String>,
}

impl Product {
    /// Whether the detected category label matches one of this product's
    /// category paths (case-insensitive substring).
    pub fn matches_category(&self, label: &str) -> bool {
        category_contains(&self.categories, label)
    }
}

impl From<ProductDocument> for Product {
    fn from(doc: ProductDocument) -> Self {
        let product_id = doc.product_id.unwrap_or_else(|| doc.sku.clone());
        Self {
            product_id,
            sku: doc.sku,
            name: doc.name,
            url_key: doc.url_key,
            stock_status: doc.stock_status.unwrap_or_else(|| "OUT_OF_STOCK".to_string()),
            product_type: doc.product_type.unwrap_or_else(|| "simple".to_string()),
            description: doc.description,
            short_description: doc.short_description,
            price: doc.price,
            currency: doc.currency.unwrap_or_else(|| "USD".to_string()),
            image_url: doc.image_url,
            categories: doc.categories,
        }
    }
}
